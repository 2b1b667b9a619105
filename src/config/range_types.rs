use derive_more::Display;
use serde::{Deserialize, Serialize};

fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

// Deserialized values go through `new` and get clamped
macro_rules! clamped_f32 {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<f32> for $name {
                fn from(value: f32) -> Self {
                    Self::new(value)
                }
            }

            impl From<$name> for f32 {
                fn from(value: $name) -> Self {
                    value.0
                }
            }
        )*
    };
}

clamped_f32!(TickRate, DayLength, HourOfDay, WalkSpeed, Tolerance, Interval, Reach);

/// A tick rate constrained to [1.0, 240.0] ticks per simulated second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct TickRate(f32);

impl TickRate {
    const MIN: f32 = 1.0;
    const MAX: f32 = 240.0;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// Simulated seconds per in-game day, constrained to [60.0, 86400.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct DayLength(f32);

impl DayLength {
    const MIN: f32 = 60.0;
    const MAX: f32 = 86_400.0;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for DayLength {
    fn default() -> Self {
        Self::new(1440.0)
    }
}

/// An hour of the day constrained to [0.0, 23.99]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct HourOfDay(f32);

impl HourOfDay {
    const MIN: f32 = 0.0;
    const MAX: f32 = 23.99;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for HourOfDay {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A walking speed in world units per tick, constrained to [0.02, 0.05]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct WalkSpeed(f32);

impl WalkSpeed {
    const MIN: f32 = 0.02;
    const MAX: f32 = 0.05;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for WalkSpeed {
    fn default() -> Self {
        Self::new(0.03)
    }
}

/// An arrival or clearance tolerance constrained to [0.01, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Tolerance(f32);

impl Tolerance {
    const MIN: f32 = 0.01;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(0.3)
    }
}

/// A duration in simulated seconds constrained to [0.1, 60.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Interval(f32);

impl Interval {
    const MIN: f32 = 0.1;
    const MAX: f32 = 60.0;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// A look-ahead or influence radius in world units, constrained to [0.1, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Reach(f32);

impl Reach {
    const MIN: f32 = 0.1;
    const MAX: f32 = 20.0;

    pub fn new(value: f32) -> Self {
        Self(clamp_range(value, Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Reach {
    fn default() -> Self {
        Self::new(3.0)
    }
}
