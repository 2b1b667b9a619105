use crate::map::Address;
use bevy::prelude::*;
use derive_more::{Display, From, Mul};
use serde::{Deserialize, Serialize};

pub mod agent;

pub use agent::*;

/// Stable numeric identity of an agent. Also its update order within a tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[display("agent#{_0}")]
pub struct AgentId(pub u32);

/// World units per tick
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Mul, Display, From)]
pub struct Speed(pub f32);

/// Non-negative separation in world units
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From)]
pub struct Distance(pub f32);

impl Speed {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
}

impl Distance {
    pub fn new(value: f32) -> Self {
        Self(value.max(0.0))
    }
}

impl std::ops::Mul<Speed> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: Speed) -> Self::Output {
        self * rhs.0
    }
}

/// Where an agent currently is. Indoors holds the building's address, never the building.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    Outdoors,
    Indoors(Address),
}

impl Location {
    pub fn is_indoors(&self) -> bool {
        matches!(self, Location::Indoors(_))
    }

    pub fn current_interior(&self) -> Option<&Address> {
        match self {
            Location::Indoors(address) => Some(address),
            Location::Outdoors => None,
        }
    }
}

/// Cardinal facing for sprite selection. South is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

impl Facing {
    /// Facing for a movement vector, keeping `previous` when barely moving
    pub fn from_velocity(velocity: Vec2, previous: Facing) -> Facing {
        if velocity.length_squared() < 1e-8 {
            return previous;
        }
        if velocity.x.abs() > velocity.y.abs() {
            if velocity.x > 0.0 {
                Facing::East
            } else {
                Facing::West
            }
        } else if velocity.y > 0.0 {
            Facing::South
        } else {
            Facing::North
        }
    }
}
