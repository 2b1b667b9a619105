use crate::config::range_types::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct SimConfig {
    pub settings: SimSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
// NOTE: When adding new fields, keep the `Default` impl in sync so old config files still load
pub struct SimSettings {
    // Run settings
    pub seed: u64,
    pub agent_count: u32,
    pub ticks_per_second: TickRate,
    pub day_length_secs: DayLength,
    pub start_hour: HourOfDay,

    // Schedule windows (departure must stay before noon, return after it)
    pub departure_earliest: HourOfDay,
    pub departure_latest: HourOfDay,
    pub return_earliest: HourOfDay,
    pub return_latest: HourOfDay,

    // Per-agent walking speed range, sampled once per agent
    pub walk_speed_min: WalkSpeed,
    pub walk_speed_max: WalkSpeed,

    pub navigation: NavigationSettings,

    // Town settings
    pub town_file_path: String, // Path to town file relative to the towns directory
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            agent_count: 24,
            ticks_per_second: TickRate::new(60.0),
            day_length_secs: DayLength::new(1440.0),
            start_hour: HourOfDay::new(0.0),

            departure_earliest: HourOfDay::new(6.0),
            departure_latest: HourOfDay::new(9.0),
            return_earliest: HourOfDay::new(16.0),
            return_latest: HourOfDay::new(19.0),

            walk_speed_min: WalkSpeed::new(0.02),
            walk_speed_max: WalkSpeed::new(0.05),

            navigation: NavigationSettings::default(),

            town_file_path: "town.bin".to_string(),
        }
    }
}

impl SimSettings {
    /// Departure window clamped into [0, 12) and ordered
    pub fn departure_window(&self) -> (f32, f32) {
        ordered_window(
            self.departure_earliest.get(),
            self.departure_latest.get(),
            0.0,
            11.99,
        )
    }

    /// Return window clamped into [12, 24) and ordered
    pub fn return_window(&self) -> (f32, f32) {
        ordered_window(
            self.return_earliest.get(),
            self.return_latest.get(),
            12.0,
            23.99,
        )
    }

    pub fn walk_speed_range(&self) -> (f32, f32) {
        let a = self.walk_speed_min.get();
        let b = self.walk_speed_max.get();
        (a.min(b), a.max(b))
    }

    /// In-game hours that pass per simulation tick
    pub fn hours_per_tick(&self) -> f64 {
        24.0 / (self.day_length_secs.get() as f64 * self.ticks_per_second.get() as f64)
    }

    /// Simulated seconds per tick
    pub fn secs_per_tick(&self) -> f64 {
        1.0 / self.ticks_per_second.get() as f64
    }
}

fn ordered_window(a: f32, b: f32, min: f32, max: f32) -> (f32, f32) {
    let a = a.clamp(min, max);
    let b = b.clamp(min, max);
    (a.min(b), a.max(b))
}

/// Tunables for pathing, steering and avoidance
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NavigationSettings {
    pub waypoint_reach: Tolerance,
    pub arrival_tolerance: Tolerance,
    pub building_arrival_margin: Tolerance,
    pub replan_interval: Interval,
    pub lookahead: Reach,
    pub close_lookahead: Reach,
    pub close_range: Reach,
    pub lookahead_step: Tolerance,
    pub building_clearance: Tolerance,
    pub entrance_clearance: Tolerance,
    pub stuck_window: Interval,
    pub stuck_threshold: Tolerance,
    pub avoidance_radius: Reach,
    /// Cap on the avoidance term as a fraction of the agent's speed
    pub avoidance_strength: f32,
    pub agent_radius: Tolerance,
    pub entrance_offset: Tolerance,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            waypoint_reach: Tolerance::new(0.5),
            arrival_tolerance: Tolerance::new(0.3),
            building_arrival_margin: Tolerance::new(1.0),
            replan_interval: Interval::new(2.0),
            lookahead: Reach::new(3.0),
            close_lookahead: Reach::new(1.0),
            close_range: Reach::new(2.0),
            lookahead_step: Tolerance::new(0.5),
            building_clearance: Tolerance::new(0.5),
            entrance_clearance: Tolerance::new(0.05),
            stuck_window: Interval::new(1.5),
            stuck_threshold: Tolerance::new(0.1),
            avoidance_radius: Reach::new(1.0),
            avoidance_strength: 0.5,
            agent_radius: Tolerance::new(0.25),
            entrance_offset: Tolerance::new(0.3),
        }
    }
}

/// Source of the simulated hour of day
pub trait Clock {
    /// Current hour in [0, 24)
    fn hour_of_day(&self) -> f32;
}

/// Simulated clock. Only advances when the simulation ticks, so pausing the
/// simulation pauses every timer derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    pub day: u32,
    hour: f64,
    elapsed_secs: f64,
    hours_per_tick: f64,
    secs_per_tick: f64,
}

impl SimClock {
    pub fn new(settings: &SimSettings) -> Self {
        Self {
            day: 0,
            hour: settings.start_hour.get() as f64,
            elapsed_secs: 0.0,
            hours_per_tick: settings.hours_per_tick(),
            secs_per_tick: settings.secs_per_tick(),
        }
    }

    /// Advance one tick. Returns true when the day rolled over.
    pub fn advance(&mut self) -> bool {
        self.elapsed_secs += self.secs_per_tick;
        self.hour += self.hours_per_tick;
        if self.hour >= 24.0 {
            self.hour -= 24.0;
            self.day += 1;
            return true;
        }
        false
    }

    /// Jump to an hour of the current day without touching elapsed time
    pub fn set_hour(&mut self, hour: f32) {
        self.hour = (hour as f64).rem_euclid(24.0);
    }

    /// Monotonic simulated seconds since the simulation started
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn secs_per_tick(&self) -> f64 {
        self.secs_per_tick
    }
}

impl Clock for SimClock {
    fn hour_of_day(&self) -> f32 {
        self.hour as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_are_clamped_to_their_half_of_the_day() {
        let settings = SimSettings {
            departure_earliest: HourOfDay::new(10.0),
            departure_latest: HourOfDay::new(14.0),
            return_earliest: HourOfDay::new(20.0),
            return_latest: HourOfDay::new(8.0),
            ..SimSettings::default()
        };

        let (dep_lo, dep_hi) = settings.departure_window();
        assert_eq!(dep_lo, 10.0);
        assert!(dep_hi < 12.0);

        let (ret_lo, ret_hi) = settings.return_window();
        assert_eq!(ret_lo, 12.0);
        assert_eq!(ret_hi, 20.0);
    }

    #[test]
    fn test_clock_rolls_over_after_a_full_day() {
        let settings = SimSettings {
            day_length_secs: DayLength::new(60.0),
            ticks_per_second: TickRate::new(10.0),
            ..SimSettings::default()
        };
        let mut clock = SimClock::new(&settings);

        let ticks_per_day = 600;
        let mut rollovers = 0;
        for _ in 0..ticks_per_day + 5 {
            if clock.advance() {
                rollovers += 1;
            }
        }

        assert_eq!(rollovers, 1);
        assert_eq!(clock.day, 1);
        assert!(clock.hour_of_day() < 1.0);
        assert!((clock.elapsed_secs() - 60.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_hour_wraps() {
        let mut clock = SimClock::new(&SimSettings::default());
        clock.set_hour(25.5);
        assert!((clock.hour_of_day() - 1.5).abs() < 1e-6);
        clock.set_hour(6.0);
        assert_eq!(clock.hour_of_day(), 6.0);
    }
}
