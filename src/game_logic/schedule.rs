//! Daily routine states and the clock-driven transitions between them

use crate::game_logic::errors::{TownError, TownResult};
use crate::resources::SimSettings;
use derive_more::Display;
use rand::Rng;

/// Where an agent is in its home → work → home loop. There is no terminal state;
/// the day rollover puts everyone back to `AtHouse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ScheduleState {
    #[default]
    AtHouse,
    ExitingHouse,
    TravelingToWork,
    EnteringWork,
    AtWork,
    ExitingWork,
    TravelingToHouse,
    EnteringHouse,
}

impl ScheduleState {
    /// States in which the agent walks outdoors toward a building
    pub fn is_traveling(self) -> bool {
        matches!(
            self,
            ScheduleState::TravelingToWork | ScheduleState::TravelingToHouse
        )
    }
}

/// Hours at which an agent leaves home and leaves work
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySchedule {
    /// In [0, 12)
    pub departure: f32,
    /// In [12, 24)
    pub return_hour: f32,
}

impl DailySchedule {
    pub fn new(departure: f32, return_hour: f32) -> TownResult<Self> {
        if !(0.0..12.0).contains(&departure) || !(12.0..24.0).contains(&return_hour) {
            return Err(TownError::InvalidTownData {
                reason: format!(
                    "Schedule {departure:.2} -> {return_hour:.2} outside [0,12) / [12,24)"
                ),
            });
        }
        Ok(Self {
            departure,
            return_hour,
        })
    }

    /// Sample a schedule from the configured windows
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, settings: &SimSettings) -> Self {
        let (dep_lo, dep_hi) = settings.departure_window();
        let (ret_lo, ret_hi) = settings.return_window();
        Self {
            departure: sample_hour(rng, dep_lo, dep_hi),
            return_hour: sample_hour(rng, ret_lo, ret_hi),
        }
    }
}

fn sample_hour<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// The transitions the clock alone can trigger. Everything else is driven by arrival.
pub fn clock_transition(
    state: ScheduleState,
    hour: f32,
    schedule: &DailySchedule,
) -> Option<ScheduleState> {
    match state {
        ScheduleState::AtHouse if hour >= schedule.departure && hour < 12.0 => {
            Some(ScheduleState::ExitingHouse)
        }
        ScheduleState::AtWork if hour >= schedule.return_hour => Some(ScheduleState::ExitingWork),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_departure_not_before_scheduled_hour() {
        let schedule = DailySchedule::new(6.0, 18.0).unwrap();

        assert_eq!(clock_transition(ScheduleState::AtHouse, 5.99, &schedule), None);
        assert_eq!(
            clock_transition(ScheduleState::AtHouse, 6.0, &schedule),
            Some(ScheduleState::ExitingHouse)
        );
        // Past noon an agent still at home stays there
        assert_eq!(clock_transition(ScheduleState::AtHouse, 13.0, &schedule), None);
    }

    #[test]
    fn test_return_transition() {
        let schedule = DailySchedule::new(6.0, 18.0).unwrap();

        assert_eq!(clock_transition(ScheduleState::AtWork, 17.5, &schedule), None);
        assert_eq!(
            clock_transition(ScheduleState::AtWork, 18.0, &schedule),
            Some(ScheduleState::ExitingWork)
        );
        assert_eq!(clock_transition(ScheduleState::TravelingToWork, 18.0, &schedule), None);
    }

    #[test]
    fn test_schedule_bounds() {
        assert!(DailySchedule::new(0.0, 12.0).is_ok());
        assert!(DailySchedule::new(12.0, 18.0).is_err());
        assert!(DailySchedule::new(6.0, 24.0).is_err());
    }

    #[test]
    fn test_rolled_schedules_stay_in_windows() {
        let settings = SimSettings::default();
        let mut rng = Pcg64::seed_from_u64(9);
        for _ in 0..200 {
            let schedule = DailySchedule::roll(&mut rng, &settings);
            assert!((6.0..9.0).contains(&schedule.departure));
            assert!((16.0..19.0).contains(&schedule.return_hour));
        }
    }

    #[test]
    fn test_state_classification() {
        assert!(ScheduleState::TravelingToHouse.is_traveling());
        assert!(!ScheduleState::EnteringWork.is_traveling());
        assert_eq!(ScheduleState::default(), ScheduleState::AtHouse);
        assert_eq!(ScheduleState::EnteringHouse.to_string(), "EnteringHouse");
    }
}
