use crate::components::{Agent, NavPath, Speed};
use crate::map::Building;
use crate::pathfinding::NavigationGrid;
use crate::resources::NavigationSettings;
use bevy::prelude::*;

/// One tick of straight-line movement toward `target` at `speed`, never overshooting it
pub fn calculate_movement(current_position: Vec2, target: Vec2, speed: Speed) -> Vec2 {
    let offset = target - current_position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return Vec2::ZERO;
    }
    offset / distance * speed.0.min(distance)
}

/// Whether an agent at `position` has reached its goal. With a target building the
/// goal is anywhere within the building's radius plus `building_arrival_margin`
/// of its centre; otherwise within `arrival_tolerance` of the target point.
pub fn has_arrived(
    position: Vec2,
    target: Vec2,
    target_building: Option<&Building>,
    settings: &NavigationSettings,
) -> bool {
    match target_building {
        Some(building) => {
            position.distance(building.position)
                < building.radius() + settings.building_arrival_margin.get()
        }
        None => position.distance(target) <= settings.arrival_tolerance.get(),
    }
}

/// Skip every waypoint already within reach. Returns the waypoint to steer toward.
pub fn advance_waypoints(path: &mut NavPath, position: Vec2, reach: f32) -> Option<Vec2> {
    while let Some(waypoint) = path.current_waypoint() {
        if position.distance(waypoint) > reach {
            return Some(waypoint);
        }
        path.advance();
    }
    None
}

/// Check if an agent needs to replan its path
pub fn should_replan_path(
    agent: &Agent,
    now: f64,
    navigation_grid: &NavigationGrid,
    settings: &NavigationSettings,
) -> bool {
    let Some(destination) = agent.target else {
        return false;
    };
    let interval = settings.replan_interval.get() as f64;

    match &agent.path {
        // Throttle retries after a failed plan
        None => agent
            .plan_attempted_at
            .is_none_or(|attempted| now - attempted >= interval),
        Some(path) => {
            if path.is_stale(now, interval, navigation_grid.generation()) {
                return true;
            }
            // Destination moved away from where the path ends
            path.final_destination()
                .is_some_and(|end| end.distance(destination) > navigation_grid.cell_size * 4.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::AgentId;
    use crate::game_logic::schedule::DailySchedule;
    use crate::map::{Address, Interior, TerrainData};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn agent() -> Agent {
        Agent::new(
            AgentId(0),
            "Bram Cooper".to_string(),
            Address::from("1 Mill Lane"),
            Address::from("2 Mill Lane"),
            DailySchedule::new(7.0, 17.0).unwrap(),
            Speed::new(0.03),
            Pcg64::seed_from_u64(0),
        )
    }

    #[test]
    fn test_basic_movement_calculation() {
        let step = calculate_movement(Vec2::ZERO, Vec2::new(5.0, 0.0), Speed::new(0.03));

        assert!((step.length() - 0.03).abs() < 1e-6);
        assert!(step.x > 0.0);
    }

    #[test]
    fn test_at_target_no_movement() {
        let target = Vec2::new(2.0, 3.0);
        assert_eq!(calculate_movement(target, target, Speed::new(0.03)), Vec2::ZERO);
    }

    #[test]
    fn test_movement_clamping() {
        let step = calculate_movement(Vec2::ZERO, Vec2::new(0.5, 0.0), Speed::new(1.0));
        assert_eq!(step, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_arrival_with_and_without_building() {
        let settings = NavigationSettings::default();
        let building = Building::new(
            Address::from("2 Mill Lane"),
            Vec2::new(10.0, 10.0),
            Vec2::new(4.0, 4.0),
            Interior::with_default_furniture(Vec2::new(6.0, 5.0)),
        );

        // Radius 2 + margin 1
        assert!(has_arrived(Vec2::new(10.0, 12.9), Vec2::ZERO, Some(&building), &settings));
        assert!(!has_arrived(Vec2::new(10.0, 13.1), Vec2::ZERO, Some(&building), &settings));

        assert!(has_arrived(Vec2::new(1.0, 1.2), Vec2::new(1.0, 1.0), None, &settings));
        assert!(!has_arrived(Vec2::new(1.0, 1.4), Vec2::new(1.0, 1.0), None, &settings));
    }

    #[test]
    fn test_advance_waypoints_skips_reached() {
        let mut path = NavPath::new(
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)],
            0.0,
            1,
        );

        assert_eq!(advance_waypoints(&mut path, Vec2::new(0.2, 0.0), 0.5), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(path.cursor(), 1);
        assert_eq!(advance_waypoints(&mut path, Vec2::new(1.1, 0.0), 0.5), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(path.cursor(), 2);
        assert_eq!(advance_waypoints(&mut path, Vec2::new(1.8, 0.0), 0.5), None);
        assert!(path.is_exhausted());
    }

    #[test]
    fn test_replan_conditions() {
        let settings = NavigationSettings::default();
        let terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        let mut grid = NavigationGrid::from_town(&terrain, &[]);
        let mut agent = agent();

        // Nothing to plan for
        assert!(!should_replan_path(&agent, 0.0, &grid, &settings));

        agent.target = Some(Vec2::new(8.0, 8.0));
        assert!(should_replan_path(&agent, 0.0, &grid, &settings));

        // Failed attempt is retried only after the interval
        agent.plan_attempted_at = Some(0.0);
        assert!(!should_replan_path(&agent, 1.0, &grid, &settings));
        assert!(should_replan_path(&agent, 2.0, &grid, &settings));

        agent.path = Some(NavPath::new(vec![Vec2::ZERO, Vec2::new(8.0, 8.0)], 0.0, grid.generation()));
        assert!(!should_replan_path(&agent, 1.0, &grid, &settings));
        assert!(should_replan_path(&agent, 2.0, &grid, &settings));

        // Grid rebuilt
        grid.rebuild(&terrain, &[]);
        assert!(should_replan_path(&agent, 1.0, &grid, &settings));
    }
}
