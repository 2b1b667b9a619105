//! Pairwise repulsion between moving outdoor agents and the player

use crate::components::{Agent, AgentId, Location};
use bevy::prelude::*;

/// Below this separation two entities count as coincident and do not push each other
const COINCIDENT_DISTANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborKind {
    Agent(AgentId),
    Player,
}

/// Snapshot of another entity's position for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub kind: NeighborKind,
    pub position: Vec2,
    pub location: Location,
}

impl Neighbor {
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            kind: NeighborKind::Agent(agent.id),
            position: agent.position,
            location: agent.location.clone(),
        }
    }

    pub fn is_outdoors(&self) -> bool {
        !self.location.is_indoors()
    }
}

/// Avoidance force calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidanceForces {
    /// Raw sum of the repulsive terms
    pub separation: Vec2,
    /// Separation clamped to the allowed magnitude
    pub total_force: Vec2,
}

impl AvoidanceForces {
    pub const NONE: AvoidanceForces = AvoidanceForces {
        separation: Vec2::ZERO,
        total_force: Vec2::ZERO,
    };
}

/// Calculate the repulsion acting on agent `id`.
///
/// Only moving outdoor agents are pushed, and only by outdoor neighbours within
/// `radius`. Each neighbour contributes `1 / distance` along the separating
/// direction; the sum is clamped to `max_magnitude`.
pub fn calculate_avoidance(
    id: AgentId,
    position: Vec2,
    velocity: Vec2,
    location: &Location,
    neighbors: &[Neighbor],
    radius: f32,
    max_magnitude: f32,
) -> AvoidanceForces {
    if location.is_indoors() || velocity.length_squared() < 1e-12 {
        return AvoidanceForces::NONE;
    }

    let mut separation = Vec2::ZERO;
    for neighbor in neighbors {
        if neighbor.kind == NeighborKind::Agent(id) || !neighbor.is_outdoors() {
            continue;
        }

        let offset = position - neighbor.position;
        let distance = offset.length();
        if distance < radius && distance >= COINCIDENT_DISTANCE {
            separation += offset / distance * (1.0 / distance);
        }
    }

    AvoidanceForces {
        separation,
        total_force: separation.clamp_length_max(max_magnitude),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Address;

    fn outdoor(id: u32, position: Vec2) -> Neighbor {
        Neighbor {
            kind: NeighborKind::Agent(AgentId(id)),
            position,
            location: Location::Outdoors,
        }
    }

    #[test]
    fn test_stationary_agent_gets_no_avoidance() {
        let neighbors = vec![outdoor(1, Vec2::new(0.2, 0.0))];
        let forces = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::ZERO,
            &Location::Outdoors,
            &neighbors,
            1.0,
            0.015,
        );
        assert_eq!(forces, AvoidanceForces::NONE);
    }

    #[test]
    fn test_two_close_agents_push_apart() {
        let a = Vec2::new(5.0, 5.0);
        let b = Vec2::new(5.3, 5.0);
        let neighbors = vec![outdoor(0, a), outdoor(1, b)];
        let max = 0.5 * 0.03;

        let on_a = calculate_avoidance(AgentId(0), a, Vec2::Y * 0.03, &Location::Outdoors, &neighbors, 1.0, max);
        let on_b = calculate_avoidance(AgentId(1), b, Vec2::NEG_Y * 0.03, &Location::Outdoors, &neighbors, 1.0, max);

        assert!(on_a.total_force.x < 0.0);
        assert!(on_b.total_force.x > 0.0);
        assert!(on_a.total_force.length() <= max + 1e-6);
        assert!(on_b.total_force.length() <= max + 1e-6);
        assert!((on_a.separation.length() - 1.0 / 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_indoor_entities_are_ignored() {
        let neighbors = vec![
            Neighbor {
                kind: NeighborKind::Player,
                position: Vec2::new(0.5, 0.0),
                location: Location::Indoors(Address::from("1 Mill Lane")),
            },
            outdoor(2, Vec2::new(0.0, 5.0)), // Out of range
        ];
        let forces = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::X,
            &Location::Outdoors,
            &neighbors,
            1.0,
            1.0,
        );
        assert_eq!(forces.total_force, Vec2::ZERO);

        // An indoor agent is never pushed, even by outdoor neighbours
        let forces = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::X,
            &Location::Indoors(Address::from("1 Mill Lane")),
            &[outdoor(1, Vec2::new(0.2, 0.0))],
            1.0,
            1.0,
        );
        assert_eq!(forces, AvoidanceForces::NONE);
    }

    #[test]
    fn test_player_repels_and_coincident_does_not() {
        let neighbors = vec![
            Neighbor {
                kind: NeighborKind::Player,
                position: Vec2::new(0.0, 0.5),
                location: Location::Outdoors,
            },
            outdoor(3, Vec2::new(0.0, 0.0005)),
        ];
        let forces = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::X,
            &Location::Outdoors,
            &neighbors,
            1.0,
            10.0,
        );
        assert!((forces.separation - Vec2::new(0.0, -2.0)).length() < 1e-4);
    }

    #[test]
    fn test_closer_neighbors_push_harder() {
        let close = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::X,
            &Location::Outdoors,
            &[outdoor(1, Vec2::new(0.25, 0.0))],
            1.0,
            100.0,
        );
        let far = calculate_avoidance(
            AgentId(0),
            Vec2::ZERO,
            Vec2::X,
            &Location::Outdoors,
            &[outdoor(1, Vec2::new(0.75, 0.0))],
            1.0,
            100.0,
        );
        assert!(close.separation.length() > far.separation.length());
    }
}
