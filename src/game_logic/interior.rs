//! Moving agents between the outdoor map and building interiors

use crate::components::{Agent, Distance, Location};
use crate::game_logic::errors::{TownError, TownResult};
use crate::game_logic::spawning::is_valid_spawn_position;
use crate::map::{Address, BuildingRegistry, Town};
use bevy::prelude::*;
use rand::Rng;

const PLACEMENT_ATTEMPTS: u32 = 50;
const WALL_MARGIN: f32 = 0.5;
const OCCUPANT_SPACING: f32 = 0.6;

/// Pick a free spot inside the interior at `address`. Falls back to the interior centre.
fn sample_interior_position<R: Rng + ?Sized>(
    town: &Town,
    address: &Address,
    occupant_positions: &[Vec2],
    agent_radius: f32,
    rng: &mut R,
) -> TownResult<Option<Vec2>> {
    let interior = &town.building(address)?.interior;
    let min = Vec2::splat(WALL_MARGIN);
    let max = interior.size - Vec2::splat(WALL_MARGIN);
    if max.x <= min.x || max.y <= min.y {
        return Ok(None);
    }

    for _ in 0..PLACEMENT_ATTEMPTS {
        let candidate = Vec2::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y));
        if !interior.overlaps_furniture(candidate, agent_radius)
            && is_valid_spawn_position(candidate, occupant_positions, Distance::new(OCCUPANT_SPACING))
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Place `agent` inside the building at `address`.
///
/// `occupant_positions` are the interior-local positions of everyone already inside.
pub fn enter_building(
    agent: &mut Agent,
    town: &mut Town,
    address: &Address,
    occupant_positions: &[Vec2],
    agent_radius: f32,
) -> TownResult<()> {
    let position = match sample_interior_position(
        town,
        address,
        occupant_positions,
        agent_radius,
        &mut agent.rng,
    )? {
        Some(position) => position,
        None => {
            let centre = town.building(address)?.interior.center();
            warn!(
                "{}; using interior centre",
                TownError::PlacementFailure {
                    agent: agent.name.clone(),
                    address: address.to_string(),
                }
            );
            centre
        }
    };

    town.remove_occupant_everywhere(agent.id);
    if let Some(interior) = town.interior_mut(address) {
        interior.occupants.push(agent.id);
    }

    agent.location = Location::Indoors(address.clone());
    agent.position = position;
    agent.velocity = Vec2::ZERO;
    agent.path = None;
    agent.recovery = None;
    Ok(())
}

/// Put `agent` outside the building at `address`, near its south entrance.
/// Returns the outdoor position. Never fails: unknown buildings and blocked
/// surroundings both fall back to the town's fallback point.
pub fn exit_building(agent: &mut Agent, town: &mut Town, address: &Address, agent_radius: f32) -> Vec2 {
    town.remove_occupant_everywhere(agent.id);

    let position = match town.lookup(address) {
        Some(building) => match town.valid_position_near_building(building, agent_radius) {
            Some(position) => position,
            None => {
                warn!(
                    "{}; using fallback point",
                    TownError::PlacementFailure {
                        agent: agent.name.clone(),
                        address: address.to_string(),
                    }
                );
                town.fallback_point()
            }
        },
        None => {
            warn!(
                "{} ({}): {}; using fallback point",
                agent.name,
                agent.id,
                TownError::UnresolvedAddress {
                    address: address.to_string(),
                }
            );
            town.fallback_point()
        }
    };

    agent.location = Location::Outdoors;
    agent.position = position;
    agent.velocity = Vec2::ZERO;
    agent.path = None;
    agent.recovery = None;
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AgentId, Speed};
    use crate::game_logic::schedule::DailySchedule;
    use crate::map::{Building, Furniture, Interior, TerrainData, TownLayout, WorldQuery};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn agent(id: u32) -> Agent {
        Agent::new(
            AgentId(id),
            format!("Agent {id}"),
            Address::from("1 Mill Lane"),
            Address::from("2 Mill Lane"),
            DailySchedule::new(7.0, 17.0).unwrap(),
            Speed::new(0.03),
            Pcg64::seed_from_u64(id as u64),
        )
    }

    fn town_with(interior: Interior) -> Town {
        let terrain = TerrainData::create_open(30, 30, 1.0).unwrap();
        let layout = TownLayout::new(
            "interiors".to_string(),
            terrain,
            vec![
                Building::new(
                    Address::from("1 Mill Lane"),
                    Vec2::new(8.0, 8.0),
                    Vec2::new(4.0, 4.0),
                    interior,
                ),
                Building::new(
                    Address::from("2 Mill Lane"),
                    Vec2::new(20.0, 8.0),
                    Vec2::new(4.0, 4.0),
                    Interior::with_default_furniture(Vec2::new(8.0, 6.0)),
                ),
            ],
            Vec2::new(15.0, 27.0),
        )
        .unwrap();
        Town::new(layout)
    }

    #[test]
    fn test_enter_places_inside_away_from_furniture() {
        let mut town = town_with(Interior::with_default_furniture(Vec2::new(8.0, 6.0)));
        let address = Address::from("1 Mill Lane");
        let mut occupants = Vec::new();

        for id in 0..6 {
            let mut agent = agent(id);
            enter_building(&mut agent, &mut town, &address, &occupants, 0.25).unwrap();

            let interior = &town.lookup(&address).unwrap().interior;
            assert!(agent.is_indoors());
            assert_eq!(agent.current_interior(), Some(&address));
            assert!(interior.contains(agent.position, 0.5));
            assert!(!interior.overlaps_furniture(agent.position, 0.25));
            for other in &occupants {
                assert!(agent.position.distance(*other) >= 0.6);
            }
            occupants.push(agent.position);
        }

        assert_eq!(town.lookup(&address).unwrap().interior.occupants.len(), 6);
    }

    #[test]
    fn test_enter_falls_back_to_centre_when_crowded() {
        // Furniture covers the whole room
        let interior = Interior::new(
            Vec2::new(4.0, 4.0),
            Vec2::new(2.0, 3.5),
            vec![Furniture {
                position: Vec2::new(2.0, 2.0),
                half_extents: Vec2::splat(2.0),
            }],
        );
        let mut town = town_with(interior);
        let mut agent = agent(1);

        let address = Address::from("1 Mill Lane");
        enter_building(&mut agent, &mut town, &address, &[], 0.25).unwrap();
        assert_eq!(agent.position, Vec2::new(2.0, 2.0));
        assert_eq!(agent.location, Location::Indoors(address.clone()));
        assert_eq!(town.lookup(&address).unwrap().interior.occupants, vec![agent.id]);
    }

    #[test]
    fn test_enter_unknown_address_fails() {
        let mut town = town_with(Interior::with_default_furniture(Vec2::new(8.0, 6.0)));
        let mut agent = agent(1);

        let result = enter_building(&mut agent, &mut town, &Address::from("9 Nowhere"), &[], 0.25);
        assert!(matches!(result, Err(TownError::UnresolvedAddress { .. })));
        assert!(!agent.is_indoors());
    }

    #[test]
    fn test_exit_places_south_of_entrance() {
        let mut town = town_with(Interior::with_default_furniture(Vec2::new(8.0, 6.0)));
        let address = Address::from("1 Mill Lane");
        let mut agent = agent(1);
        enter_building(&mut agent, &mut town, &address, &[], 0.25).unwrap();

        let position = exit_building(&mut agent, &mut town, &address, 0.25);

        assert!(!agent.is_indoors());
        assert!(position.y > 10.0);
        assert!((position.x - 8.0).abs() <= 2.0);
        assert!(town.area_clear(position, 0.25));
        assert!(town.lookup(&address).unwrap().interior.occupants.is_empty());
    }

    #[test]
    fn test_exit_unknown_address_uses_fallback() {
        let mut town = town_with(Interior::with_default_furniture(Vec2::new(8.0, 6.0)));
        let mut agent = agent(1);

        let position = exit_building(&mut agent, &mut town, &Address::from("9 Nowhere"), 0.25);
        assert_eq!(position, Vec2::new(15.0, 27.0));
        assert_eq!(agent.location, Location::Outdoors);
    }

    #[test]
    fn test_exit_blocked_surroundings_use_fallback() {
        let mut terrain = TerrainData::create_open(30, 30, 1.0).unwrap();
        for y in 9..20 {
            for x in 3..14 {
                terrain.set_solid(x, y, true);
            }
        }
        let layout = TownLayout::new(
            "walled".to_string(),
            terrain,
            vec![Building::new(
                Address::from("1 Mill Lane"),
                Vec2::new(8.0, 8.0),
                Vec2::new(4.0, 4.0),
                Interior::with_default_furniture(Vec2::new(8.0, 6.0)),
            )],
            Vec2::new(25.0, 25.0),
        )
        .unwrap();
        let mut town = Town::new(layout);
        let mut agent = agent(1);

        let position = exit_building(&mut agent, &mut town, &Address::from("1 Mill Lane"), 0.25);
        assert_eq!(position, Vec2::new(25.0, 25.0));
    }
}
