use crate::components::{Agent, AgentId, Distance, Speed};
use crate::game_logic::errors::{TownError, TownResult};
use crate::game_logic::interior::enter_building;
use crate::game_logic::names::NameGenerator;
use crate::game_logic::schedule::DailySchedule;
use crate::map::{Address, BuildingRegistry, Town};
use crate::resources::SimSettings;
use bevy::prelude::*;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64;

/// Check if a position is valid for spawning (not too close to other entities)
pub fn is_valid_spawn_position(
    position: Vec2,
    existing_positions: &[Vec2],
    min_distance: Distance,
) -> bool {
    existing_positions
        .iter()
        .all(|existing_pos| position.distance(*existing_pos) >= min_distance.0)
}

/// Home and work building indices for the `index`-th agent. Work differs from
/// home whenever the town has more than one building.
pub fn assign_buildings(index: usize, building_count: usize) -> (usize, usize) {
    let home = index % building_count;
    if building_count < 2 {
        return (home, home);
    }
    let offset = 1 + (index / building_count) % (building_count - 1);
    (home, (home + offset) % building_count)
}

/// Place an agent inside its home, or at the fallback point when home is unknown
pub fn place_at_home(agent: &mut Agent, town: &mut Town, agent_radius: f32, others: &[Vec2]) {
    let home = agent.home.clone();
    if let Err(err) = enter_building(agent, town, &home, others, agent_radius) {
        warn!("{} ({}) cannot be placed at home: {err}", agent.name, agent.id);
        agent.location = crate::components::Location::Outdoors;
        agent.position = town.fallback_point();
    }
}

/// Interior-local positions of the agents already inside `address`
pub fn occupant_positions(agents: &[Agent], address: &Address) -> Vec<Vec2> {
    agents
        .iter()
        .filter(|other| other.current_interior() == Some(address))
        .map(|other| other.position)
        .collect()
}

/// Create the town's population, each agent starting inside its home
pub fn spawn_townsfolk(
    town: &mut Town,
    settings: &SimSettings,
    rng: &mut Pcg64,
) -> TownResult<Vec<Agent>> {
    let addresses: Vec<Address> = town
        .buildings()
        .iter()
        .map(|building| building.address.clone())
        .collect();
    if addresses.is_empty() {
        return Err(TownError::InvalidTownData {
            reason: "Town has no buildings to house agents".to_string(),
        });
    }

    let mut names = NameGenerator::new();
    let (speed_lo, speed_hi) = settings.walk_speed_range();
    let agent_radius = settings.navigation.agent_radius.get();
    let mut agents: Vec<Agent> = Vec::with_capacity(settings.agent_count as usize);

    for index in 0..settings.agent_count as usize {
        let (home, work) = assign_buildings(index, addresses.len());
        let name = names.generate(rng);
        let schedule = DailySchedule::roll(rng, settings);
        let speed = Speed::new(rng.gen_range(speed_lo..=speed_hi));
        let agent_rng = Pcg64::seed_from_u64(rng.next_u64());

        let mut agent = Agent::new(
            AgentId(index as u32),
            name,
            addresses[home].clone(),
            addresses[work].clone(),
            schedule,
            speed,
            agent_rng,
        );
        let others = occupant_positions(&agents, &agent.home);
        place_at_home(&mut agent, town, agent_radius, &others);
        agent.stuck.reset(agent.position, 0.0);

        debug!(
            "Spawned {} ({}): home '{}', work '{}', leaves {:.2}, returns {:.2}",
            agent.name,
            agent.id,
            agent.home,
            agent.work,
            agent.schedule.departure,
            agent.schedule.return_hour
        );
        agents.push(agent);
    }

    info!(
        "Spawned {} townsfolk across {} buildings",
        agents.len(),
        addresses.len()
    );
    Ok(agents)
}
