//! The owned simulation context: town, navigation grid, townsfolk and clock

use crate::components::{Agent, AgentView, Location};
use crate::game_logic::agent::{TickContext, update_agent};
use crate::game_logic::avoidance::{Neighbor, NeighborKind};
use crate::game_logic::errors::TownResult;
use crate::game_logic::schedule::{DailySchedule, ScheduleState};
use crate::game_logic::spawning::{occupant_positions, place_at_home, spawn_townsfolk};
use crate::map::{BuildingRegistry, Town, TownLayout};
use crate::pathfinding::{NavigationGrid, find_path};
use crate::resources::{Clock, SimClock, SimSettings};
use bevy::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

/// The player as seen by the townsfolk. Only its position matters to them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
    pub location: Location,
}

impl PlayerState {
    fn as_neighbor(&self) -> Neighbor {
        Neighbor {
            kind: NeighborKind::Player,
            position: self.position,
            location: self.location.clone(),
        }
    }
}

pub struct TownSimulation {
    town: Town,
    grid: NavigationGrid,
    agents: Vec<Agent>,
    clock: SimClock,
    player: Option<PlayerState>,
    settings: SimSettings,
}

impl TownSimulation {
    /// Validate the layout, build the navigation grid and spawn everyone at home
    pub fn new(layout: TownLayout, settings: SimSettings) -> TownResult<Self> {
        layout.check()?;
        let mut town = Town::new(layout);
        let grid = NavigationGrid::from_town(town.terrain(), town.buildings());
        let mut rng = Pcg64::seed_from_u64(settings.seed);
        let agents = spawn_townsfolk(&mut town, &settings, &mut rng)?;

        info!(
            "Town '{}' ready: {} buildings, {} townsfolk, {}x{} grid",
            town.layout().name,
            town.buildings().len(),
            agents.len(),
            grid.width,
            grid.height
        );

        Ok(Self {
            town,
            grid,
            agents,
            clock: SimClock::new(&settings),
            player: None,
            settings,
        })
    }

    /// Advance the clock and update every agent once, in id order.
    /// Returns true when a new day started on this tick.
    pub fn tick(&mut self) -> bool {
        let new_day = self.clock.advance();
        if new_day {
            self.day_rollover();
        }

        let hour = self.clock.hour_of_day();
        let now = self.clock.elapsed_secs();
        let mut neighbors: Vec<Neighbor> = self.agents.iter().map(Neighbor::from_agent).collect();
        if let Some(player) = &self.player {
            neighbors.push(player.as_neighbor());
        }

        for index in 0..self.agents.len() {
            let agent = &mut self.agents[index];
            let mut ctx = TickContext {
                town: &mut self.town,
                grid: &self.grid,
                hour,
                now,
                neighbors: &neighbors,
                settings: &self.settings.navigation,
            };
            update_agent(agent, &mut ctx);
            neighbors[index] = Neighbor::from_agent(agent);
        }

        new_day
    }

    /// Recompute walkability from the current town. Paths planned against the old
    /// grid are replaced on their next update.
    pub fn rebuild_navigation(&mut self) {
        self.grid.rebuild(self.town.terrain(), self.town.buildings());
    }

    /// Swap the town layout, rebuild navigation and send everyone home
    pub fn replace_layout(&mut self, layout: TownLayout) -> TownResult<()> {
        layout.check()?;
        info!("Replacing town layout with '{}'", layout.name);
        self.town.replace_layout(layout);
        self.rebuild_navigation();
        self.send_everyone_home(false);
        Ok(())
    }

    /// Start-of-day reset: everyone wakes up at home with a freshly rolled schedule
    pub fn day_rollover(&mut self) {
        self.send_everyone_home(true);
        info!(
            "Day {} begins; {} townsfolk at home",
            self.clock.day,
            self.agents.iter().filter(|agent| agent.is_indoors()).count()
        );
    }

    fn send_everyone_home(&mut self, reroll_schedules: bool) {
        self.town.clear_occupants();
        let radius = self.settings.navigation.agent_radius.get();
        let now = self.clock.elapsed_secs();

        for index in 0..self.agents.len() {
            let (placed, rest) = self.agents.split_at_mut(index);
            let agent = &mut rest[0];
            agent.transition(ScheduleState::AtHouse, now);
            agent.clear_navigation();
            agent.velocity = Vec2::ZERO;
            agent.location = Location::Outdoors;
            if reroll_schedules {
                agent.schedule = DailySchedule::roll(&mut agent.rng, &self.settings);
            }
            let others = occupant_positions(placed, &agent.home);
            place_at_home(agent, &mut self.town, radius, &others);
            agent.stuck.reset(agent.position, now);
        }
    }

    /// Whether a grid path exists between two world points
    pub fn is_reachable(&self, from: Vec2, to: Vec2) -> bool {
        find_path(&self.grid, from, to).is_some()
    }

    pub fn set_player(&mut self, position: Vec2, location: Location) {
        self.player = Some(PlayerState { position, location });
    }

    pub fn clear_player(&mut self) {
        self.player = None;
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    pub fn agent_views(&self) -> Vec<AgentView> {
        self.agents.iter().map(Agent::view).collect()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn town(&self) -> &Town {
        &self.town
    }

    pub fn grid(&self) -> &NavigationGrid {
        &self.grid
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }
}
