pub mod components;
pub mod config;
pub mod game_logic;
pub mod map;
pub mod pathfinding;
pub mod plugins;
pub mod resources;
pub mod simulation;
pub mod terrain;

// Selective re-exports for the binaries

pub use plugins::*;

pub use game_logic::errors::{TownError, TownResult};

pub use map::{Address, Building, Interior, TerrainData, Town, TownLayout};

pub use resources::{Clock, NavigationSettings, SimClock, SimConfig, SimSettings};

pub use simulation::{PlayerState, TownSimulation};
