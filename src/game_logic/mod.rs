pub mod agent;
pub mod avoidance;
pub mod errors;
pub mod interior;
pub mod movement;
pub mod names;
pub mod schedule;
pub mod spawning;
pub mod steering;
pub mod stuck;

pub use agent::*;
pub use avoidance::*;
pub use errors::*;
pub use interior::*;
pub use movement::*;
pub use names::*;
pub use schedule::*;
pub use spawning::*;
pub use stuck::*;
