//! Terrain cell space shared by the town layout and the navigation grid

pub mod coordinates;

pub use coordinates::*;
