//! Buildings as static obstacles

use crate::map::Building;
use crate::pathfinding::obstacles::{CollisionShape, Obstacle};
use bevy::prelude::*;

/// The grid sees a building as its footprint circle while steering sees the
/// rectangular outline. The two disagree near the corners.
impl Obstacle for Building {
    fn collision_shape(&self) -> CollisionShape {
        CollisionShape::Circle {
            radius: self.footprint_radius(),
        }
    }

    fn clearance_shape(&self) -> CollisionShape {
        self.outline()
    }

    fn world_position(&self) -> Vec2 {
        self.position
    }
}
