//! Trait-based obstacle system for pathfinding collision detection

use crate::pathfinding::NavigationGrid;
use bevy::prelude::*;

pub mod building_obstacles;
pub mod collision_shapes;

pub use collision_shapes::*;

/// Core trait for objects that can obstruct pathfinding
pub trait Obstacle {
    /// Shape blocked out of the navigation grid
    fn collision_shape(&self) -> CollisionShape;

    /// Shape used for local clearance checks while steering
    fn clearance_shape(&self) -> CollisionShape {
        self.collision_shape()
    }

    /// Get the world position of this obstacle
    fn world_position(&self) -> Vec2;

    /// Test if a world position is inside this obstacle
    fn contains_point(&self, world_pos: Vec2) -> bool {
        self.collision_shape()
            .contains_point(world_pos, self.world_position())
    }

    /// Distance from a point to the clearance outline
    fn clearance_distance(&self, world_pos: Vec2) -> f32 {
        self.clearance_shape()
            .distance_to(world_pos, self.world_position())
    }

    /// Apply blocking to navigation grid, returning the number of newly blocked cells
    fn apply_blocking(&self, nav_grid: &mut NavigationGrid) -> usize {
        self.collision_shape()
            .block_navigation_grid(nav_grid, self.world_position())
    }
}
