//! Geometric collision shapes for obstacle detection

use crate::pathfinding::NavigationGrid;
use bevy::prelude::*;

/// Geometric shapes for collision detection on the ground plane
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Circle { radius: f32 },
    Rectangle { half_extents: Vec2 },
}

impl CollisionShape {
    /// Check if a world position is inside this shape
    pub fn contains_point(&self, world_pos: Vec2, shape_center: Vec2) -> bool {
        match self {
            CollisionShape::Circle { radius } => world_pos.distance(shape_center) <= *radius,
            CollisionShape::Rectangle { half_extents } => {
                let rel_pos = world_pos - shape_center;
                rel_pos.x.abs() <= half_extents.x && rel_pos.y.abs() <= half_extents.y
            }
        }
    }

    /// Distance from a point to the shape's outline, zero inside
    pub fn distance_to(&self, world_pos: Vec2, shape_center: Vec2) -> f32 {
        match self {
            CollisionShape::Circle { radius } => {
                (world_pos.distance(shape_center) - radius).max(0.0)
            }
            CollisionShape::Rectangle { half_extents } => {
                let outside = ((world_pos - shape_center).abs() - *half_extents).max(Vec2::ZERO);
                outside.length()
            }
        }
    }

    /// Half-size of the axis-aligned box enclosing the shape
    pub fn half_extents(&self) -> Vec2 {
        match self {
            CollisionShape::Circle { radius } => Vec2::splat(*radius),
            CollisionShape::Rectangle { half_extents } => *half_extents,
        }
    }

    /// Mark the cells covered by this shape as unwalkable, returning how many changed
    pub fn block_navigation_grid(&self, nav_grid: &mut NavigationGrid, center: Vec2) -> usize {
        crate::pathfinding::grid_blocking::block_shape(nav_grid, self, center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contains_point() {
        let shape = CollisionShape::Circle { radius: 2.0 };
        let center = Vec2::ZERO;

        assert!(shape.contains_point(Vec2::new(1.0, 1.0), center));
        assert!(!shape.contains_point(Vec2::new(3.0, 0.0), center));
    }

    #[test]
    fn test_rectangle_contains_point() {
        let shape = CollisionShape::Rectangle {
            half_extents: Vec2::new(2.0, 1.0),
        };
        let center = Vec2::new(5.0, 5.0);

        assert!(shape.contains_point(Vec2::new(6.5, 5.5), center));
        assert!(!shape.contains_point(Vec2::new(5.0, 6.5), center));
    }

    #[test]
    fn test_distance_to_outline() {
        let rect = CollisionShape::Rectangle {
            half_extents: Vec2::new(2.0, 1.0),
        };
        assert_eq!(rect.distance_to(Vec2::new(0.5, 0.5), Vec2::ZERO), 0.0);
        assert!((rect.distance_to(Vec2::new(0.0, 3.0), Vec2::ZERO) - 2.0).abs() < 1e-6);
        assert!((rect.distance_to(Vec2::new(5.0, 5.0), Vec2::ZERO) - 5.0).abs() < 1e-5);

        let circle = CollisionShape::Circle { radius: 1.0 };
        assert!((circle.distance_to(Vec2::new(3.0, 0.0), Vec2::ZERO) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_half_extents() {
        assert_eq!(CollisionShape::Circle { radius: 2.5 }.half_extents(), Vec2::splat(2.5));
        let rect = CollisionShape::Rectangle {
            half_extents: Vec2::new(2.0, 1.0),
        };
        assert_eq!(rect.half_extents(), Vec2::new(2.0, 1.0));
    }
}
