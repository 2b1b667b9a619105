//! Grid blocking operations

use crate::pathfinding::NavigationGrid;
use crate::pathfinding::obstacles::CollisionShape;
use crate::terrain::GridCoord;
use bevy::prelude::*;

/// Block every cell whose centre lies inside `shape` placed at `center`.
/// Returns the number of cells that were walkable before.
pub fn block_shape(nav_grid: &mut NavigationGrid, shape: &CollisionShape, center: Vec2) -> usize {
    if nav_grid.width == 0 || nav_grid.height == 0 {
        return 0;
    }
    let max_x = (nav_grid.width - 1) as f32;
    let max_y = (nav_grid.height - 1) as f32;
    let half_extents = shape.half_extents();
    // Scan only the bounding box, clipped to the grid
    let low = ((center - half_extents) / nav_grid.cell_size).floor();
    let high = ((center + half_extents) / nav_grid.cell_size).ceil();
    let (x0, x1) = (low.x.clamp(0.0, max_x) as u32, high.x.clamp(0.0, max_x) as u32);
    let (y0, y1) = (low.y.clamp(0.0, max_y) as u32, high.y.clamp(0.0, max_y) as u32);

    let mut blocked = 0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let cell = GridCoord::new(x, y);
            if shape.contains_point(cell.to_world(nav_grid.cell_size), center)
                && nav_grid.set_walkable(cell, false)
            {
                blocked += 1;
            }
        }
    }
    blocked
}
