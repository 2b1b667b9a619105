use bevy::prelude::*;

/// Grid coordinates (unsigned integers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: u32,
    pub y: u32,
}

impl GridCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Check if these coordinates fall inside a `width` x `height` grid
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x < width && self.y < height
    }

    /// World position of this cell's centre
    pub fn to_world(&self, cell_size: f32) -> Vec2 {
        cell_to_world(cell_size, self.x as i64, self.y as i64)
    }

    /// 4-connected neighbours inside the grid, in N, S, W, E order
    pub fn neighbors(&self, width: u32, height: u32) -> Vec<GridCoord> {
        let mut neighbors = Vec::with_capacity(4);

        // North
        if self.y > 0 {
            neighbors.push(GridCoord::new(self.x, self.y - 1));
        }

        // South
        if self.y + 1 < height {
            neighbors.push(GridCoord::new(self.x, self.y + 1));
        }

        // West
        if self.x > 0 {
            neighbors.push(GridCoord::new(self.x - 1, self.y));
        }

        // East
        if self.x + 1 < width {
            neighbors.push(GridCoord::new(self.x + 1, self.y));
        }

        neighbors
    }

    pub fn manhattan_distance(&self, other: &GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Convert a world position to the nearest cell, which may lie outside the grid
pub fn world_to_cell(cell_size: f32, world: Vec2) -> (i64, i64) {
    (
        (world.x / cell_size).round() as i64,
        (world.y / cell_size).round() as i64,
    )
}

/// Convert a world position to a cell inside a `width` x `height` grid
pub fn world_to_grid(cell_size: f32, width: u32, height: u32, world: Vec2) -> Option<GridCoord> {
    let (x, y) = world_to_cell(cell_size, world);
    if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
        Some(GridCoord::new(x as u32, y as u32))
    } else {
        None
    }
}

/// Like [`world_to_grid`] but clamps positions outside the grid onto its border
pub fn world_to_grid_clamped(cell_size: f32, width: u32, height: u32, world: Vec2) -> GridCoord {
    let (x, y) = world_to_cell(cell_size, world);
    GridCoord::new(
        x.clamp(0, width.saturating_sub(1) as i64) as u32,
        y.clamp(0, height.saturating_sub(1) as i64) as u32,
    )
}

/// Centre of a cell in world space
pub fn cell_to_world(cell_size: f32, x: i64, y: i64) -> Vec2 {
    Vec2::new(x as f32 * cell_size, y as f32 * cell_size)
}
