//! Collaborator seams the navigation core queries the world through

use crate::map::{Address, Building};
use bevy::prelude::*;

/// Terrain / area collision queries
pub trait WorldQuery {
    /// Grid dimensions in cells
    fn bounds(&self) -> (u32, u32);

    /// World units per cell
    fn cell_size(&self) -> f32;

    /// Per-cell solidity. Out-of-bounds cells are solid.
    fn is_solid(&self, x: u32, y: u32) -> bool;

    /// Whether a circle of `radius` at `position` is free of solid terrain and inside the map
    fn area_clear(&self, position: Vec2, radius: f32) -> bool {
        let diagonal = radius * std::f32::consts::FRAC_1_SQRT_2;
        let samples = [
            Vec2::ZERO,
            Vec2::new(radius, 0.0),
            Vec2::new(-radius, 0.0),
            Vec2::new(0.0, radius),
            Vec2::new(0.0, -radius),
            Vec2::new(diagonal, diagonal),
            Vec2::new(-diagonal, diagonal),
            Vec2::new(diagonal, -diagonal),
            Vec2::new(-diagonal, -diagonal),
        ];
        let (width, height) = self.bounds();
        let cell_size = self.cell_size();

        samples.iter().all(|offset| {
            let sample = position + *offset;
            match crate::terrain::world_to_grid(cell_size, width, height, sample) {
                Some(cell) => !self.is_solid(cell.x, cell.y),
                None => false,
            }
        })
    }
}

/// Building lookups
pub trait BuildingRegistry: WorldQuery {
    fn lookup(&self, address: &Address) -> Option<&Building>;

    fn buildings(&self) -> &[Building];

    /// Find an outdoor spot near `building`'s south entrance that is area-clear and
    /// outside every other building's footprint
    fn valid_position_near_building(&self, building: &Building, radius: f32) -> Option<Vec2> {
        const LATERAL_OFFSETS: [f32; 9] = [0.0, -0.5, 0.5, -1.0, 1.0, -1.5, 1.5, -2.0, 2.0];
        const ROWS: u32 = 6;
        const ROW_SPACING: f32 = 0.5;

        let base = building.approach_point(radius + 0.25);
        for row in 0..ROWS {
            for dx in LATERAL_OFFSETS {
                let candidate = base + Vec2::new(dx, row as f32 * ROW_SPACING);
                if !self.area_clear(candidate, radius) {
                    continue;
                }
                let blocked_by_other = self
                    .buildings()
                    .iter()
                    .filter(|other| other.address != building.address)
                    .any(|other| {
                        candidate.distance(other.position) < other.footprint_radius() + radius
                    });
                if !blocked_by_other {
                    return Some(candidate);
                }
            }
        }
        None
    }
}
