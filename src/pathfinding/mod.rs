use crate::map::{Building, TerrainData};
use crate::terrain::coordinates::*;
use bevy::prelude::*;
use pathfinding::prelude::astar;

pub mod grid_blocking;
pub mod obstacles;

pub use obstacles::*;

/// How far (in cells) to search for a walkable substitute for a blocked start or goal
const NEAREST_WALKABLE_RINGS: i64 = 3;

/// Navigation grid for pathfinding
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationGrid {
    /// Walkability map - true if the cell is walkable
    pub walkable: Vec<bool>,
    /// Grid dimensions
    pub width: u32,
    pub height: u32,
    /// World scale per grid cell
    pub cell_size: f32,
    /// Bumped on every rebuild so paths planned on an older grid can be detected
    generation: u64,
}

impl Default for NavigationGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl NavigationGrid {
    /// A grid that has never been built. Every query on it fails.
    pub fn empty() -> Self {
        Self {
            walkable: Vec::new(),
            width: 0,
            height: 0,
            cell_size: 1.0,
            generation: 0,
        }
    }

    /// Build a navigation grid from terrain data and building footprints
    pub fn from_town(terrain: &TerrainData, buildings: &[Building]) -> Self {
        let mut nav_grid = Self::empty();
        nav_grid.rebuild(terrain, buildings);
        nav_grid
    }

    /// Recompute walkability from scratch: solid terrain and every building's
    /// footprint circle are unwalkable, everything else is walkable
    pub fn rebuild(&mut self, terrain: &TerrainData, buildings: &[Building]) {
        self.width = terrain.width;
        self.height = terrain.height;
        self.cell_size = terrain.scale;
        self.walkable = vec![true; (terrain.width * terrain.height) as usize];

        let mut terrain_blocked = 0;
        for y in 0..terrain.height {
            for x in 0..terrain.width {
                if terrain.is_solid(x, y) && self.set_walkable(GridCoord::new(x, y), false) {
                    terrain_blocked += 1;
                }
            }
        }

        let building_blocked: usize = buildings
            .iter()
            .map(|building| building.apply_blocking(self))
            .sum();

        self.generation += 1;

        let total_cells = self.walkable.len();
        info!(
            "Navigation grid rebuilt (generation {}): {}x{}, {} blocked by terrain, {} by {} buildings ({:.1}% blocked)",
            self.generation,
            self.width,
            self.height,
            terrain_blocked,
            building_blocked,
            buildings.len(),
            (self.blocked_count() as f32 / total_cells.max(1) as f32) * 100.0
        );
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `rebuild` has run at least once
    pub fn is_built(&self) -> bool {
        self.generation > 0 && !self.walkable.is_empty()
    }

    /// Check if a grid position is walkable
    pub fn is_walkable(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = (y * self.width + x) as usize;
        self.walkable.get(index).copied().unwrap_or(false)
    }

    /// Set a cell's walkability, returning whether it changed
    pub fn set_walkable(&mut self, node: GridCoord, walkable: bool) -> bool {
        if !node.is_within(self.width, self.height) {
            return false;
        }
        let index = (node.y * self.width + node.x) as usize;
        match self.walkable.get_mut(index) {
            Some(cell) if *cell != walkable => {
                *cell = walkable;
                true
            }
            _ => false,
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| !w).count()
    }

    /// Convert world position to grid coordinates, returning None if out of bounds
    pub fn world_to_grid(&self, world_pos: Vec2) -> Option<GridCoord> {
        world_to_grid(self.cell_size, self.width, self.height, world_pos)
    }

    pub fn grid_to_world(&self, node: GridCoord) -> Vec2 {
        node.to_world(self.cell_size)
    }

    /// Nearest walkable cell to `node`, searching outward in square rings
    pub fn nearest_walkable(&self, node: GridCoord) -> Option<GridCoord> {
        if self.is_walkable(node.x, node.y) {
            return Some(node);
        }

        for ring in 1..=NEAREST_WALKABLE_RINGS {
            let mut best: Option<(GridCoord, f32)> = None;
            for dy in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dy.abs() != ring {
                        continue;
                    }
                    let x = node.x as i64 + dx;
                    let y = node.y as i64 + dy;
                    if x < 0 || y < 0 || !self.is_walkable(x as u32, y as u32) {
                        continue;
                    }
                    let distance = ((dx * dx + dy * dy) as f32).sqrt();
                    if best.is_none_or(|(_, d)| distance < d) {
                        best = Some((GridCoord::new(x as u32, y as u32), distance));
                    }
                }
            }
            if let Some((cell, _)) = best {
                return Some(cell);
            }
        }
        None
    }

    /// Walkable 4-connected neighbours with unit step cost
    fn successors(&self, node: &GridCoord) -> Vec<(GridCoord, u32)> {
        node.neighbors(self.width, self.height)
            .into_iter()
            .filter(|neighbor| self.is_walkable(neighbor.x, neighbor.y))
            .map(|neighbor| (neighbor, 1))
            .collect()
    }
}

/// Find a path between two world positions using A* pathfinding.
///
/// Start and goal are clamped onto the grid and, if blocked, moved to the nearest
/// walkable cell within three rings. The result runs from the start cell to the goal
/// cell inclusive, as cell-centre world positions. `None` means no path; callers fall
/// back to direct steering.
pub fn find_path(navigation_grid: &NavigationGrid, start_world: Vec2, goal_world: Vec2) -> Option<Vec<Vec2>> {
    if !navigation_grid.is_built() {
        return None;
    }

    let (width, height, cell_size) = (
        navigation_grid.width,
        navigation_grid.height,
        navigation_grid.cell_size,
    );
    let start_node =
        navigation_grid.nearest_walkable(world_to_grid_clamped(cell_size, width, height, start_world));
    let goal_node =
        navigation_grid.nearest_walkable(world_to_grid_clamped(cell_size, width, height, goal_world));

    let (Some(start_node), Some(goal_node)) = (start_node, goal_node) else {
        debug!(
            "Pathfinding failed: no walkable cell near start=({:.1},{:.1}) or goal=({:.1},{:.1})",
            start_world.x, start_world.y, goal_world.x, goal_world.y
        );
        return None;
    };

    let (path, cost) = astar(
        &start_node,
        |node| navigation_grid.successors(node),
        |node| node.manhattan_distance(&goal_node),
        |node| *node == goal_node,
    )?;

    debug!(
        "Pathfinding success: ({},{}) -> ({},{}) in {} steps",
        start_node.x, start_node.y, goal_node.x, goal_node.y, cost
    );

    Some(
        path.into_iter()
            .map(|node| navigation_grid.grid_to_world(node))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Address, Interior};

    fn building(position: Vec2, size: Vec2) -> Building {
        Building::new(
            Address::from("1 Mill Lane"),
            position,
            size,
            Interior::with_default_furniture(Vec2::new(6.0, 5.0)),
        )
    }

    fn assert_valid_path(nav_grid: &NavigationGrid, path: &[Vec2]) {
        let cells: Vec<GridCoord> = path
            .iter()
            .map(|waypoint| nav_grid.world_to_grid(*waypoint).unwrap())
            .collect();
        for cell in &cells {
            assert!(
                nav_grid.is_walkable(cell.x, cell.y),
                "waypoint ({}, {}) is blocked",
                cell.x,
                cell.y
            );
        }
        for pair in cells.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_empty_grid_has_no_paths() {
        let nav_grid = NavigationGrid::empty();
        assert!(!nav_grid.is_built());
        assert!(find_path(&nav_grid, Vec2::ZERO, Vec2::new(3.0, 3.0)).is_none());
    }

    #[test]
    fn test_rebuild_blocks_terrain_and_footprints() {
        let mut terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        terrain.set_solid(0, 9, true);
        let buildings = vec![building(Vec2::new(5.0, 5.0), Vec2::new(4.0, 4.0))];

        let nav_grid = NavigationGrid::from_town(&terrain, &buildings);

        assert!(!nav_grid.is_walkable(0, 9));
        // Footprint radius 1.8 blocks the 3x3 block around the centre
        assert!(!nav_grid.is_walkable(5, 5));
        assert!(!nav_grid.is_walkable(4, 4));
        assert!(!nav_grid.is_walkable(6, 6));
        assert!(nav_grid.is_walkable(3, 5));
        assert_eq!(nav_grid.blocked_count(), 10);
        assert_eq!(nav_grid.generation(), 1);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let terrain = TerrainData::create_open(12, 12, 1.0).unwrap();
        let buildings = vec![
            building(Vec2::new(4.0, 4.0), Vec2::new(3.0, 3.0)),
            building(Vec2::new(8.0, 8.0), Vec2::new(5.0, 2.0)),
        ];

        let mut nav_grid = NavigationGrid::from_town(&terrain, &buildings);
        let first = nav_grid.walkable.clone();
        nav_grid.rebuild(&terrain, &buildings);

        assert_eq!(nav_grid.walkable, first);
        assert_eq!(nav_grid.generation(), 2);
    }

    #[test]
    fn test_corner_to_corner_avoids_central_building() {
        let terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        let buildings = vec![building(Vec2::new(5.0, 5.0), Vec2::new(4.0, 4.0))];
        let nav_grid = NavigationGrid::from_town(&terrain, &buildings);

        let path = find_path(&nav_grid, Vec2::new(0.0, 0.0), Vec2::new(9.0, 9.0)).unwrap();

        assert_eq!(path.first(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(path.last(), Some(&Vec2::new(9.0, 9.0)));
        assert_eq!(path.len(), 19); // Manhattan optimal
        assert_valid_path(&nav_grid, &path);
    }

    #[test]
    fn test_path_around_wall() {
        let mut terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        for y in 0..8 {
            terrain.set_solid(5, y, true);
        }
        let nav_grid = NavigationGrid::from_town(&terrain, &[]);

        let path = find_path(&nav_grid, Vec2::new(1.0, 1.0), Vec2::new(8.0, 1.0)).unwrap();
        assert_valid_path(&nav_grid, &path);
        assert!(path.iter().any(|waypoint| waypoint.y >= 8.0));
    }

    #[test]
    fn test_disjoint_regions_have_no_path() {
        let mut terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        for y in 0..10 {
            terrain.set_solid(5, y, true);
        }
        let nav_grid = NavigationGrid::from_town(&terrain, &[]);

        assert!(find_path(&nav_grid, Vec2::new(1.0, 1.0), Vec2::new(8.0, 8.0)).is_none());
    }

    #[test]
    fn test_blocked_goal_snaps_to_nearest_walkable() {
        let terrain = TerrainData::create_open(10, 10, 1.0).unwrap();
        let buildings = vec![building(Vec2::new(5.0, 5.0), Vec2::new(4.0, 4.0))];
        let nav_grid = NavigationGrid::from_town(&terrain, &buildings);

        let path = find_path(&nav_grid, Vec2::new(0.0, 5.0), Vec2::new(5.0, 5.0)).unwrap();
        let end = nav_grid.world_to_grid(*path.last().unwrap()).unwrap();
        assert!(nav_grid.is_walkable(end.x, end.y));
        assert!(end.manhattan_distance(&GridCoord::new(5, 5)) <= 4);
        assert_valid_path(&nav_grid, &path);
    }

    #[test]
    fn test_goal_beyond_search_rings_fails() {
        let mut terrain = TerrainData::create_open(12, 12, 1.0).unwrap();
        for y in 0..9 {
            for x in 0..9 {
                terrain.set_solid(x, y, true);
            }
        }
        let nav_grid = NavigationGrid::from_town(&terrain, &[]);

        assert_eq!(nav_grid.nearest_walkable(GridCoord::new(1, 1)), None);
        assert!(find_path(&nav_grid, Vec2::new(11.0, 11.0), Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_out_of_bounds_points_are_clamped() {
        let terrain = TerrainData::create_open(6, 6, 1.0).unwrap();
        let nav_grid = NavigationGrid::from_town(&terrain, &[]);

        let path = find_path(&nav_grid, Vec2::new(-4.0, -4.0), Vec2::new(20.0, 2.0)).unwrap();
        assert_eq!(path.first(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(path.last(), Some(&Vec2::new(5.0, 2.0)));
    }

    #[test]
    fn test_same_cell_path_is_single_waypoint() {
        let terrain = TerrainData::create_open(6, 6, 1.0).unwrap();
        let nav_grid = NavigationGrid::from_town(&terrain, &[]);

        let path = find_path(&nav_grid, Vec2::new(2.1, 2.2), Vec2::new(1.8, 2.4)).unwrap();
        assert_eq!(path, vec![Vec2::new(2.0, 2.0)]);
    }

    #[test]
    fn test_equal_inputs_give_identical_paths() {
        let terrain = TerrainData::create_open(16, 16, 1.0).unwrap();
        let buildings = vec![building(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0))];
        let nav_grid = NavigationGrid::from_town(&terrain, &buildings);

        let a = find_path(&nav_grid, Vec2::new(1.0, 2.0), Vec2::new(14.0, 13.0));
        let b = find_path(&nav_grid, Vec2::new(1.0, 2.0), Vec2::new(14.0, 13.0));
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
