use crate::components::AgentId;
use crate::game_logic::errors::{TownError, TownResult};
use crate::pathfinding::obstacles::CollisionShape;
use bevy::prelude::*;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

pub mod queries;
pub mod town;

pub use queries::*;
pub use town::*;

/// Street address identifying a building. Agents hold addresses, never buildings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct Address(pub String);

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Town description produced by town generation and consumed by the simulation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TownLayout {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(nested)]
    pub terrain: TerrainData,
    pub buildings: Vec<Building>,
    /// Where agents are dropped when no exit position can be found
    pub fallback_point: Vec2,
}

/// Per-cell terrain solidity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TerrainData {
    #[validate(range(min = 1, max = 2048))]
    pub width: u32,
    #[validate(range(min = 1, max = 2048))]
    pub height: u32,
    pub solid: Vec<bool>, // Flattened 2D array (row-major)
    #[validate(range(min = 0.1, max = 100.0))]
    pub scale: f32, // World units per grid cell
}

/// A building on the outdoor map together with its indoor scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub address: Address,
    /// Centre of the building in world space
    pub position: Vec2,
    pub size: Vec2,
    pub interior: Interior,
}

/// Indoor scene of a building, in its own local coordinate space `[0, size]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interior {
    pub size: Vec2,
    pub exit_point: Vec2,
    pub furniture: Vec<Furniture>,
    /// Agents currently inside. Runtime state, never persisted.
    #[serde(skip)]
    pub occupants: Vec<AgentId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Furniture {
    pub position: Vec2,
    pub half_extents: Vec2,
}

impl TownLayout {
    /// Create a new town layout with validation
    pub fn new(
        name: String,
        terrain: TerrainData,
        buildings: Vec<Building>,
        fallback_point: Vec2,
    ) -> TownResult<Self> {
        let layout = Self {
            name,
            terrain,
            buildings,
            fallback_point,
        };
        layout.check()?;
        Ok(layout)
    }

    /// Structural validation: field ranges plus cross-field invariants
    pub fn check(&self) -> TownResult<()> {
        self.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");
            TownError::InvalidTownData {
                reason: format!("Town validation failed: {error_details}"),
            }
        })?;

        let expected = (self.terrain.width * self.terrain.height) as usize;
        if self.terrain.solid.len() != expected {
            return Err(TownError::InvalidTownData {
                reason: format!(
                    "Solidity array size {} does not match terrain dimensions {}x{}",
                    self.terrain.solid.len(),
                    self.terrain.width,
                    self.terrain.height
                ),
            });
        }

        let extent =
            Vec2::new(self.terrain.width as f32, self.terrain.height as f32) * self.terrain.scale;
        let mut seen = HashSet::new();
        for building in &self.buildings {
            if !seen.insert(&building.address) {
                return Err(TownError::InvalidTownData {
                    reason: format!("Duplicate building address '{}'", building.address),
                });
            }
            building.check(extent)?;
        }
        Ok(())
    }

    /// Get the towns directory path
    pub fn get_towns_dir() -> TownResult<PathBuf> {
        Ok(std::env::current_dir()?.join("towns"))
    }

    /// Load a town from the towns directory
    pub fn load_from_file<P: AsRef<Path>>(filename: P) -> TownResult<Self> {
        let file_path = Self::get_towns_dir()?.join(filename);
        Self::load_from_path(&file_path)
    }

    pub fn load_from_path(file_path: &Path) -> TownResult<Self> {
        if !file_path.exists() {
            return Err(TownError::TownFileNotFound {
                path: file_path.to_path_buf(),
            });
        }

        let data = std::fs::read(file_path)?;
        let (layout, _): (TownLayout, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                TownError::CorruptedTownFile {
                    reason: format!("Failed to deserialize town data: {e}"),
                }
            })?;

        layout.check()?;
        Ok(layout)
    }

    /// Save the town to the towns directory
    pub fn save_to_file<P: AsRef<Path>>(&self, filename: P) -> TownResult<()> {
        let file_path = Self::get_towns_dir()?.join(filename);
        self.save_to_path(&file_path)
    }

    pub fn save_to_path(&self, file_path: &Path) -> TownResult<()> {
        self.check()?;

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data =
            bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
                TownError::InvalidTownData {
                    reason: format!("Failed to serialize town: {e}"),
                }
            })?;
        std::fs::write(file_path, data)?;
        Ok(())
    }

    /// Small deterministic town: a grid of houses and workplaces along open streets
    /// with a pond in the north-west corner. Used when no town file is available.
    pub fn create_demo(columns: u32, rows: u32) -> TownResult<Self> {
        const LOT: f32 = 10.0;
        const MARGIN: f32 = 6.0;
        const STREETS: &[&str] = &["Mill Lane", "Church Row", "Harbour Street", "Elm Walk"];

        let columns = columns.max(1);
        let rows = rows.max(1);
        let width = (MARGIN * 2.0 + columns as f32 * LOT) as u32;
        let height = (MARGIN * 2.0 + rows as f32 * LOT) as u32;
        let mut terrain = TerrainData::create_open(width, height, 1.0)?;
        for y in 1..4 {
            for x in 1..4 {
                terrain.set_solid(x, y, true);
            }
        }

        let mut buildings = Vec::new();
        for row in 0..rows {
            for column in 0..columns {
                let number = row * columns + column + 1;
                let street = STREETS[(row as usize) % STREETS.len()];
                let position = Vec2::new(
                    MARGIN + LOT * (column as f32 + 0.5),
                    MARGIN + LOT * (row as f32 + 0.5),
                );
                let size = if (row + column) % 3 == 0 {
                    Vec2::new(5.0, 4.0)
                } else {
                    Vec2::new(4.0, 4.0)
                };
                buildings.push(Building::new(
                    Address(format!("{number} {street}")),
                    position,
                    size,
                    Interior::with_default_furniture(Vec2::new(8.0, 6.0)),
                ));
            }
        }

        let fallback_point = Vec2::new(width as f32 * 0.5, height as f32 - MARGIN * 0.5);
        Self::new("Demo Town".to_string(), terrain, buildings, fallback_point)
    }
}

impl TerrainData {
    /// Create a new terrain with validation
    pub fn new(width: u32, height: u32, solid: Vec<bool>, scale: f32) -> TownResult<Self> {
        let expected_size = (width * height) as usize;
        if solid.len() != expected_size {
            return Err(TownError::InvalidTownData {
                reason: format!(
                    "Solidity array size {} does not match terrain dimensions {}x{} (expected {})",
                    solid.len(),
                    width,
                    height,
                    expected_size
                ),
            });
        }

        let terrain = Self {
            width,
            height,
            solid,
            scale,
        };

        terrain.validate().map_err(|_| TownError::InvalidTownData {
            reason: "Terrain validation failed".to_string(),
        })?;

        Ok(terrain)
    }

    /// Create fully passable terrain
    pub fn create_open(width: u32, height: u32, scale: f32) -> TownResult<Self> {
        Self::new(width, height, vec![false; (width * height) as usize], scale)
    }

    /// Out-of-bounds cells count as solid
    pub fn is_solid(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.solid
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(true)
    }

    pub fn set_solid(&mut self, x: u32, y: u32, solid: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y * self.width + x) as usize;
        self.solid[index] = solid;
    }
}

impl Building {
    pub fn new(address: Address, position: Vec2, size: Vec2, interior: Interior) -> Self {
        Self {
            address,
            position,
            size,
            interior,
        }
    }

    /// A footprint must be positive, finite and no larger than the terrain `extent`
    fn check(&self, extent: Vec2) -> TownResult<()> {
        let sized = self.size.cmpgt(Vec2::ZERO).all() && self.size.cmple(extent).all();
        if !sized || !self.position.is_finite() {
            return Err(TownError::InvalidTownData {
                reason: format!("Building '{}' has an invalid footprint", self.address),
            });
        }
        if !self.interior.contains(self.interior.exit_point, 0.0) {
            return Err(TownError::InvalidTownData {
                reason: format!("Exit point of '{}' lies outside its interior", self.address),
            });
        }
        Ok(())
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Half of the larger side. Used as the building's radius for arrival checks.
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) * 0.5
    }

    /// Radius of the circle blocked out of the navigation grid
    pub fn footprint_radius(&self) -> f32 {
        self.radius() * 0.9
    }

    /// Rectangular outline used by local clearance checks
    pub fn outline(&self) -> CollisionShape {
        CollisionShape::Rectangle {
            half_extents: self.half_extents(),
        }
    }

    /// A point `offset` units south of the building's south wall
    pub fn approach_point(&self, offset: f32) -> Vec2 {
        self.position + Vec2::new(0.0, self.size.y * 0.5 + offset)
    }

    /// Whether a point lies in the strip directly in front of the south wall
    pub fn in_entrance_band(&self, point: Vec2, depth: f32) -> bool {
        let half = self.half_extents();
        let rel = point - self.position;
        rel.x.abs() <= half.x * 0.5 && rel.y >= 0.0 && rel.y <= half.y + depth
    }
}

impl Interior {
    pub fn new(size: Vec2, exit_point: Vec2, furniture: Vec<Furniture>) -> Self {
        Self {
            size,
            exit_point,
            furniture,
            occupants: Vec::new(),
        }
    }

    /// Interior with a table in the middle and the exit at the bottom wall
    pub fn with_default_furniture(size: Vec2) -> Self {
        let furniture = vec![
            Furniture {
                position: size * 0.5,
                half_extents: Vec2::new(0.8, 0.5),
            },
            Furniture {
                position: Vec2::new(1.0, 1.0),
                half_extents: Vec2::new(0.5, 0.5),
            },
        ];
        let exit_point = Vec2::new(size.x * 0.5, size.y - 0.5);
        Self::new(size, exit_point, furniture)
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Whether a point lies inside the interior bounds shrunk by `margin`
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        point.x >= margin
            && point.y >= margin
            && point.x <= self.size.x - margin
            && point.y <= self.size.y - margin
    }

    /// Whether a circle of `radius` at `point` overlaps any furniture
    pub fn overlaps_furniture(&self, point: Vec2, radius: f32) -> bool {
        self.furniture.iter().any(|item| {
            CollisionShape::Rectangle {
                half_extents: item.half_extents + Vec2::splat(radius),
            }
            .contains_point(point, item.position)
        })
    }
}
