//! Runtime building registry over a loaded town layout

use crate::components::AgentId;
use crate::game_logic::errors::{TownError, TownResult};
use crate::map::{Address, Building, BuildingRegistry, Interior, TerrainData, TownLayout, WorldQuery};
use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Town {
    layout: TownLayout,
    index: HashMap<Address, usize>,
}

impl Town {
    pub fn new(layout: TownLayout) -> Self {
        let index = layout
            .buildings
            .iter()
            .enumerate()
            .map(|(i, building)| (building.address.clone(), i))
            .collect();
        Self { layout, index }
    }

    pub fn layout(&self) -> &TownLayout {
        &self.layout
    }

    pub fn terrain(&self) -> &TerrainData {
        &self.layout.terrain
    }

    pub fn fallback_point(&self) -> Vec2 {
        self.layout.fallback_point
    }

    /// Resolve an address or report it as unresolved
    pub fn building(&self, address: &Address) -> TownResult<&Building> {
        self.lookup(address).ok_or_else(|| TownError::UnresolvedAddress {
            address: address.to_string(),
        })
    }

    pub fn interior_mut(&mut self, address: &Address) -> Option<&mut Interior> {
        let index = *self.index.get(address)?;
        self.layout
            .buildings
            .get_mut(index)
            .map(|building| &mut building.interior)
    }

    /// Swap in a new layout. Occupant lists start empty; the navigation grid must be
    /// rebuilt before the next path query.
    pub fn replace_layout(&mut self, layout: TownLayout) {
        *self = Self::new(layout);
    }

    pub fn remove_occupant_everywhere(&mut self, agent: AgentId) {
        for building in &mut self.layout.buildings {
            building.interior.occupants.retain(|id| *id != agent);
        }
    }

    pub fn clear_occupants(&mut self) {
        for building in &mut self.layout.buildings {
            building.interior.occupants.clear();
        }
    }
}

impl WorldQuery for Town {
    fn bounds(&self) -> (u32, u32) {
        (self.layout.terrain.width, self.layout.terrain.height)
    }

    fn cell_size(&self) -> f32 {
        self.layout.terrain.scale
    }

    fn is_solid(&self, x: u32, y: u32) -> bool {
        self.layout.terrain.is_solid(x, y)
    }
}

impl BuildingRegistry for Town {
    fn lookup(&self, address: &Address) -> Option<&Building> {
        self.index
            .get(address)
            .and_then(|&i| self.layout.buildings.get(i))
    }

    fn buildings(&self) -> &[Building] {
        &self.layout.buildings
    }
}
