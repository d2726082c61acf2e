//! Bulk tile writes, one batch per tile type.
//!
//! The renderer keeps ground as its base layer and paints the other types
//! on their own layers: mud on a drag layer that slows tanks, water on the
//! lower collider layer, forest on the upper collider layer.

use serde::{Deserialize, Serialize};

use crate::terrain::{ClassifiedGrid, TileType};
use crate::tilemap::{TilePos, Tilemap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileLayer {
    Base,
    Drag,
    LowerCollider,
    UpperCollider,
}

impl TileLayer {
    pub const ALL: [TileLayer; 4] = [
        TileLayer::Base,
        TileLayer::Drag,
        TileLayer::LowerCollider,
        TileLayer::UpperCollider,
    ];

    fn index(&self) -> usize {
        match self {
            TileLayer::Base => 0,
            TileLayer::Drag => 1,
            TileLayer::LowerCollider => 2,
            TileLayer::UpperCollider => 3,
        }
    }
}

impl TileType {
    pub fn layer(&self) -> TileLayer {
        match self {
            TileType::Ground => TileLayer::Base,
            TileType::Mud => TileLayer::Drag,
            TileType::Water => TileLayer::LowerCollider,
            TileType::Forest => TileLayer::UpperCollider,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileBatch {
    pub layer: TileLayer,
    pub tile_type: TileType,
    pub positions: Vec<TilePos>,
}

/// Receiver of bulk tile writes, implemented by whatever draws the map.
pub trait TileSink {
    /// Remove every tile from every layer.
    fn clear(&mut self);

    fn set_tiles(&mut self, layer: TileLayer, tile_type: TileType, positions: &[TilePos]);
}

/// Group the grid's cells by tile type, in band order. Empty types are skipped.
pub fn build_batches(grid: &ClassifiedGrid) -> Vec<TileBatch> {
    let mut batches: Vec<TileBatch> = grid
        .bands()
        .iter()
        .map(|band| TileBatch {
            layer: band.tile_type.layer(),
            tile_type: band.tile_type,
            positions: Vec::new(),
        })
        .collect();

    for (x, y, &tile) in grid.tiles().iter() {
        if let Some(batch) = batches.iter_mut().find(|b| b.tile_type == tile) {
            batch.positions.push(TilePos::new(x as i32, y as i32));
        }
    }

    batches.retain(|b| !b.positions.is_empty());
    batches
}

/// Replace the sink's contents with the batches.
pub fn write_batches<S: TileSink + ?Sized>(batches: &[TileBatch], sink: &mut S) {
    sink.clear();
    for batch in batches {
        sink.set_tiles(batch.layer, batch.tile_type, &batch.positions);
    }
}

/// In-memory sink with one grid per layer.
#[derive(Clone, Debug)]
pub struct LayeredTilemap {
    layers: [Tilemap<Option<TileType>>; 4],
}

impl LayeredTilemap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            layers: std::array::from_fn(|_| Tilemap::new(width, height)),
        }
    }

    pub fn layer(&self, layer: TileLayer) -> &Tilemap<Option<TileType>> {
        &self.layers[layer.index()]
    }

    /// Topmost tile at a cell, looking from the upper collider layer down.
    pub fn top_tile(&self, pos: TilePos) -> Option<TileType> {
        TileLayer::ALL
            .iter()
            .rev()
            .find_map(|&l| self.layers[l.index()].get_at(pos).copied().flatten())
    }

    pub fn tile_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.iter().filter(|(_, _, t)| t.is_some()).count())
            .sum()
    }
}

impl TileSink for LayeredTilemap {
    fn clear(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.fill(None);
        }
    }

    fn set_tiles(&mut self, layer: TileLayer, tile_type: TileType, positions: &[TilePos]) {
        let target = &mut self.layers[layer.index()];
        for &pos in positions {
            if target.contains(pos) {
                target.set(pos.x as usize, pos.y as usize, Some(tile_type));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{default_band_specs, TerrainBands};

    fn small_grid() -> ClassifiedGrid {
        // Water, mud, ground, ground
        let noise = Tilemap::from_vec(2, 2, vec![0.1f32, 0.25, 0.5, 0.6]).unwrap();
        ClassifiedGrid::classify(&noise, &TerrainBands::new(&default_band_specs()).unwrap())
    }

    #[test]
    fn test_batches_follow_band_order_and_skip_empty() {
        let batches = build_batches(&small_grid());
        let types: Vec<_> = batches.iter().map(|b| b.tile_type).collect();
        assert_eq!(types, vec![TileType::Water, TileType::Mud, TileType::Ground]);

        let ground = &batches[2];
        assert_eq!(ground.layer, TileLayer::Base);
        assert_eq!(ground.positions, vec![TilePos::new(0, 1), TilePos::new(1, 1)]);
    }

    #[test]
    fn test_every_cell_written_once() {
        let grid = small_grid();
        let mut sink = LayeredTilemap::new(2, 2);
        write_batches(&build_batches(&grid), &mut sink);

        assert_eq!(sink.tile_count(), 4);
        assert_eq!(sink.top_tile(TilePos::new(0, 0)), Some(TileType::Water));
        assert_eq!(sink.top_tile(TilePos::new(1, 0)), Some(TileType::Mud));
        assert_eq!(*sink.layer(TileLayer::Drag).get(1, 0), Some(TileType::Mud));
    }

    #[test]
    fn test_write_replaces_previous_tiles() {
        let mut sink = LayeredTilemap::new(2, 2);
        sink.set_tiles(TileLayer::UpperCollider, TileType::Forest, &[TilePos::new(1, 1)]);
        write_batches(&build_batches(&small_grid()), &mut sink);
        assert_eq!(sink.top_tile(TilePos::new(1, 1)), Some(TileType::Ground));
    }
}
