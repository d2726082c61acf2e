//! Terrain bands and classification
//!
//! The noise domain `[0, 1]` is cut into contiguous bands, one per tile
//! type, whose widths are proportional to their relative weights. Band
//! order matters twice: it is the order the bands occupy in `[0, 1]` and
//! the order their tiles are stacked when written out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};
use crate::tilemap::{TilePos, Tilemap};

/// Battlefield tile types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Ground,
    Mud,
    Water,
    Forest,
}

impl TileType {
    pub fn all() -> &'static [TileType] {
        &[TileType::Ground, TileType::Mud, TileType::Water, TileType::Forest]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileType::Ground => "Ground",
            TileType::Mud => "Mud",
            TileType::Water => "Water",
            TileType::Forest => "Forest",
        }
    }
}

/// One configured band before its division points are known.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub tile_type: TileType,
    /// Relative share of the noise domain
    pub weight: f32,
    pub walkable: bool,
}

impl BandSpec {
    pub const fn new(tile_type: TileType, weight: f32, walkable: bool) -> Self {
        Self { tile_type, weight, walkable }
    }
}

/// Default battlefield mix: water in the lows, forest on the highs.
pub fn default_band_specs() -> Vec<BandSpec> {
    vec![
        BandSpec::new(TileType::Water, 0.2, false),
        BandSpec::new(TileType::Mud, 0.1, true),
        BandSpec::new(TileType::Ground, 0.5, true),
        BandSpec::new(TileType::Forest, 0.2, false),
    ]
}

/// A band with its division points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainBand {
    pub tile_type: TileType,
    pub weight: f32,
    pub walkable: bool,
    pub floor: f32,
    pub ceil: f32,
}

impl TerrainBand {
    pub fn contains(&self, value: f32) -> bool {
        self.floor <= value && value <= self.ceil
    }

    pub fn midpoint(&self) -> f32 {
        (self.floor + self.ceil) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.ceil - self.floor
    }
}

/// Ordered, validated band list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TerrainBands {
    bands: Vec<TerrainBand>,
}

impl TerrainBands {
    /// Validate the specs and compute division points.
    ///
    /// Rejects fewer than two bands, negative or non-finite weights, and a
    /// zero weight sum.
    pub fn new(specs: &[BandSpec]) -> Result<Self> {
        if specs.len() < 2 {
            return Err(MapGenError::TooFewBands(specs.len()));
        }
        for spec in specs {
            if !spec.weight.is_finite() || spec.weight < 0.0 {
                return Err(MapGenError::InvalidWeight {
                    tile_type: spec.tile_type,
                    weight: spec.weight,
                });
            }
        }
        if specs.iter().map(|s| s.weight).sum::<f32>() <= 0.0 {
            return Err(MapGenError::ZeroWeightSum);
        }

        let mut bands = Self {
            bands: specs
                .iter()
                .map(|s| TerrainBand {
                    tile_type: s.tile_type,
                    weight: s.weight,
                    walkable: s.walkable,
                    floor: 0.0,
                    ceil: 0.0,
                })
                .collect(),
        };
        bands.update_division_points();
        Ok(bands)
    }

    /// Recompute every band's `(floor, ceil)` from the weights.
    ///
    /// Floors chain from the previous ceil so bands stay contiguous, and the
    /// last ceil is pinned to exactly 1.0.
    pub fn update_division_points(&mut self) {
        let total: f64 = self.bands.iter().map(|b| b.weight as f64).sum();
        let mut cumulative = 0.0f64;
        let last = self.bands.len() - 1;

        for (i, band) in self.bands.iter_mut().enumerate() {
            band.floor = cumulative as f32;
            cumulative += band.weight as f64 / total;
            band.ceil = if i == last { 1.0 } else { cumulative as f32 };
        }
    }

    /// First band whose range holds the value, else the last band.
    pub fn classify(&self, value: f32) -> &TerrainBand {
        self.bands
            .iter()
            .find(|b| b.contains(value))
            .unwrap_or(&self.bands[self.bands.len() - 1])
    }

    pub fn band(&self, tile_type: TileType) -> Option<&TerrainBand> {
        self.bands.iter().find(|b| b.tile_type == tile_type)
    }

    /// Like `band`, but a missing band is an error.
    pub fn require(&self, tile_type: TileType) -> Result<&TerrainBand> {
        self.band(tile_type).ok_or(MapGenError::MissingBand(tile_type))
    }

    pub fn is_walkable(&self, tile_type: TileType) -> bool {
        self.band(tile_type).map(|b| b.walkable).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainBand> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Tile type per cell, plus the band table it was classified with.
#[derive(Clone, Debug)]
pub struct ClassifiedGrid {
    tiles: Tilemap<TileType>,
    bands: TerrainBands,
}

impl ClassifiedGrid {
    pub fn classify(noise: &Tilemap<f32>, bands: &TerrainBands) -> Self {
        Self {
            tiles: noise.map(|&v| bands.classify(v).tile_type),
            bands: bands.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn height(&self) -> usize {
        self.tiles.height
    }

    pub fn tiles(&self) -> &Tilemap<TileType> {
        &self.tiles
    }

    pub fn bands(&self) -> &TerrainBands {
        &self.bands
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.tiles.contains(pos)
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<TileType> {
        self.tiles.get_at(pos).copied()
    }

    /// Whether a tank can drive over the cell. Off-map cells are not walkable.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile_at(pos)
            .map(|t| self.bands.is_walkable(t))
            .unwrap_or(false)
    }

    /// Number of cells per tile type.
    pub fn counts(&self) -> BTreeMap<TileType, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, &t) in self.tiles.iter() {
            *counts.entry(t).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::{self, NoiseParams};

    const EPS: f32 = 1e-6;

    fn default_bands() -> TerrainBands {
        TerrainBands::new(&default_band_specs()).unwrap()
    }

    #[test]
    fn test_default_division_points() {
        let bands = default_bands();
        let expected = [
            (TileType::Water, 0.0, 0.2),
            (TileType::Mud, 0.2, 0.3),
            (TileType::Ground, 0.3, 0.8),
            (TileType::Forest, 0.8, 1.0),
        ];
        for (band, (tile, floor, ceil)) in bands.iter().zip(expected) {
            assert_eq!(band.tile_type, tile);
            assert!((band.floor - floor).abs() < EPS, "{:?} floor {}", tile, band.floor);
            assert!((band.ceil - ceil).abs() < EPS, "{:?} ceil {}", tile, band.ceil);
        }
    }

    #[test]
    fn test_bands_are_contiguous_and_cover_unit_range() {
        let specs = [
            BandSpec::new(TileType::Water, 3.0, false),
            BandSpec::new(TileType::Mud, 0.7, true),
            BandSpec::new(TileType::Ground, 11.0, true),
            BandSpec::new(TileType::Forest, 0.0, false),
        ];
        let bands = TerrainBands::new(&specs).unwrap();
        let all: Vec<_> = bands.iter().collect();

        assert_eq!(all[0].floor, 0.0);
        assert_eq!(all[all.len() - 1].ceil, 1.0);
        for pair in all.windows(2) {
            assert_eq!(pair[1].floor, pair[0].ceil);
        }
        let total: f32 = all.iter().map(|b| b.width()).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut bands = default_bands();
        let before = bands.clone();
        bands.update_division_points();
        assert_eq!(bands, before);
        bands.update_division_points();
        assert_eq!(bands, before);
    }

    #[test]
    fn test_degenerate_configs_are_rejected() {
        assert!(matches!(
            TerrainBands::new(&[BandSpec::new(TileType::Ground, 1.0, true)]),
            Err(MapGenError::TooFewBands(1))
        ));
        assert!(matches!(
            TerrainBands::new(&[
                BandSpec::new(TileType::Ground, 0.0, true),
                BandSpec::new(TileType::Water, 0.0, false),
            ]),
            Err(MapGenError::ZeroWeightSum)
        ));
        assert!(matches!(
            TerrainBands::new(&[
                BandSpec::new(TileType::Ground, -1.0, true),
                BandSpec::new(TileType::Water, 2.0, false),
            ]),
            Err(MapGenError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_boundary_goes_to_first_band() {
        let bands = default_bands();
        assert_eq!(bands.classify(0.0).tile_type, TileType::Water);
        assert_eq!(bands.classify(bands.band(TileType::Water).unwrap().ceil).tile_type, TileType::Water);
        assert_eq!(bands.classify(0.5).tile_type, TileType::Ground);
        assert_eq!(bands.classify(1.0).tile_type, TileType::Forest);
        // Out of domain falls back to the last band
        assert_eq!(bands.classify(1.5).tile_type, TileType::Forest);
        assert_eq!(bands.classify(f32::NAN).tile_type, TileType::Forest);
    }

    #[test]
    fn test_every_cell_lies_in_its_band() {
        let noise = noise_field::generate(96, 96, &NoiseParams::with_scale(10.0), (5, 9)).unwrap();
        let bands = default_bands();
        let grid = ClassifiedGrid::classify(&noise, &bands);

        for (x, y, &v) in noise.iter() {
            let tile = grid.tile_at(TilePos::new(x as i32, y as i32)).unwrap();
            let band = bands.band(tile).unwrap();
            assert!(band.contains(v), "value {} classified as {:?}", v, tile);
        }
    }

    #[test]
    fn test_walkability() {
        let mut noise = Tilemap::new_with(3, 1, 0.5f32);
        noise.set(0, 0, 0.1);
        noise.set(2, 0, 0.9);
        let grid = ClassifiedGrid::classify(&noise, &default_bands());

        assert!(!grid.is_walkable(TilePos::new(0, 0)));
        assert!(grid.is_walkable(TilePos::new(1, 0)));
        assert!(!grid.is_walkable(TilePos::new(2, 0)));
        assert!(!grid.is_walkable(TilePos::new(3, 0)));
        assert_eq!(grid.counts().get(&TileType::Ground), Some(&1));
    }
}
