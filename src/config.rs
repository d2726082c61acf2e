//! Map generation configuration
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "width": 128, "height": 128, "noise": { "scale": 12.0 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contour::ContourMatch;
use crate::endpoints::EndpointParams;
use crate::error::{MapGenError, Result};
use crate::noise_field::NoiseParams;
use crate::placement::{self, default_zones, TurretParams, Zone};
use crate::terrain::{default_band_specs, BandSpec, TerrainBands, TileType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub noise: NoiseParams,
    /// Bands in noise order, lowest first
    pub bands: Vec<BandSpec>,
    /// Band whose mid-points seed the endpoints and turrets
    pub contour_band: TileType,
    pub contour_match: ContourMatch,
    pub endpoints: EndpointParams,
    pub zones: Vec<Zone>,
    pub turrets: TurretParams,
    /// Tile types enemies may be placed on
    pub placement_tiles: Vec<TileType>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            noise: NoiseParams::default(),
            bands: default_band_specs(),
            contour_band: TileType::Ground,
            contour_match: ContourMatch::default(),
            endpoints: EndpointParams::default(),
            zones: default_zones(),
            turrets: TurretParams::default(),
            placement_tiles: vec![TileType::Ground, TileType::Mud],
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Check everything that can be checked before generating.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapGenError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.noise.validate()?;

        let bands = TerrainBands::new(&self.bands)?;
        bands.require(self.contour_band)?;

        if let ContourMatch::Tolerance(eps) = self.contour_match {
            if !eps.is_finite() || eps < 0.0 {
                return Err(MapGenError::InvalidConfig(format!(
                    "contour tolerance must be finite and non-negative, got {}",
                    eps
                )));
            }
        }
        let fraction = self.endpoints.radius_fraction;
        if !fraction.is_finite() || fraction <= 0.0 {
            return Err(MapGenError::InvalidConfig(format!(
                "endpoint radius fraction must be positive, got {}",
                fraction
            )));
        }

        let mut zones = self.zones.clone();
        placement::normalize_zones(&mut zones)?;
        for zone in &zones {
            placement::perimeter_point_count(zone.radius, zone.landmine_spacing, self.width, self.height)?;
        }

        let t = &self.turrets;
        if !(t.min_distance.is_finite() && t.max_distance.is_finite()) || t.min_distance > t.max_distance {
            return Err(MapGenError::InvalidConfig(format!(
                "turret distance band [{}, {}) is invalid",
                t.min_distance, t.max_distance
            )));
        }
        if self.placement_tiles.is_empty() {
            return Err(MapGenError::InvalidConfig("no placement tile types given".into()));
        }
        Ok(())
    }
}
