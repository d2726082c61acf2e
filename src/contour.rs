//! Mid-point contour search
//!
//! A band's mid-points are the cells whose noise value sits at the middle of
//! the band. They trace a contour through the band and serve as candidate
//! sites for the endpoints and turrets.

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainBand;
use crate::tilemap::{TilePos, Tilemap};

/// How a cell's value is compared against the band midpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ContourMatch {
    /// Both values rounded to `decimals` places must be equal.
    Rounded { decimals: u32 },
    /// The value must be within this distance of the midpoint.
    Tolerance(f32),
}

impl Default for ContourMatch {
    fn default() -> Self {
        ContourMatch::Rounded { decimals: 2 }
    }
}

impl ContourMatch {
    fn matches(&self, value: f32, mid: f32) -> bool {
        match *self {
            ContourMatch::Rounded { decimals } => {
                round_to(value, decimals) == round_to(mid, decimals)
            }
            ContourMatch::Tolerance(eps) => (value - mid).abs() <= eps,
        }
    }
}

/// Round half away from zero, in f64 so that e.g. 0.55f32 rounds to 0.55
/// rather than drifting to the neighboring step.
fn round_to(value: f32, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value as f64 * factor).round() / factor
}

/// Cells of `noise` matching the midpoint of `band`, in row-major order.
/// May be empty: the result depends on the noise field.
pub fn find_mid_points(noise: &Tilemap<f32>, band: &TerrainBand, matcher: ContourMatch) -> Vec<TilePos> {
    let mid = band.midpoint();
    noise
        .iter()
        .filter(|(_, _, &v)| matcher.matches(v, mid))
        .map(|(x, y, _)| TilePos::new(x as i32, y as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::{self, NoiseParams};
    use crate::terrain::{default_band_specs, TerrainBands, TileType};

    fn ground_band() -> TerrainBand {
        *TerrainBands::new(&default_band_specs())
            .unwrap()
            .band(TileType::Ground)
            .unwrap()
    }

    #[test]
    fn test_rounded_match_is_exact_after_rounding() {
        // Ground is [0.3, 0.8], midpoint 0.55
        let mut noise = Tilemap::new_with(4, 1, 0.0f32);
        noise.set(0, 0, 0.551);
        noise.set(1, 0, 0.546);
        noise.set(2, 0, 0.544);
        noise.set(3, 0, 0.556);

        let points = find_mid_points(&noise, &ground_band(), ContourMatch::default());
        assert_eq!(points, vec![TilePos::new(0, 0), TilePos::new(1, 0)]);
    }

    #[test]
    fn test_tolerance_match() {
        let mut noise = Tilemap::new_with(3, 1, 0.0f32);
        noise.set(0, 0, 0.53);
        noise.set(1, 0, 0.57);
        noise.set(2, 0, 0.60);

        let points = find_mid_points(&noise, &ground_band(), ContourMatch::Tolerance(0.025));
        assert_eq!(points, vec![TilePos::new(0, 0), TilePos::new(1, 0)]);
    }

    #[test]
    fn test_flat_field_can_have_no_mid_points() {
        let noise = Tilemap::new_with(8, 8, 0.1f32);
        assert!(find_mid_points(&noise, &ground_band(), ContourMatch::default()).is_empty());
    }

    #[test]
    fn test_mid_points_lie_in_band() {
        let noise = noise_field::generate(128, 128, &NoiseParams::with_scale(12.0), (3, 4)).unwrap();
        let band = ground_band();
        let points = find_mid_points(&noise, &band, ContourMatch::default());
        assert!(!points.is_empty());
        for p in points {
            let v = *noise.get(p.x as usize, p.y as usize);
            assert!(band.contains(v));
            assert!((v - band.midpoint()).abs() <= 0.0051);
        }
    }
}
