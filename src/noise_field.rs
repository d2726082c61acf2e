//! Perlin noise field the terrain is cut from.
//!
//! The permutation table is fixed, so the field is a pure function of its
//! inputs. Variety between maps comes from the integer offset taken from
//! the map seed, which slides the sampling window across the noise plane.

use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MapGenError, Result};
use crate::tilemap::Tilemap;

/// Permutation seed for the Perlin generator. Never varied per map.
const PERMUTATION_SEED: u32 = 0;

/// Parameters for the noise field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Noise periods across the map (higher = smaller terrain patches)
    pub scale: f32,
    /// Number of fBm octaves; 1 samples plain Perlin noise
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 20.0,
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseParams {
    pub fn with_scale(scale: f32) -> Self {
        Self { scale, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MapGenError::InvalidScale(self.scale));
        }
        if self.octaves == 0 {
            return Err(MapGenError::InvalidConfig("noise octaves must be at least 1".into()));
        }
        if !self.persistence.is_finite() || !self.lacunarity.is_finite() {
            return Err(MapGenError::InvalidConfig(
                "noise persistence and lacunarity must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Generate a `width × height` field of values in `[0, 1]`.
///
/// Cell `(x, y)` samples the noise at
/// `(x / width * scale + offset_x, y / height * scale + offset_y)`.
/// Identical arguments always produce an identical field.
pub fn generate(
    width: usize,
    height: usize,
    params: &NoiseParams,
    offset: (i32, i32),
) -> Result<Tilemap<f32>> {
    if width == 0 || height == 0 {
        return Err(MapGenError::InvalidDimensions { width, height });
    }
    params.validate()?;

    let perlin = Perlin::new(PERMUTATION_SEED);
    let scale = params.scale as f64;
    let (offset_x, offset_y) = (offset.0 as f64, offset.1 as f64);

    let mut data = vec![0.0f32; width * height];
    data.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let ny = y as f64 / height as f64 * scale + offset_y;
        for (x, cell) in row.iter_mut().enumerate() {
            let nx = x as f64 / width as f64 * scale + offset_x;
            *cell = sample(&perlin, nx, ny, params);
        }
    });

    Tilemap::from_vec(width, height, data).ok_or(MapGenError::InvalidDimensions { width, height })
}

/// Sample one point, normalized from Perlin's `[-1, 1]` to `[0, 1]`.
fn sample(perlin: &Perlin, x: f64, y: f64, params: &NoiseParams) -> f32 {
    let raw = if params.octaves <= 1 {
        perlin.get([x, y])
    } else {
        fbm(
            perlin,
            x,
            y,
            params.octaves,
            params.persistence as f64,
            params.lacunarity as f64,
        )
    };
    ((raw * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
}

/// Fractional Brownian Motion noise
fn fbm(
    noise: &impl NoiseFn<f64, 2>,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value > 0.0 {
        total / max_value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let params = NoiseParams::with_scale(20.0);
        let a = generate(64, 48, &params, (123, 456)).unwrap();
        let b = generate(64, 48, &params, (123, 456)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_are_normalized() {
        let params = NoiseParams { octaves: 4, ..NoiseParams::with_scale(8.0) };
        let field = generate(64, 64, &params, (7, 3)).unwrap();
        let (min_v, max_v) = field.value_range();
        assert!(min_v >= 0.0 && max_v <= 1.0);
        assert!(max_v > min_v, "field should not be flat");
    }

    #[test]
    fn test_offset_changes_field() {
        let params = NoiseParams::default();
        let a = generate(32, 32, &params, (0, 0)).unwrap();
        let b = generate(32, 32, &params, (0, 42)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_field_is_smooth() {
        // Low scale: neighboring cells should differ only slightly
        let field = generate(128, 128, &NoiseParams::with_scale(2.0), (0, 0)).unwrap();
        for y in 0..128 {
            for x in 1..128 {
                let d = (field.get(x, y) - field.get(x - 1, y)).abs();
                assert!(d < 0.1, "jump of {} at ({}, {})", d, x, y);
            }
        }
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let params = NoiseParams::default();
        assert!(matches!(
            generate(0, 10, &params, (0, 0)),
            Err(MapGenError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            generate(10, 10, &NoiseParams::with_scale(0.0), (0, 0)),
            Err(MapGenError::InvalidScale(_))
        ));
        assert!(generate(10, 10, &NoiseParams::with_scale(f32::NAN), (0, 0)).is_err());
    }
}
