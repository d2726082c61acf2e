//! Seed management for map generation
//!
//! A map seed is a string of up to ten decimal digits. The first five digits
//! become the horizontal noise offset and the last five the vertical one, so a
//! seed picks which window of the noise plane the battlefield is cut from.
//! Other systems that need randomness (turret sampling) derive their own
//! seeds from it so that a seed reproduces the whole map.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of digits a seed is normalized to.
pub const SEED_DIGITS: usize = 10;
const HALF: usize = SEED_DIGITS / 2;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSeed {
    /// Normalized ten-digit form
    digits: String,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl MapSeed {
    /// Normalize a seed string.
    ///
    /// Non-digit characters are dropped, anything beyond the last ten digits
    /// is dropped from the left, and short seeds are zero-padded on the left.
    /// This never fails: `"42"` becomes `"0000000042"`, i.e. offsets `(0, 42)`.
    pub fn parse(input: &str) -> Self {
        let digits: Vec<char> = input.chars().filter(|c| c.is_ascii_digit()).collect();
        let kept = &digits[digits.len().saturating_sub(SEED_DIGITS)..];
        let mut normalized = "0".repeat(SEED_DIGITS - kept.len());
        normalized.extend(kept.iter());

        let offset_x = parse_half(&normalized[..HALF]);
        let offset_y = parse_half(&normalized[HALF..]);

        Self {
            digits: normalized,
            offset_x,
            offset_y,
        }
    }

    /// Seed from an integer; only the low ten decimal digits survive.
    pub fn from_u64(value: u64) -> Self {
        Self::parse(&(value % 10u64.pow(SEED_DIGITS as u32)).to_string())
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_u64(rng.gen_range(0..10u64.pow(SEED_DIGITS as u32)))
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Noise offset pair `(offset_x, offset_y)`.
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Derive a sub-seed for a named system.
    pub fn derive(&self, system: &str) -> u64 {
        derive_seed(&self.digits, system)
    }
}

impl Default for MapSeed {
    fn default() -> Self {
        Self::random(&mut rand::thread_rng())
    }
}

impl std::fmt::Display for MapSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digits)
    }
}

// Always five ASCII digits, so this cannot overflow an i32.
fn parse_half(half: &str) -> i32 {
    half.bytes().fold(0i32, |acc, b| acc * 10 + (b - b'0') as i32)
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Hash a seed together with a system name so that different systems get
/// different but deterministic seeds.
///
/// FNV-1a over the digits, a separator byte and the name. Unlike
/// `DefaultHasher` the result is fixed across Rust releases.
fn derive_seed(seed: &str, system: &str) -> u64 {
    seed.bytes()
        .chain(std::iter::once(0xff))
        .chain(system.bytes())
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}
