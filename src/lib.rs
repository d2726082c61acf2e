//! Battlefield map generation library
//!
//! Turns a seed into a tank-battle map: a Perlin noise field is cut into
//! terrain bands, a contour through the ground band picks the objective and
//! the player spawn, and enemies are placed around the objective.
//!
//! Re-exports modules for use by binaries and tools.

pub mod ascii;
pub mod config;
pub mod contour;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod noise_field;
pub mod placement;
pub mod seeds;
pub mod terrain;
pub mod tile_batch;
pub mod tilemap;
pub mod world;

pub use config::MapConfig;
pub use error::{MapGenError, Result};
pub use seeds::MapSeed;
pub use tilemap::TilePos;
pub use world::{generate, GeneratedMap, MapGenerator};
