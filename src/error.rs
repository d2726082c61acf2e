//! Error type shared by every generation stage.

use thiserror::Error;

use crate::terrain::TileType;

#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("map dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("noise scale must be finite and positive, got {0}")]
    InvalidScale(f32),

    #[error("terrain needs at least two bands, got {0}")]
    TooFewBands(usize),

    #[error("band {tile_type:?} has invalid weight {weight}")]
    InvalidWeight { tile_type: TileType, weight: f32 },

    #[error("terrain band weights sum to zero")]
    ZeroWeightSum,

    #[error("no terrain band configured for {0:?}")]
    MissingBand(TileType),

    #[error("perimeter spacing must be finite and positive, got {0}")]
    InvalidSpacing(f32),

    #[error("perimeter radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),

    #[error("ring of radius {radius} with spacing {spacing} needs more than {limit} points")]
    TooManyPerimeterPoints { radius: f32, spacing: f32, limit: usize },

    #[error("no zone with index {0}")]
    UnknownZone(usize),

    #[error("requested {requested} distinct samples but only {available} candidates exist")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, MapGenError>;
