use thiserror::Error;

use crate::bounding_box::BoundingBox;
use crate::provider::ProviderError;
use crate::quadkey::{QuadKey, QuadKeyError};
use crate::sink::SinkError;
use crate::tile::TileCoord;

/// Failures of the level search and mosaic assembly.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("bounding box {0} cannot be reduced to a 2x2 tile block on any level")]
    InvalidBoundingBox(BoundingBox),

    #[error(
        "no level between {max_level} and {min_level} is fully covered within the size ceiling \
         for bounding box {bbox}; try a smaller box"
    )]
    NoAcceptableLevel {
        bbox: BoundingBox,
        min_level: u8,
        max_level: u8,
    },

    #[error("failed fetching tile {tile} (quadkey {quadkey}) for bounding box {bbox}")]
    Provider {
        bbox: BoundingBox,
        tile: TileCoord,
        quadkey: QuadKey,
        #[source]
        source: ProviderError,
    },

    #[error("tile {0} was not fetched before assembly")]
    MissingTile(TileCoord),

    #[error(transparent)]
    QuadKey(#[from] QuadKeyError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
