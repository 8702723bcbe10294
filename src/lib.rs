//! Render a bounding box as a single image from a quadkey tile server.
//!
//! Given two corners of a box, the finest zoom level at which every covering
//! tile is available is searched, those tiles are stitched together and the
//! result is cropped to the exact extent of the box.
//!
//! **Use with caution.** Finding the best level can issue many requests
//! against a tile server. Respect the terms of the server you point it at.
//!
//! # Usage
//!
//! The crate features a CLI you can access via `-h` / `--help`.
//!
//! It is also available as a library.
//!
//! # CLI Example
//!
//! ```bash
//! tile-stitcher 47.64 -122.14 47.60 -122.10 \
//!   --url "http://ecn.t{s}.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=1" \
//!   --output redmond.jpg \
//!   --rate 8
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use tile_stitcher::{stitch, BoundingBox, Config, FetchErrorPolicy, UrlFormat};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     bounding_box: BoundingBox::new(47.64, -122.14, 47.60, -122.10),
//!     fetch_rate: 8,
//!     output_path: "redmond.jpg".into(),
//!     url: UrlFormat::default(),
//!     timeout: Duration::from_secs(30),
//!     size_ceiling: 4096,
//!     max_level: 23,
//!     fetch_errors: FetchErrorPolicy::Abort,
//! };
//!
//! let stitched = stitch(config).await.expect("failed stitching tiles");
//! println!("level {}", stitched.level);
//! # }
//! ```

mod bounding_box;
mod config;
mod error;
mod mosaic;
mod provider;
mod quadkey;
mod selector;
mod sink;
mod stitch;
mod tile;
mod tile_system;
mod url;

pub use bounding_box::BoundingBox;
pub use config::Config;
pub use error::StitchError;
pub use mosaic::{CropRect, MosaicComposer};
pub use provider::{HttpTileProvider, ProviderError, TileFetch, TileImage, TileProvider};
pub use quadkey::{quadkey_to_tile, tile_to_quadkey, QuadKey, QuadKeyError};
pub use selector::{
    FetchErrorPolicy, LevelResult, LevelSelector, Rejection, Selection, DEFAULT_FETCH_RATE,
    DEFAULT_SIZE_CEILING,
};
pub use sink::{FileSink, ImageSink, SinkError};
pub use stitch::{plan, plan_with, stitch, stitch_with, Stitched};
pub use tile::{TileCoord, TileRange};
pub use tile_system::{clip, GeoPoint, PixelCoord, TileSystem, MAX_LEVEL, MIN_LEVEL};
pub use url::{UrlFormat, DEFAULT_SUBDOMAINS, DEFAULT_URL};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_index() {
        let tile = TileSystem::default().geo_to_tile(GeoPoint::new(47.64, -122.14), 19);
        assert_eq!((tile.x, tile.y), (84264, 183030));
        assert_eq!(
            tile_to_quadkey(tile.x, tile.y, tile.level).unwrap().to_tile(),
            tile
        );
    }

    #[test]
    fn bbox_outside_of_map_is_clamped() {
        let system = TileSystem::default();
        let bbox = BoundingBox::new(100.0, -500.0, -100.0, 500.0);
        let range = bbox.tile_range(&system, 3);

        assert_eq!((range.x_min, range.y_min, range.x_max, range.y_max), (0, 0, 7, 7));
    }
}
