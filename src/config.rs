use std::{path::PathBuf, time::Duration};

use crate::bounding_box::BoundingBox;
use crate::selector::FetchErrorPolicy;
use crate::url::UrlFormat;

/// Stitching configuration.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// The area to render.
    pub bounding_box: BoundingBox,

    /// Maximum number of parallel downloads.
    pub fetch_rate: u8,

    /// The file to write the image to. Its extension selects the format.
    pub output_path: PathBuf,

    /// The URL to download individual tiles from including the replacement
    /// specifiers `{quadkey}`, `{x}`, `{y}`, `{z}` and `{s}`.
    pub url: UrlFormat,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Levels producing a mosaic wider than this (in pixels) are skipped.
    pub size_ceiling: u32,

    /// The finest level to consider.
    pub max_level: u8,

    /// How failed tile fetches affect the level search.
    pub fetch_errors: FetchErrorPolicy,
}
