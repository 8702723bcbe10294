//! Selection of the finest tile level that fully covers a bounding box.

use futures::{prelude::*, stream};
use indicatif::ProgressBar;
use std::{collections::HashMap, fmt};

use crate::bounding_box::BoundingBox;
use crate::error::StitchError;
use crate::provider::{TileFetch, TileImage, TileProvider};
use crate::quadkey::{QuadKey, QuadKeyError};
use crate::tile::{TileCoord, TileRange};
use crate::tile_system::{TileSystem, MAX_LEVEL, MIN_LEVEL};

/// Largest mosaic width (in pixels) a level may produce before it is skipped.
pub const DEFAULT_SIZE_CEILING: u32 = 1 << 12;

/// Default number of tiles fetched in parallel.
pub const DEFAULT_FETCH_RATE: usize = 5;

/// What to do when the provider fails to deliver a tile.
///
/// The policy is applied to every fetch of the search, including timeouts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchErrorPolicy {
    /// Stop the search and report the failure.
    Abort,
    /// Reject the level as if the tile had no imagery.
    TreatAsAbsent,
}

impl Default for FetchErrorPolicy {
    fn default() -> Self {
        FetchErrorPolicy::Abort
    }
}

/// Why a level was not accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rejection {
    /// The mosaic would be wider than the size ceiling.
    TooLarge { width: u64 },
    MissingTile(TileCoord),
    FetchFailed(TileCoord),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooLarge { width } => write!(f, "mosaic would be {} pixels wide", width),
            Rejection::MissingTile(tile) => write!(f, "tile {} has no imagery", tile),
            Rejection::FetchFailed(tile) => write!(f, "tile {} could not be fetched", tile),
        }
    }
}

/// An accepted level together with every tile of its range.
#[derive(Clone, Debug)]
pub struct Selection {
    pub range: TileRange,
    pub tiles: HashMap<TileCoord, TileImage>,
}

impl Selection {
    pub fn level(&self) -> u8 {
        self.range.level
    }
}

/// The outcome of probing a single level.
#[derive(Debug)]
pub enum LevelResult {
    Accepted(Selection),
    Rejected(Rejection),
}

/// Searches the finest level at which a bounding box is completely covered
/// by the tiles of a [`TileProvider`].
///
/// # Example
/// ```rust,no_run
/// use tile_stitcher::{BoundingBox, HttpTileProvider, LevelSelector, UrlFormat};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let provider = HttpTileProvider::new(UrlFormat::default(), Duration::from_secs(10))?;
/// let bbox = BoundingBox::new(47.64, -122.14, 47.60, -122.10);
///
/// let selection = LevelSelector::new(&provider).select(&bbox).await?;
/// println!("level {} covers {}", selection.level(), bbox);
/// # Ok(())
/// # }
/// ```
pub struct LevelSelector<'a, P: ?Sized> {
    provider: &'a P,
    system: TileSystem,
    fetch_rate: usize,
    size_ceiling: u32,
    max_level: u8,
    on_fetch_error: FetchErrorPolicy,
    progress: ProgressBar,
}

impl<'a, P: TileProvider + ?Sized> LevelSelector<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            system: TileSystem::default(),
            fetch_rate: DEFAULT_FETCH_RATE,
            size_ceiling: DEFAULT_SIZE_CEILING,
            max_level: MAX_LEVEL,
            on_fetch_error: FetchErrorPolicy::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_system(mut self, system: TileSystem) -> Self {
        self.system = system;
        self
    }

    /// Sets the number of tiles fetched in parallel. Zero is treated as one.
    pub fn with_fetch_rate(mut self, fetch_rate: usize) -> Self {
        self.fetch_rate = fetch_rate.max(1);
        self
    }

    pub fn with_size_ceiling(mut self, size_ceiling: u32) -> Self {
        self.size_ceiling = size_ceiling;
        self
    }

    /// Sets the finest level to search, capped at [`MAX_LEVEL`].
    pub fn with_max_level(mut self, max_level: u8) -> Self {
        self.max_level = max_level.min(MAX_LEVEL);
        self
    }

    pub fn with_fetch_error_policy(mut self, policy: FetchErrorPolicy) -> Self {
        self.on_fetch_error = policy;
        self
    }

    /// Reports the tiles of every probed level on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn system(&self) -> &TileSystem {
        &self.system
    }

    /// The finest level at which the box fits into a 2x2 block of tiles.
    pub fn lowest_level(&self, bbox: &BoundingBox) -> Result<u8, StitchError> {
        if bbox.is_nan() {
            return Err(StitchError::InvalidBoundingBox(*bbox));
        }

        bbox.tile_ranges(self.system, MIN_LEVEL, MAX_LEVEL)
            .find(|range| range.width() <= 2 && range.height() <= 2)
            .map(|range| range.level)
            .ok_or(StitchError::InvalidBoundingBox(*bbox))
    }

    /// Whether the mosaic of `range` would be wider than the size ceiling.
    pub fn exceeds_ceiling(&self, range: &TileRange) -> bool {
        mosaic_width(range, &self.system) > u64::from(self.size_ceiling)
    }

    /// Checks whether every tile covering `bbox` at `level` is available.
    pub async fn probe_level(
        &self,
        bbox: &BoundingBox,
        level: u8,
    ) -> Result<LevelResult, StitchError> {
        self.probe_range(bbox, bbox.tile_range(&self.system, level)).await
    }

    async fn probe_range(
        &self,
        bbox: &BoundingBox,
        range: TileRange,
    ) -> Result<LevelResult, StitchError> {
        if self.exceeds_ceiling(&range) {
            return Ok(LevelResult::Rejected(Rejection::TooLarge {
                width: mosaic_width(&range, &self.system),
            }));
        }

        log::debug!("probing {} tiles of {}", range.tile_count(), range);

        self.progress.set_length(range.tile_count());
        self.progress.set_position(0);
        self.progress.set_message(&format!("level {}", range.level));

        let provider = self.provider;
        let mut fetches = stream::iter(range.tiles())
            .map(|tile| async move {
                let quadkey = QuadKey::from_tile(tile)?;
                let fetched = provider.fetch(&quadkey).await;
                Ok::<_, QuadKeyError>((tile, quadkey, fetched))
            })
            .buffer_unordered(self.fetch_rate);

        // returning early drops `fetches`, which cancels the fetches in flight
        let mut tiles = HashMap::new();
        while let Some(next) = fetches.next().await {
            let (tile, quadkey, fetched) = next?;
            self.progress.inc(1);

            match fetched {
                Ok(TileFetch::Present(image)) => {
                    tiles.insert(tile, image);
                }
                Ok(TileFetch::Absent) => {
                    log::debug!("tile {} ({}) has no imagery", tile, quadkey);
                    return Ok(LevelResult::Rejected(Rejection::MissingTile(tile)));
                }
                Err(source) => match self.on_fetch_error {
                    FetchErrorPolicy::Abort => {
                        return Err(StitchError::Provider {
                            bbox: *bbox,
                            tile,
                            quadkey,
                            source,
                        });
                    }
                    FetchErrorPolicy::TreatAsAbsent => {
                        log::warn!("treating tile {} as missing: {}", tile, source);
                        return Ok(LevelResult::Rejected(Rejection::FetchFailed(tile)));
                    }
                },
            }
        }

        Ok(LevelResult::Accepted(Selection { range, tiles }))
    }

    /// Finds the finest level whose tiles are all present and whose mosaic
    /// stays within the size ceiling.
    ///
    /// Levels are searched from the maximum level down to
    /// [`lowest_level`](Self::lowest_level), one after another.
    pub async fn select(&self, bbox: &BoundingBox) -> Result<Selection, StitchError> {
        let min_level = self.lowest_level(bbox)?;
        log::info!("lowest acceptable level for {} is {}", bbox, min_level);

        if self.max_level >= min_level {
            for range in bbox.tile_ranges(self.system, min_level, self.max_level) {
                match self.probe_range(bbox, range).await? {
                    LevelResult::Accepted(selection) => {
                        log::info!("accepted level {} ({})", range.level, range);
                        return Ok(selection);
                    }
                    LevelResult::Rejected(reason) => {
                        log::info!("rejected level {}: {}", range.level, reason);
                    }
                }
            }
        }

        Err(StitchError::NoAcceptableLevel {
            bbox: *bbox,
            min_level,
            max_level: self.max_level,
        })
    }
}

fn mosaic_width(range: &TileRange, system: &TileSystem) -> u64 {
    u64::from(range.width()) * u64::from(system.tile_size)
}
