use anyhow::Context;
use async_trait::async_trait;
use clap::crate_version;
use image::RgbImage;
use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    StatusCode,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::quadkey::QuadKey;
use crate::url::UrlFormat;

/// Header the Bing tile servers use to flag their "no imagery" placeholder.
const TILE_INFO_HEADER: &str = "x-ve-tile-info";
const NO_TILE: &str = "no-tile";

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// A decoded tile. Shared so a fetched tile can be handed to the composer
/// without copying its pixels.
pub type TileImage = Arc<RgbImage>;

/// The outcome of asking a provider for a single tile.
#[derive(Clone, Debug)]
pub enum TileFetch {
    Present(TileImage),
    /// The provider has no imagery for this tile.
    Absent,
}

impl TileFetch {
    pub fn is_present(&self) -> bool {
        matches!(self, TileFetch::Present(_))
    }
}

/// Transport and decoding failures of a provider. A missing tile is not an
/// error, see [`TileFetch::Absent`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed building tile URL: {0}")]
    Url(String),

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("failed fetching {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("received invalid status code {status} fetching {url}")]
    Status { url: String, status: StatusCode },

    #[error("failed decoding tile image")]
    Decode(#[from] image::ImageError),
}

/// A source of map tiles addressed by quadkey.
#[async_trait]
pub trait TileProvider: Send + Sync {
    async fn fetch(&self, quadkey: &QuadKey) -> Result<TileFetch, ProviderError>;
}

/// Fetches tiles from an HTTP tile server.
#[derive(Debug)]
pub struct HttpTileProvider {
    client: reqwest::Client,
    url: UrlFormat,
}

impl HttpTileProvider {
    /// Creates a provider for `url`.
    ///
    /// Pass the zero duration as `timeout` to disable it.
    pub fn new(url: UrlFormat, timeout: Duration) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if timeout > ZERO_DURATION {
            builder = builder.timeout(timeout);
        }

        let mut headers = HeaderMap::new();
        headers.append(
            USER_AGENT,
            HeaderValue::from_str(&format!("tile-stitcher_rs_{}", crate_version!()))
                .context("invalid user agent")?,
        );

        let client = builder
            .default_headers(headers)
            .build()
            .context("failed creating HTTP client")?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl TileProvider for HttpTileProvider {
    async fn fetch(&self, quadkey: &QuadKey) -> Result<TileFetch, ProviderError> {
        let url = self
            .url
            .tile_url(quadkey)
            .map_err(|e| ProviderError::Url(format!("{:#}", e)))?;

        log::trace!("fetching {}", url);

        let response = self.client.get(&url).send().await.map_err(|source| {
            if source.is_timeout() {
                ProviderError::Timeout { url: url.clone() }
            } else {
                ProviderError::Http {
                    url: url.clone(),
                    source,
                }
            }
        })?;

        if is_no_data(response.status(), response.headers()) {
            return Ok(TileFetch::Absent);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { url, status });
        }

        let bytes = response.bytes().await.map_err(|source| {
            if source.is_timeout() {
                ProviderError::Timeout { url: url.clone() }
            } else {
                ProviderError::Http {
                    url: url.clone(),
                    source,
                }
            }
        })?;

        Ok(TileFetch::Present(decode_tile(&bytes)?))
    }
}

/// Whether a tile server response is an explicit "no imagery" answer.
fn is_no_data(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
        return true;
    }

    headers
        .get(TILE_INFO_HEADER)
        .map_or(false, |value| value == NO_TILE)
}

fn decode_tile(bytes: &[u8]) -> Result<TileImage, ProviderError> {
    Ok(Arc::new(image::load_from_memory(bytes)?.to_rgb8()))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use image::Rgb;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    pub(crate) fn solid_tile(color: [u8; 3]) -> TileImage {
        Arc::new(RgbImage::from_pixel(256, 256, Rgb(color)))
    }

    /// Serves a tile for every quadkey the predicate accepts, and counts
    /// every request it sees.
    pub(crate) struct CoverageProvider<F> {
        covered: F,
        tile: TileImage,
        pub(crate) requests: AtomicUsize,
        pub(crate) seen: Mutex<Vec<QuadKey>>,
    }

    impl<F: Fn(&QuadKey) -> bool + Send + Sync> CoverageProvider<F> {
        pub(crate) fn new(covered: F) -> Self {
            Self {
                covered,
                tile: solid_tile([20, 120, 40]),
                requests: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    /// Every tile exists down to `max_level` and nothing finer.
    pub(crate) fn covered_through(
        max_level: u8,
    ) -> CoverageProvider<impl Fn(&QuadKey) -> bool + Send + Sync> {
        CoverageProvider::new(move |key: &QuadKey| key.level() <= max_level)
    }

    #[async_trait]
    impl<F: Fn(&QuadKey) -> bool + Send + Sync> TileProvider for CoverageProvider<F> {
        async fn fetch(&self, quadkey: &QuadKey) -> Result<TileFetch, ProviderError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(quadkey.clone());

            if (self.covered)(quadkey) {
                Ok(TileFetch::Present(self.tile.clone()))
            } else {
                Ok(TileFetch::Absent)
            }
        }
    }

    /// Fails every request with a timeout.
    pub(crate) struct FailingProvider;

    #[async_trait]
    impl TileProvider for FailingProvider {
        async fn fetch(&self, quadkey: &QuadKey) -> Result<TileFetch, ProviderError> {
            Err(ProviderError::Timeout {
                url: format!("mock://{}", quadkey),
            })
        }
    }
}
