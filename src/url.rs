use anyhow::{Context, Result};
use maplit::hashmap;
use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};
use strfmt::strfmt;

use crate::quadkey::QuadKey;

/// Aerial imagery endpoint of the Bing tile servers.
pub const DEFAULT_URL: &str = "http://ecn.t{s}.tiles.virtualearth.net/tiles/a{quadkey}.jpeg?g=1";

pub const DEFAULT_SUBDOMAINS: &[&str] = &["0", "1", "2", "3"];

/// A tile URL template.
///
/// Supports `{quadkey}`, `{x}`, `{y}` and `{z}`, as well as `{s}` which
/// cycles through the configured subdomains to spread the load between
/// servers.
pub struct UrlFormat {
    inc: AtomicUsize,
    subdomains: Vec<String>,
    format_str: String,
}

impl UrlFormat {
    pub fn from_string(format_str: String) -> Self {
        Self::with_subdomains(
            format_str,
            DEFAULT_SUBDOMAINS.iter().map(|s| (*s).to_owned()).collect(),
        )
    }

    pub fn with_subdomains(format_str: String, subdomains: Vec<String>) -> Self {
        Self {
            inc: AtomicUsize::new(0),
            subdomains,
            format_str,
        }
    }

    fn next_subdomain(&self) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }

        let inc = self.inc.fetch_add(1, Ordering::Relaxed);
        &self.subdomains[inc % self.subdomains.len()]
    }

    pub fn tile_url(&self, quadkey: &QuadKey) -> Result<String> {
        let tile = quadkey.to_tile();
        let vars = hashmap! {
            "s".to_owned() => self.next_subdomain().to_owned(),
            "quadkey".to_owned() => quadkey.to_string(),
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "z".to_owned() => tile.level.to_string(),
        };

        strfmt(&self.format_str, &vars)
            .with_context(|| format!("failed formatting URL for quadkey {}", quadkey))
    }
}

impl Default for UrlFormat {
    fn default() -> Self {
        Self::from_string(DEFAULT_URL.to_owned())
    }
}

impl Clone for UrlFormat {
    fn clone(&self) -> Self {
        Self {
            inc: AtomicUsize::new(self.inc.load(Ordering::Relaxed)),
            subdomains: self.subdomains.clone(),
            format_str: self.format_str.clone(),
        }
    }
}

impl PartialEq for UrlFormat {
    fn eq(&self, other: &Self) -> bool {
        self.format_str == other.format_str && self.subdomains == other.subdomains
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlFormat")
            .field("format_str", &self.format_str)
            .field("subdomains", &self.subdomains)
            .finish()
    }
}
