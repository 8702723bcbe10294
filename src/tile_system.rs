use std::f64::consts::PI;
use std::fmt;

use crate::tile::TileCoord;

/// Finest level of detail addressable by a quadkey pyramid.
pub const MAX_LEVEL: u8 = 23;

/// Coarsest level of detail addressable by a quadkey pyramid.
pub const MIN_LEVEL: u8 = 1;

/// A point on the globe in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether either coordinate is NaN. Infinite values are clamped like
    /// any other out of range value.
    pub fn is_nan(&self) -> bool {
        self.lat.is_nan() || self.lon.is_nan()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Global pixel coordinates at a specific level of detail.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
    pub level: u8,
}

/// Parameters of a Web Mercator quadtree tiling scheme.
///
/// All conversions between geographic, pixel and tile coordinates go through
/// a `TileSystem` so the constants live in one place.
///
/// # Example
/// ```rust
/// # use tile_stitcher::TileSystem;
/// let system = TileSystem::default();
/// let pixel = system.geo_to_pixel(0.0, 0.0, 1);
/// assert_eq!((pixel.x, pixel.y), (256, 256));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSystem {
    /// Equatorial earth radius in meters.
    pub earth_radius: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Edge length of a single tile in pixels.
    pub tile_size: u32,
}

impl TileSystem {
    pub const WEB_MERCATOR: TileSystem = TileSystem {
        earth_radius: 6_378_137.0,
        min_lat: -85.051_128_78,
        max_lat: 85.051_128_78,
        min_lon: -180.0,
        max_lon: 180.0,
        tile_size: 256,
    };

    /// Width and height of the whole map in pixels at `level`.
    ///
    /// `level` must be in `1..=23`.
    pub fn map_size(&self, level: u8) -> u32 {
        self.tile_size << level
    }

    /// Meters per pixel at the given latitude and level.
    pub fn ground_resolution(&self, lat: f64, level: u8) -> f64 {
        let lat = clip(lat, self.min_lat, self.max_lat);
        (lat * PI / 180.0).cos() * 2.0 * PI * self.earth_radius
            / f64::from(self.map_size(level))
    }

    /// Map scale as the denominator `N` of `1 : N` for a screen at `dpi`.
    pub fn map_scale(&self, lat: f64, level: u8, dpi: f64) -> f64 {
        self.ground_resolution(lat, level) * dpi / 0.0254
    }

    /// Projects a point onto the global pixel grid of `level`.
    ///
    /// Coordinates outside the projectable range are clamped, and the result
    /// always lies within `[0, map_size - 1]` on both axes.
    pub fn geo_to_pixel(&self, lat: f64, lon: f64, level: u8) -> PixelCoord {
        let lat = clip(lat, self.min_lat, self.max_lat);
        let lon = clip(lon, self.min_lon, self.max_lon);

        let x = (lon + 180.0) / 360.0;
        let sin_lat = (lat * PI / 180.0).sin();
        let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

        let map_size = f64::from(self.map_size(level));
        let max = map_size - 1.0;

        // rounding can overshoot the last pixel at the poles and the antimeridian
        PixelCoord {
            x: clip(x * map_size + 0.5, 0.0, max) as u32,
            y: clip(y * map_size + 0.5, 0.0, max) as u32,
            level,
        }
    }

    /// The tile containing `pixel`.
    pub fn pixel_to_tile(&self, pixel: PixelCoord) -> TileCoord {
        TileCoord::new(
            pixel.x / self.tile_size,
            pixel.y / self.tile_size,
            pixel.level,
        )
    }

    pub fn geo_to_tile(&self, point: GeoPoint, level: u8) -> TileCoord {
        self.pixel_to_tile(self.geo_to_pixel(point.lat, point.lon, level))
    }
}

impl Default for TileSystem {
    fn default() -> Self {
        Self::WEB_MERCATOR
    }
}

/// Clamps `n` into `[lo, hi]`.
pub fn clip(n: f64, lo: f64, hi: f64) -> f64 {
    n.max(lo).min(hi)
}
