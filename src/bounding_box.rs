use std::fmt;

use crate::tile::TileRange;
use crate::tile_system::{GeoPoint, TileSystem};

/// A bounding box spanned by two opposite corners given in degrees.
///
/// The corners may be given in any order; every derived tile or pixel
/// rectangle is normalized.
///
/// # Example
/// ```rust
/// # use tile_stitcher::BoundingBox;
/// let redmond = BoundingBox::new(47.64, -122.14, 47.60, -122.10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub first: GeoPoint,
    pub second: GeoPoint,
}

impl BoundingBox {
    /// Create a new bounding box from two corners (in degrees).
    ///
    /// Coordinates outside the projectable range are accepted and clamped
    /// whenever the box is projected.
    pub fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        BoundingBox {
            first: GeoPoint::new(lat1, lon1),
            second: GeoPoint::new(lat2, lon2),
        }
    }

    /// Whether a corner has no position at all, i.e. contains NaN.
    pub fn is_nan(&self) -> bool {
        self.first.is_nan() || self.second.is_nan()
    }

    /// The normalized range of tiles covering the box at `level`.
    pub fn tile_range(&self, system: &TileSystem, level: u8) -> TileRange {
        TileRange::spanning(
            system.geo_to_tile(self.first, level),
            system.geo_to_tile(self.second, level),
        )
    }

    /// Creates an iterator over the covering tile ranges of all levels in
    /// `min_level..=max_level`, finest level first.
    ///
    /// # Panics
    /// Panics if `min_level` or `max_level` are invalid.
    pub fn tile_ranges(
        self,
        system: TileSystem,
        min_level: u8,
        max_level: u8,
    ) -> impl Iterator<Item = TileRange> + fmt::Debug {
        assert!(min_level >= 1);
        assert!(min_level <= max_level);

        (min_level..=max_level)
            .rev()
            .map(move |level| self.tile_range(&system, level))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile_system::MAX_LEVEL;

    #[test]
    fn corner_order_is_irrelevant() {
        let system = TileSystem::default();
        let a = BoundingBox::new(47.64, -122.14, 47.60, -122.10);
        let b = BoundingBox::new(47.60, -122.10, 47.64, -122.14);
        let c = BoundingBox::new(47.60, -122.14, 47.64, -122.10);

        for level in 1..=MAX_LEVEL {
            assert_eq!(a.tile_range(&system, level), b.tile_range(&system, level));
            assert_eq!(a.tile_range(&system, level), c.tile_range(&system, level));
        }
    }

    #[test]
    fn span_grows_with_level() {
        let bbox = BoundingBox::new(50.811, 6.1649, 50.7492, 6.031);
        let ranges: Vec<_> = bbox.tile_ranges(TileSystem::default(), 1, MAX_LEVEL).collect();

        assert_eq!(ranges.len(), usize::from(MAX_LEVEL));
        assert_eq!(ranges[0].level, MAX_LEVEL);
        for pair in ranges.windows(2) {
            assert!(pair[0].width() >= pair[1].width());
            assert!(pair[0].height() >= pair[1].height());
        }
    }

    #[test]
    fn nan_corners() {
        assert!(!BoundingBox::new(1.0, 2.0, 3.0, 4.0).is_nan());
        assert!(BoundingBox::new(f64::NAN, 2.0, 3.0, 4.0).is_nan());
        assert!(!BoundingBox::new(1.0, 2.0, 3.0, f64::INFINITY).is_nan());
    }

    #[test]
    fn infinite_corners_are_clamped() {
        let system = TileSystem::default();
        let infinite = BoundingBox::new(f64::INFINITY, 0.0, 80.0, f64::NEG_INFINITY);
        let clamped = BoundingBox::new(85.05112878, 0.0, 80.0, -180.0);

        for level in [1, 5, 12, 23].iter() {
            assert_eq!(
                infinite.tile_range(&system, *level),
                clamped.tile_range(&system, *level)
            );
        }
    }

    #[test]
    #[should_panic]
    fn tile_ranges_panics_on_reversed_levels() {
        let _ = BoundingBox::new(1.0, 2.0, 3.0, 4.0).tile_ranges(TileSystem::default(), 5, 4);
    }
}
