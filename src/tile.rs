use std::fmt;

/// A quadtree tile with x, y and level-of-detail coordinate.
/// ref: https://learn.microsoft.com/en-us/bingmaps/articles/bing-maps-tile-system
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub level: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, level: u8) -> Self {
        Self { x, y, level }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.x, self.y, self.level)
    }
}

/// An inclusive rectangle of tiles on a single level.
///
/// Corners are normalized on construction, so `x_min <= x_max` and
/// `y_min <= y_max` always hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TileRange {
    pub level: u8,
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl TileRange {
    /// Creates the smallest range containing both tiles.
    ///
    /// # Panics
    /// Panics if the tiles are on different levels.
    pub fn spanning(a: TileCoord, b: TileCoord) -> Self {
        assert_eq!(a.level, b.level, "tiles must share a level");

        Self {
            level: a.level,
            x_min: a.x.min(b.x),
            y_min: a.y.min(b.y),
            x_max: a.x.max(b.x),
            y_max: a.y.max(b.y),
        }
    }

    /// Number of tile columns.
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows.
    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn tile_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.level == self.level
            && (self.x_min..=self.x_max).contains(&tile.x)
            && (self.y_min..=self.y_max).contains(&tile.y)
    }

    /// Iterates over all tiles of the range, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + fmt::Debug {
        let (level, x_min, x_max) = (self.level, self.x_min, self.x_max);

        (self.y_min..=self.y_max)
            .flat_map(move |y| (x_min..=x_max).map(move |x| TileCoord::new(x, y, level)))
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}x{} .. {}x{}]@{}",
            self.x_min, self.y_min, self.x_max, self.y_max, self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanning_normalizes_corners() {
        let range = TileRange::spanning(TileCoord::new(7, 2, 4), TileCoord::new(3, 9, 4));
        assert_eq!(
            range,
            TileRange {
                level: 4,
                x_min: 3,
                y_min: 2,
                x_max: 7,
                y_max: 9,
            }
        );
        assert_eq!((range.width(), range.height(), range.tile_count()), (5, 8, 40));
    }

    #[test]
    #[should_panic]
    fn spanning_panics_across_levels() {
        TileRange::spanning(TileCoord::new(0, 0, 3), TileCoord::new(0, 0, 4));
    }

    #[test]
    fn tiles_row_major() {
        let range = TileRange::spanning(TileCoord::new(1, 1, 2), TileCoord::new(2, 2, 2));
        let tiles: Vec<_> = range.tiles().map(|t| (t.x, t.y)).collect();
        assert_eq!(tiles, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert!(range.tiles().all(|t| range.contains(t)));
        assert!(!range.contains(TileCoord::new(0, 1, 2)));
        assert!(!range.contains(TileCoord::new(1, 1, 3)));
    }

    #[test]
    fn single_tile_range() {
        let tile = TileCoord::new(5, 5, 3);
        let range = TileRange::spanning(tile, tile);
        assert_eq!(range.tiles().collect::<Vec<_>>(), vec![tile]);
        assert_eq!(range.to_string(), "[5x5 .. 5x5]@3");
    }
}
