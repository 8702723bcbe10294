use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::tile::TileCoord;
use crate::tile_system::{MAX_LEVEL, MIN_LEVEL};

/// Errors converting between tiles and quadkeys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuadKeyError {
    #[error("level {0} is outside of 1..=23")]
    InvalidLevel(u8),

    #[error("tile {0} does not exist on its level")]
    InvalidTileCoordinate(TileCoord),

    #[error("invalid quadkey digit {0:?}")]
    InvalidDigit(char),

    #[error("quadkey length {0} is outside of 1..=23")]
    InvalidLength(usize),
}

/// The quadtree path of a tile, one base-4 digit per level.
///
/// # Example
/// ```rust
/// # use tile_stitcher::{QuadKey, TileCoord};
/// let key = QuadKey::from_tile(TileCoord::new(3, 5, 3)).unwrap();
/// assert_eq!(key.as_str(), "213");
/// assert_eq!(key.to_tile(), TileCoord::new(3, 5, 3));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct QuadKey(String);

impl QuadKey {
    /// Encodes a tile, most significant level first.
    ///
    /// Tiles that are not addressable on their level are rejected instead of
    /// silently dropping their high bits.
    pub fn from_tile(tile: TileCoord) -> Result<Self, QuadKeyError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&tile.level) {
            return Err(QuadKeyError::InvalidLevel(tile.level));
        }

        let tiles_per_edge = 1u32 << tile.level;
        if tile.x >= tiles_per_edge || tile.y >= tiles_per_edge {
            return Err(QuadKeyError::InvalidTileCoordinate(tile));
        }

        let key = (1..=tile.level)
            .rev()
            .map(|i| {
                let mask = 1u32 << (i - 1);
                let mut digit = b'0';
                if tile.x & mask != 0 {
                    digit += 1;
                }
                if tile.y & mask != 0 {
                    digit += 2;
                }
                char::from(digit)
            })
            .collect();

        Ok(QuadKey(key))
    }

    /// Decodes the tile this key addresses. The level is the key length.
    pub fn to_tile(&self) -> TileCoord {
        let level = self.level();
        let (mut x, mut y) = (0u32, 0u32);

        for (digit, i) in self.0.bytes().zip((1..=level).rev()) {
            let mask = 1u32 << (i - 1);
            let bits = digit - b'0';
            if bits & 1 != 0 {
                x |= mask;
            }
            if bits & 2 != 0 {
                y |= mask;
            }
        }

        TileCoord::new(x, y, level)
    }

    pub fn level(&self) -> u8 {
        self.0.len() as u8
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for QuadKey {
    type Err = QuadKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !('0'..='3').contains(c)) {
            return Err(QuadKeyError::InvalidDigit(c));
        }

        // only ascii digits remain, so bytes == chars
        if !(usize::from(MIN_LEVEL)..=usize::from(MAX_LEVEL)).contains(&s.len()) {
            return Err(QuadKeyError::InvalidLength(s.len()));
        }

        Ok(QuadKey(s.to_owned()))
    }
}

impl fmt::Display for QuadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QuadKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encodes `(tx, ty)` at `level` into its quadkey string.
pub fn tile_to_quadkey(tx: u32, ty: u32, level: u8) -> Result<QuadKey, QuadKeyError> {
    QuadKey::from_tile(TileCoord::new(tx, ty, level))
}

/// Decodes a quadkey string into its tile.
pub fn quadkey_to_tile(quadkey: &str) -> Result<TileCoord, QuadKeyError> {
    quadkey.parse::<QuadKey>().map(|key| key.to_tile())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys() {
        assert_eq!(tile_to_quadkey(3, 5, 3).unwrap().as_str(), "213");
        assert_eq!(tile_to_quadkey(0, 0, 1).unwrap().as_str(), "0");
        assert_eq!(tile_to_quadkey(1, 0, 1).unwrap().as_str(), "1");
        assert_eq!(tile_to_quadkey(0, 1, 1).unwrap().as_str(), "2");
        assert_eq!(tile_to_quadkey(1, 1, 1).unwrap().as_str(), "3");
        assert_eq!(tile_to_quadkey(0, 0, 23).unwrap().as_str(), "0".repeat(23));
    }

    #[test]
    fn round_trip() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            let last = (1u32 << level) - 1;
            let samples = [(0, 0), (last, last), (last, 0), (0, last), (last / 3, last / 7)];

            for &(x, y) in samples.iter() {
                let key = tile_to_quadkey(x, y, level).unwrap();
                assert_eq!(key.level(), level);
                assert_eq!(key.as_str().len(), usize::from(level));
                assert_eq!(quadkey_to_tile(key.as_str()).unwrap(), TileCoord::new(x, y, level));
            }
        }
    }

    #[test]
    fn rejects_out_of_range_tiles() {
        assert_eq!(
            tile_to_quadkey(2, 0, 1),
            Err(QuadKeyError::InvalidTileCoordinate(TileCoord::new(2, 0, 1)))
        );
        assert_eq!(tile_to_quadkey(0, 0, 0), Err(QuadKeyError::InvalidLevel(0)));
        assert_eq!(tile_to_quadkey(0, 0, 24), Err(QuadKeyError::InvalidLevel(24)));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(quadkey_to_tile("0124"), Err(QuadKeyError::InvalidDigit('4')));
        assert_eq!(quadkey_to_tile("12a"), Err(QuadKeyError::InvalidDigit('a')));
        assert_eq!(quadkey_to_tile(""), Err(QuadKeyError::InvalidLength(0)));
        assert_eq!(
            quadkey_to_tile(&"1".repeat(24)),
            Err(QuadKeyError::InvalidLength(24))
        );
    }
}
