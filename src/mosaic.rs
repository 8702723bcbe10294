//! Assembly of fetched tiles into a single image.

use image::{imageops, RgbImage};
use std::collections::HashMap;

use crate::bounding_box::BoundingBox;
use crate::error::StitchError;
use crate::provider::TileImage;
use crate::selector::Selection;
use crate::tile::{TileCoord, TileRange};
use crate::tile_system::TileSystem;

/// A pixel rectangle relative to the top-left corner of a mosaic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Places the tiles of a range edge to edge and crops the result to a
/// bounding box.
#[derive(Clone, Copy, Debug, Default)]
pub struct MosaicComposer {
    system: TileSystem,
}

impl MosaicComposer {
    pub fn new(system: TileSystem) -> Self {
        Self { system }
    }

    /// Width and height of the uncropped mosaic of `range` in pixels.
    pub fn canvas_size(&self, range: &TileRange) -> (u32, u32) {
        (
            range.width() * self.system.tile_size,
            range.height() * self.system.tile_size,
        )
    }

    /// Blits every tile of `range` onto a fresh canvas.
    ///
    /// Tiles are copied without scaling; anything beyond the tile size is
    /// ignored so neighbouring tiles never overlap.
    pub fn compose(
        &self,
        range: &TileRange,
        tiles: &HashMap<TileCoord, TileImage>,
    ) -> Result<RgbImage, StitchError> {
        let (width, height) = self.canvas_size(range);
        let tile_size = self.system.tile_size;
        let mut canvas = RgbImage::new(width, height);

        for tile in range.tiles() {
            let image = tiles.get(&tile).ok_or(StitchError::MissingTile(tile))?;
            let view = imageops::crop_imm(&**image, 0, 0, tile_size, tile_size);

            imageops::replace(
                &mut canvas,
                &*view,
                i64::from((tile.x - range.x_min) * tile_size),
                i64::from((tile.y - range.y_min) * tile_size),
            );
        }

        Ok(canvas)
    }

    /// The part of the mosaic of `range` that lies within `bbox`.
    ///
    /// A box that collapses to a single pixel still yields a 1x1 rectangle.
    pub fn crop_rect(&self, bbox: &BoundingBox, range: &TileRange) -> CropRect {
        let a = self
            .system
            .geo_to_pixel(bbox.first.lat, bbox.first.lon, range.level);
        let b = self
            .system
            .geo_to_pixel(bbox.second.lat, bbox.second.lon, range.level);

        let base_x = range.x_min * self.system.tile_size;
        let base_y = range.y_min * self.system.tile_size;

        let (left, right) = (a.x.min(b.x) - base_x, a.x.max(b.x) - base_x);
        let (top, bottom) = (a.y.min(b.y) - base_y, a.y.max(b.y) - base_y);

        CropRect {
            x: left,
            y: top,
            width: (right - left).max(1),
            height: (bottom - top).max(1),
        }
    }

    pub fn crop(&self, canvas: &RgbImage, rect: CropRect) -> RgbImage {
        imageops::crop_imm(canvas, rect.x, rect.y, rect.width, rect.height).to_image()
    }

    /// Composes the selected tiles and crops them to `bbox`.
    pub fn assemble(
        &self,
        bbox: &BoundingBox,
        selection: &Selection,
    ) -> Result<RgbImage, StitchError> {
        let canvas = self.compose(&selection.range, &selection.tiles)?;
        let rect = self.crop_rect(bbox, &selection.range);

        log::debug!(
            "cropping {}x{} mosaic to {:?}",
            canvas.width(),
            canvas.height(),
            rect
        );

        Ok(self.crop(&canvas, rect))
    }
}
