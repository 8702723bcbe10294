use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tile_stitcher::{
    stitch_with, BoundingBox, Config, FetchErrorPolicy, FileSink, ProviderError, QuadKey,
    TileFetch, TileImage, TileProvider, UrlFormat,
};

/// Serves a solid tile for every quadkey up to `max_level`, except for
/// the ones listed in `holes`.
struct Coverage {
    max_level: u8,
    holes: Vec<QuadKey>,
    tile: TileImage,
}

impl Coverage {
    fn through(max_level: u8) -> Self {
        Self {
            max_level,
            holes: Vec::new(),
            tile: Arc::new(RgbImage::from_pixel(256, 256, Rgb([200, 180, 40]))),
        }
    }
}

#[async_trait]
impl TileProvider for Coverage {
    async fn fetch(&self, quadkey: &QuadKey) -> Result<TileFetch, ProviderError> {
        if quadkey.level() > self.max_level || self.holes.contains(quadkey) {
            Ok(TileFetch::Absent)
        } else {
            Ok(TileFetch::Present(self.tile.clone()))
        }
    }
}

fn config(bounding_box: BoundingBox, output_path: PathBuf) -> Config {
    Config {
        bounding_box,
        fetch_rate: 8,
        output_path,
        url: UrlFormat::default(),
        timeout: Duration::from_secs(1),
        size_ceiling: 4096,
        max_level: 23,
        fetch_errors: FetchErrorPolicy::Abort,
    }
}

fn redmond() -> BoundingBox {
    BoundingBox::new(47.64, -122.14, 47.60, -122.10)
}

fn space_needle() -> BoundingBox {
    BoundingBox::new(47.6205, -122.3493, 47.6101, -122.3420)
}

#[tokio::test]
async fn finest_level_within_ceiling_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(redmond(), dir.path().join("redmond.jpg"));

    let stitched = stitch_with(&cfg, &Coverage::through(19), &FileSink)
        .await
        .unwrap();

    assert_eq!(stitched.level, 17);
    assert_eq!(stitched.range.width(), 15);

    let written = image::open(&cfg.output_path).unwrap();
    assert_eq!(
        (written.width(), written.height()),
        (stitched.crop.width, stitched.crop.height)
    );
}

#[tokio::test]
async fn raising_the_ceiling_reaches_finer_levels() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(redmond(), dir.path().join("redmond.png"));
    cfg.size_ceiling = 1 << 15;

    let stitched = stitch_with(&cfg, &Coverage::through(19), &FileSink)
        .await
        .unwrap();

    assert_eq!(stitched.level, 19);
    assert_eq!((stitched.range.x_min, stitched.range.y_min), (84264, 183030));
}

#[tokio::test]
async fn crop_matches_bounding_box() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(space_needle(), dir.path().join("needle.png"));

    let stitched = stitch_with(&cfg, &Coverage::through(17), &FileSink)
        .await
        .unwrap();

    assert_eq!(stitched.level, 17);
    assert_eq!(stitched.canvas, (1024, 1536));

    let written = image::open(&cfg.output_path).unwrap().to_rgb8();
    assert_eq!((written.width(), written.height()), (680, 1438));
    assert_eq!(written.get_pixel(0, 0), &Rgb([200, 180, 40]));
}

#[tokio::test]
async fn missing_tile_falls_back_to_coarser_level() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(space_needle(), dir.path().join("needle.png"));

    let mut coverage = Coverage::through(17);
    coverage
        .holes
        .push(tile_stitcher::tile_to_quadkey(20990, 45770, 17).unwrap());

    let stitched = stitch_with(&cfg, &coverage, &FileSink).await.unwrap();

    assert_eq!(stitched.level, 16);
}

#[tokio::test]
async fn nothing_is_written_without_coverage() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(space_needle(), dir.path().join("needle.png"));

    let err = stitch_with(&cfg, &Coverage::through(12), &FileSink)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("try a smaller box"));
    assert!(!cfg.output_path.exists());
}
