use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::StitchError;
use crate::mosaic::{CropRect, MosaicComposer};
use crate::provider::{HttpTileProvider, TileProvider};
use crate::selector::{LevelSelector, Selection};
use crate::sink::{FileSink, ImageSink};
use crate::tile::TileRange;

/// Summary of a stitched (or planned) image.
#[derive(Clone, Debug, PartialEq)]
pub struct Stitched {
    pub level: u8,
    pub range: TileRange,
    /// Size of the uncropped mosaic.
    pub canvas: (u32, u32),
    /// The part of the mosaic covered by the bounding box.
    pub crop: CropRect,
    /// Where the image was written, `None` for a plan.
    pub output_path: Option<PathBuf>,
}

impl Stitched {
    /// Approximate memory needed for the uncropped mosaic, in bytes.
    pub fn mosaic_bytes(&self) -> f64 {
        f64::from(self.canvas.0) * f64::from(self.canvas.1) * 3f64
    }
}

/// Stitch the finest fully covered level of the bounding box in `cfg` and
/// write the cropped image to the configured output path.
///
/// No file is created if any step fails.
///
/// # Example
/// ```rust,no_run
/// use tile_stitcher::{stitch, BoundingBox, Config, FetchErrorPolicy, UrlFormat};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = Config {
///     bounding_box: BoundingBox::new(47.64, -122.14, 47.60, -122.10),
///     fetch_rate: 5,
///     output_path: "result.jpg".into(),
///     url: UrlFormat::default(),
///     timeout: Duration::from_secs(10),
///     size_ceiling: 4096,
///     max_level: 23,
///     fetch_errors: FetchErrorPolicy::Abort,
/// };
///
/// stitch(config).await.expect("failed stitching tiles");
/// # }
/// ```
pub async fn stitch(cfg: Config) -> Result<Stitched> {
    let provider = HttpTileProvider::new(cfg.url.clone(), cfg.timeout)?;
    stitch_with(&cfg, &provider, &FileSink).await
}

/// Like [`stitch`], but only selects the level and reports the image
/// dimensions without composing or writing anything.
pub async fn plan(cfg: Config) -> Result<Stitched> {
    let provider = HttpTileProvider::new(cfg.url.clone(), cfg.timeout)?;
    plan_with(&cfg, &provider).await
}

/// Stitch using the given tile provider and image sink.
pub async fn stitch_with<P, S>(cfg: &Config, provider: &P, sink: &S) -> Result<Stitched>
where
    P: TileProvider + ?Sized,
    S: ImageSink + ?Sized,
{
    sink.check(&cfg.output_path)
        .map_err(StitchError::from)
        .with_context(|| format!("cannot write image to {:?}", cfg.output_path))?;

    let selection = select_level(cfg, provider).await?;
    let mut stitched = summarize(cfg, &selection);

    log::info!(
        "assembling {}x{} mosaic ({}) from {} tiles",
        stitched.canvas.0,
        stitched.canvas.1,
        pretty_bytes::converter::convert(stitched.mosaic_bytes()),
        selection.tiles.len(),
    );

    let bbox = cfg.bounding_box;
    let image = tokio::task::spawn_blocking(move || {
        MosaicComposer::default().assemble(&bbox, &selection)
    })
    .await
    .context("mosaic assembly panicked")?
    .context("failed assembling mosaic")?;

    sink.persist(&image, &cfg.output_path)
        .map_err(StitchError::from)
        .with_context(|| format!("failed writing image to {:?}", cfg.output_path))?;

    log::info!(
        "wrote {}x{} image at level {} to {:?}",
        image.width(),
        image.height(),
        stitched.level,
        cfg.output_path
    );

    stitched.output_path = Some(cfg.output_path.clone());
    Ok(stitched)
}

/// Like [`plan`], using the given tile provider.
pub async fn plan_with<P>(cfg: &Config, provider: &P) -> Result<Stitched>
where
    P: TileProvider + ?Sized,
{
    let selection = select_level(cfg, provider).await?;
    Ok(summarize(cfg, &selection))
}

async fn select_level<P>(cfg: &Config, provider: &P) -> Result<Selection>
where
    P: TileProvider + ?Sized,
{
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
            .progress_chars("##-"),
    );

    let selection = LevelSelector::new(provider)
        .with_fetch_rate(usize::from(cfg.fetch_rate))
        .with_size_ceiling(cfg.size_ceiling)
        .with_max_level(cfg.max_level)
        .with_fetch_error_policy(cfg.fetch_errors)
        .with_progress(pb.clone())
        .select(&cfg.bounding_box)
        .await;

    pb.finish_and_clear();

    selection.with_context(|| format!("failed selecting a level for {}", cfg.bounding_box))
}

fn summarize(cfg: &Config, selection: &Selection) -> Stitched {
    let composer = MosaicComposer::default();

    Stitched {
        level: selection.level(),
        range: selection.range,
        canvas: composer.canvas_size(&selection.range),
        crop: composer.crop_rect(&cfg.bounding_box, &selection.range),
        output_path: None,
    }
}
