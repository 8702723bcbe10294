mod args;
mod validators;

use anyhow::Result;
use args::Args;
use tile_stitcher::{plan, stitch, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let dry_run = args.dry_run;
    let config: Config = args.into();

    if dry_run {
        let planned = plan(config).await?;

        eprintln!(
            "would stitch level {} from {} tiles into a {}x{} image (approx {} in memory)",
            planned.level,
            planned.range.tile_count(),
            planned.crop.width,
            planned.crop.height,
            pretty_bytes::converter::convert(planned.mosaic_bytes())
        );

        Ok(())
    } else {
        stitch(config).await.map(|_| ())
    }
}
