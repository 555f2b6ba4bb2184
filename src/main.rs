use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::process::ExitCode;

use vrt_mosaic::cli::Args;
use vrt_mosaic::{run_pipeline, GdalEngine, Result};

fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;

    info!("Input directory: {}", config.input_dir.display());
    info!("Target CRS: {}", config.crs);
    match &config.zoom {
        Some(zoom) => info!("Tiling enabled (zoom {})", zoom),
        None => info!("Tiling disabled"),
    }

    let engine = GdalEngine::default();
    let report = run_pipeline(&engine, &config)?;

    info!(
        "Mosaic: {} ({} rasters)",
        report.mosaic.path.display(),
        report.mosaic.sources.len()
    );
    if let Some(tiles) = &report.tiles {
        info!("Tiles: {} ({} tiles)", tiles.dir.display(), tiles.tile_count);
    }
    if report.sources_kept {
        info!("Reprojected rasters kept in {}", report.staging_dir.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    info!("=== VRT Mosaic ===");

    match run(args) {
        Ok(()) => {
            info!("=== Done! ===");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
