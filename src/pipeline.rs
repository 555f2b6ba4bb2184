use crate::crs::TargetCrs;
use crate::engine::RasterEngine;
use crate::error::Result;
use crate::mosaic::{self, MosaicDescriptor, VrtOptions};
use crate::reproject;
use crate::staging::StagingDir;
use crate::tiles::{self, TileSet, ZoomRange};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Progress of a run; stages only ever advance in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Reprojected,
    Mosaicked,
    Tiled,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Reprojected => "reprojected",
            Stage::Mosaicked => "mosaicked",
            Stage::Tiled => "tiled",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Resolved parameters for one run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Mosaic filename inside `output_dir`
    pub name: String,
    pub crs: TargetCrs,
    /// Tiling runs only when a zoom range is set
    pub zoom: Option<ZoomRange>,
    pub vrt_options: VrtOptions,
    /// Keep reprojected rasters here instead of a temporary directory
    pub sources_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            name: name.to_string(),
            crs: TargetCrs::default(),
            zoom: None,
            vrt_options: VrtOptions::new(),
            sources_dir: None,
        }
    }

    pub fn mosaic_path(&self) -> PathBuf {
        self.output_dir.join(&self.name)
    }

    /// `<output_dir>/<mosaic stem>_tiles`
    pub fn tile_dir(&self) -> PathBuf {
        let stem = Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mosaic".to_string());
        self.output_dir.join(format!("{}_tiles", stem))
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub mosaic: MosaicDescriptor,
    pub tiles: Option<TileSet>,
    pub stages: Vec<Stage>,
    /// Where reprojected rasters were staged
    pub staging_dir: PathBuf,
    /// False when the staging directory was removed at the end of the run
    pub sources_kept: bool,
}

struct StageLog(Vec<Stage>);

impl StageLog {
    fn advance(&mut self, stage: Stage) {
        debug!("Pipeline stage: {}", stage);
        self.0.push(stage);
    }
}

/// Reproject, mosaic and optionally tile.
///
/// The staging directory is released on every exit path; on success a
/// failure to remove it is reported as an error.
pub fn run_pipeline<E: RasterEngine>(engine: &E, config: &PipelineConfig) -> Result<PipelineReport> {
    let staging = match &config.sources_dir {
        Some(dir) => StagingDir::persistent(dir)?,
        None => StagingDir::temporary()?,
    };

    // On error `staging` is dropped here, which removes a temporary directory
    let report = match run_stages(engine, config, &staging) {
        Ok(report) => report,
        Err(e) => {
            if !staging.is_temporary() {
                warn!(
                    "Run failed; partial rasters remain in {} and must be removed before retrying",
                    staging.path().display()
                );
            }
            return Err(e);
        }
    };
    staging.close()?;
    Ok(report)
}

fn run_stages<E: RasterEngine>(
    engine: &E,
    config: &PipelineConfig,
    staging: &StagingDir,
) -> Result<PipelineReport> {
    let mut stages = StageLog(Vec::new());
    stages.advance(Stage::Start);

    // Every raster must share the target CRS before mosaicking
    let reprojected =
        reproject::reproject_directory(engine, &config.input_dir, staging.path(), &config.crs)?;
    info!("Reprojected {} rasters", reprojected.len());
    stages.advance(Stage::Reprojected);

    let mosaic = mosaic::vrt_from_dir(
        engine,
        staging.path(),
        &config.mosaic_path(),
        &config.vrt_options,
    )?;
    info!("Wrote {}", mosaic.path.display());
    stages.advance(Stage::Mosaicked);

    // Tiles from a previous mosaic are invalid once it is rebuilt
    let tiles = match &config.zoom {
        Some(zoom) => {
            let tile_dir = config.tile_dir();
            if tile_dir.exists() {
                info!("Removing previous tiles in {}", tile_dir.display());
                fs::remove_dir_all(&tile_dir)?;
            }
            let tile_set = tiles::tiles(engine, &mosaic.path, &tile_dir, zoom)?;
            stages.advance(Stage::Tiled);
            Some(tile_set)
        }
        None => {
            debug!("Tiling not requested");
            None
        }
    };

    if staging.is_temporary() {
        warn!(
            "{} references staged rasters that are removed when this run ends; \
             use --sources-dir to keep them",
            mosaic.path.display()
        );
    }
    stages.advance(Stage::Done);

    Ok(PipelineReport {
        mosaic,
        tiles,
        stages: stages.0,
        staging_dir: staging.path().to_path_buf(),
        sources_kept: !staging.is_temporary(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::error::MosaicError;
    use tempfile::{tempdir, TempDir};

    fn glacier_inputs() -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.tif"), b"a").unwrap();
        fs::write(dir.path().join("b.tif"), b"b").unwrap();
        dir
    }

    #[test]
    fn test_mosaic_without_tiles() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let mut config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");
        config.crs = TargetCrs::new("EPSG:4326").unwrap();

        let engine = FakeEngine::default();
        let report = run_pipeline(&engine, &config).unwrap();

        let vrt = output.path().join("merged.vrt");
        assert_eq!(report.mosaic.path, vrt);
        assert!(vrt.is_file());
        assert_eq!(report.mosaic.sources.len(), 2);
        let stems: Vec<_> = report
            .mosaic
            .sources
            .iter()
            .map(|p| p.file_stem().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(stems, vec!["a", "b"]);

        assert!(report.tiles.is_none());
        assert!(!config.tile_dir().exists());
        assert_eq!(
            report.stages,
            vec![Stage::Start, Stage::Reprojected, Stage::Mosaicked, Stage::Done]
        );

        assert!(!report.sources_kept);
        assert!(!report.staging_dir.exists());
        // Only the mosaic lands in the output directory
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_mosaic_with_tiles() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let mut config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");
        config.zoom = Some(ZoomRange::new(3, 4).unwrap());

        let engine = FakeEngine::default();
        let report = run_pipeline(&engine, &config).unwrap();

        let tile_set = report.tiles.unwrap();
        assert_eq!(tile_set.dir, output.path().join("merged_tiles"));
        assert!(tile_set.dir.is_dir());
        assert!(tile_set.tile_count >= 1);
        assert_eq!(tile_set.zoom.to_string(), "3-4");
        assert_eq!(report.stages[3], Stage::Tiled);
        assert_eq!(report.stages.last(), Some(&Stage::Done));
        assert!(!report.staging_dir.exists());
    }

    #[test]
    fn test_staging_removed_on_failure() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");

        let engine = FakeEngine {
            fail_vrt: true,
            ..Default::default()
        };
        let result = run_pipeline(&engine, &config);
        assert!(matches!(result, Err(MosaicError::ToolFailed { .. })));

        let warps = engine.warps();
        assert_eq!(warps.len(), 2);
        let staging = warps[0].1.parent().unwrap().to_path_buf();
        assert!(!staging.exists());
        assert!(!output.path().join("merged.vrt").exists());
    }

    #[test]
    fn test_staging_removed_when_warp_fails_midway() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");

        let engine = FakeEngine {
            fail_warp_after: Some(1),
            ..Default::default()
        };
        let result = run_pipeline(&engine, &config);
        assert!(matches!(result, Err(MosaicError::ToolFailed { .. })));

        // First raster was staged before the second one failed
        let warps = engine.warps();
        assert_eq!(warps.len(), 2);
        let staging = warps[0].1.parent().unwrap().to_path_buf();
        assert!(!staging.exists());
        assert!(!output.path().join("merged.vrt").exists());
    }

    #[test]
    fn test_failed_run_leaves_sources_dir_for_inspection() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let sources = output.path().join("sources");
        let mut config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");
        config.sources_dir = Some(sources.clone());

        let engine = FakeEngine {
            fail_warp_after: Some(1),
            ..Default::default()
        };
        assert!(run_pipeline(&engine, &config).is_err());
        assert!(sources.join("a.tif").is_file());

        let retry = run_pipeline(&FakeEngine::default(), &config).unwrap_err();
        assert!(matches!(retry, MosaicError::StagingNotEmpty(_)));
        assert!(retry.to_string().contains("remove them"));
    }

    #[test]
    fn test_rerun_replaces_previous_tiles() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let mut config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");
        config.zoom = Some(ZoomRange::new(3, 4).unwrap());

        run_pipeline(&FakeEngine::default(), &config).unwrap();
        assert!(config.tile_dir().join("3").join("0").join("0.png").is_file());

        // A rerun whose engine renders nothing must not report the old tiles
        let engine = FakeEngine {
            skip_tiles_output: true,
            ..Default::default()
        };
        let result = run_pipeline(&engine, &config);
        assert!(matches!(result, Err(MosaicError::EmptyTileSet(_))));
        assert!(!config.tile_dir().join("3").join("0").join("0.png").exists());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");

        let engine = FakeEngine::default();
        assert!(matches!(
            run_pipeline(&engine, &config),
            Err(MosaicError::NoRasters(_))
        ));
        assert!(!output.path().join("merged.vrt").exists());
    }

    #[test]
    fn test_sources_dir_is_kept() {
        let input = glacier_inputs();
        let output = tempdir().unwrap();
        let mut config = PipelineConfig::new(input.path(), output.path(), "merged.vrt");
        let sources = output.path().join("sources");
        config.sources_dir = Some(sources.clone());

        let engine = FakeEngine::default();
        let report = run_pipeline(&engine, &config).unwrap();

        assert!(report.sources_kept);
        assert_eq!(report.staging_dir, sources);
        assert!(sources.join("a.tif").is_file());
        assert!(sources.join("b.tif").is_file());
    }

    #[test]
    fn test_tile_dir_naming() {
        let config = PipelineConfig::new("in", "out", "glaciers.vrt");
        assert_eq!(config.mosaic_path(), Path::new("out/glaciers.vrt"));
        assert_eq!(config.tile_dir(), Path::new("out/glaciers_tiles"));
    }
}
