use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No raster files (*.tif, *.tiff) found in {0}")]
    NoRasters(PathBuf),

    #[error("Invalid CRS '{crs}': {reason}")]
    InvalidCrs { crs: String, reason: String },

    #[error("Invalid zoom range '{0}' (expected 'z' or 'min-max' within 0-30)")]
    InvalidZoom(String),

    #[error("Invalid VRT option '{0}' (expected 'key' or 'key=value')")]
    InvalidVrtOption(String),

    #[error("Engine reported success but produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("External tool '{tool}' not found on PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("Tile generation produced no tiles in {0}")]
    EmptyTileSet(PathBuf),

    #[error("Tile directory {0} already holds tiles from an earlier run")]
    StaleTiles(PathBuf),

    #[error("Two inputs share the stem '{0}'; reprojected outputs would collide")]
    DuplicateStem(String),

    #[error(
        "Staging directory {0} already contains rasters (possibly left by a failed run); \
         remove them or pick another --sources-dir"
    )]
    StagingNotEmpty(PathBuf),

    #[error("Failed to remove staging directory {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MosaicError>;
