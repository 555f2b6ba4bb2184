use crate::error::{MosaicError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions recognised as raster inputs (compared case-insensitively)
pub const RASTER_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// Whether a path carries one of the raster extensions
pub fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RASTER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List raster files directly inside `dir` (non-recursive), sorted by path.
///
/// A missing directory is `InputNotFound`; an empty match set is returned as
/// an empty vec so callers decide whether that is an error.
pub fn find_rasters(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MosaicError::InputNotFound(dir.to_path_buf()));
    }

    let mut rasters = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_raster(&path) {
            rasters.push(path);
        }
    }
    rasters.sort();

    debug!("Found {} rasters in {}", rasters.len(), dir.display());
    Ok(rasters)
}

/// Like [`find_rasters`], but an empty directory is `NoRasters`
pub fn require_rasters(dir: &Path) -> Result<Vec<PathBuf>> {
    let rasters = find_rasters(dir)?;
    if rasters.is_empty() {
        return Err(MosaicError::NoRasters(dir.to_path_buf()));
    }
    Ok(rasters)
}
