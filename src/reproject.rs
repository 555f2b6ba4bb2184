use crate::crs::TargetCrs;
use crate::engine::RasterEngine;
use crate::error::{MosaicError, Result};
use crate::scan;
use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the reprojected copy of `src` is written: `<output_dir>/<stem>.tif`
pub fn reprojected_path(output_dir: &Path, src: &Path) -> PathBuf {
    let stem = src.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}.tif", stem))
}

/// Reproject every raster directly inside `input_dir` into `output_dir`.
///
/// The CRS is validated before anything is written. Returns one output path
/// per input, in input order; the first failing file aborts the run.
pub fn reproject_directory<E: RasterEngine>(
    engine: &E,
    input_dir: &Path,
    output_dir: &Path,
    crs: &TargetCrs,
) -> Result<Vec<PathBuf>> {
    let inputs = scan::require_rasters(input_dir)?;
    engine.validate_crs(crs)?;

    // Outputs are named by stem, so stems must be unique
    let mut stems = HashSet::new();
    for src in &inputs {
        let stem = src.file_stem().unwrap_or_default().to_string_lossy().into_owned();
        if !stems.insert(stem.clone()) {
            return Err(MosaicError::DuplicateStem(stem));
        }
    }

    fs::create_dir_all(output_dir)?;
    info!(
        "Reprojecting {} rasters from {} to {}",
        inputs.len(),
        input_dir.display(),
        crs
    );

    let mut outputs = Vec::with_capacity(inputs.len());
    for (i, src) in inputs.iter().enumerate() {
        let dst = reprojected_path(output_dir, src);
        info!("[{}/{}] Reprojecting {}", i + 1, inputs.len(), src.display());

        engine.warp(src, &dst, crs)?;

        // Check the engine actually wrote the file
        if !dst.is_file() {
            return Err(MosaicError::MissingOutput(dst));
        }
        outputs.push(dst);
    }

    Ok(outputs)
}
