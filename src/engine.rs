//! The boundary between the pipeline and the raster engine doing the work.

use crate::crs::TargetCrs;
use crate::error::Result;
use crate::mosaic::VrtOptions;
use crate::tiles::ZoomRange;
use std::path::{Path, PathBuf};

/// Raster capabilities the pipeline delegates to an external engine.
///
/// Every method blocks until the engine is done. Implementations report
/// engine rejections as errors and never retry.
pub trait RasterEngine {
    /// Check that `crs` is an identifier the engine can project into
    fn validate_crs(&self, crs: &TargetCrs) -> Result<()>;

    /// Reproject `src` into a new GeoTIFF at `dst`
    fn warp(&self, src: &Path, dst: &Path, crs: &TargetCrs) -> Result<()>;

    /// Write a VRT at `output` referencing every path in `sources`
    fn build_vrt(&self, sources: &[PathBuf], output: &Path, options: &VrtOptions) -> Result<()>;

    /// Render a tile pyramid for `input` into `output_dir`
    fn generate_tiles(&self, input: &Path, output_dir: &Path, zoom: &ZoomRange) -> Result<()>;
}
