use crate::crs::{self, TargetCrs};
use crate::engine::RasterEngine;
use crate::error::Result;
use crate::mosaic::VrtOptions;
use crate::tiles::ZoomRange;
use crate::tools;
use gdal::programs::raster::{build_vrt, BuildVRTOptions};
use gdal::Dataset;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// [`RasterEngine`] backed by GDAL.
///
/// CRS checks and VRT construction go through the `gdal` bindings;
/// warping and tiling run the `gdalwarp` and `gdal2tiles` programs.
#[derive(Debug, Clone)]
pub struct GdalEngine {
    pub gdalwarp: String,
    /// Candidates tried in order; distributions ship either name
    pub gdal2tiles: Vec<String>,
}

impl Default for GdalEngine {
    fn default() -> Self {
        Self {
            gdalwarp: "gdalwarp".to_string(),
            gdal2tiles: vec!["gdal2tiles".to_string(), "gdal2tiles.py".to_string()],
        }
    }
}

/// Arguments for reprojecting `src` into a fresh GeoTIFF at `dst`
pub fn warp_args(src: &Path, dst: &Path, crs: &TargetCrs) -> Vec<OsString> {
    vec![
        "-overwrite".into(),
        "-t_srs".into(),
        crs.as_str().into(),
        "-of".into(),
        "GTiff".into(),
        src.into(),
        dst.into(),
    ]
}

/// Arguments for an XYZ tile pyramid without HTML viewers
pub fn tile_args(input: &Path, output_dir: &Path, zoom: &ZoomRange) -> Vec<OsString> {
    vec![
        "--xyz".into(),
        "-z".into(),
        zoom.to_string().into(),
        "-w".into(),
        "none".into(),
        input.into(),
        output_dir.into(),
    ]
}

impl RasterEngine for GdalEngine {
    fn validate_crs(&self, crs: &TargetCrs) -> Result<()> {
        crs::resolve_with_gdal(crs).map(|_| ())
    }

    fn warp(&self, src: &Path, dst: &Path, crs: &TargetCrs) -> Result<()> {
        tools::run_tool(&self.gdalwarp, &warp_args(src, dst, crs))
    }

    fn build_vrt(&self, sources: &[PathBuf], output: &Path, options: &VrtOptions) -> Result<()> {
        let datasets = sources
            .iter()
            .map(Dataset::open)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("BuildVRT options: {:?}", options.args());
        let vrt_options = if options.is_empty() {
            None
        } else {
            Some(BuildVRTOptions::new(options.args().to_vec())?)
        };

        let vrt = build_vrt(Some(output), &datasets, vrt_options)?;
        let (width, height) = vrt.raster_size();
        info!(
            "VRT is {}x{} pixels with {} bands",
            width,
            height,
            vrt.raster_count()
        );

        // The VRT is written to disk when the dataset closes
        drop(vrt);
        Ok(())
    }

    fn generate_tiles(&self, input: &Path, output_dir: &Path, zoom: &ZoomRange) -> Result<()> {
        tools::run_first_available(&self.gdal2tiles, &tile_args(input, output_dir, zoom))
    }
}
