use crate::crs::{TargetCrs, DEFAULT_CRS};
use crate::error::Result;
use crate::mosaic::VrtOptions;
use crate::pipeline::PipelineConfig;
use crate::tiles::{ZoomRange, DEFAULT_ZOOM};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vrt-mosaic")]
#[command(about = "Reproject a directory of rasters, merge them into a VRT and optionally tile it")]
#[command(version)]
pub struct Args {
    /// Directory of source rasters (*.tif, *.tiff; not recursive)
    #[arg(short = 'd', long = "input_dir", value_name = "DIR", default_value = "../../data_glaciers/")]
    pub input_dir: PathBuf,

    /// Directory for the mosaic and tiles
    #[arg(short = 'o', long = "output_dir", value_name = "DIR", default_value = "./")]
    pub output_dir: PathBuf,

    /// Mosaic filename
    #[arg(short, long, value_name = "FILE", default_value = "output.vrt")]
    pub name: String,

    /// Also render a web map tile pyramid from the mosaic
    #[arg(short, long)]
    pub tile: bool,

    /// Target CRS for reprojection (e.g. EPSG:3857)
    #[arg(short, long, value_name = "CRS", default_value = DEFAULT_CRS)]
    pub crs: String,

    /// Tile zoom levels, 'min-max' or a single level
    #[arg(short, long, value_name = "RANGE", default_value = DEFAULT_ZOOM)]
    pub zoom: String,

    /// VRT builder option as key[=value], e.g. resolution=highest (repeatable)
    #[arg(long = "vrt-opt", value_name = "KEY[=VALUE]")]
    pub vrt_opts: Vec<String>,

    /// Keep reprojected rasters in DIR so the VRT stays valid after the run
    #[arg(long, value_name = "DIR")]
    pub sources_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the raw arguments into a run configuration
    pub fn into_config(self) -> Result<PipelineConfig> {
        let zoom = if self.tile {
            Some(self.zoom.parse::<ZoomRange>()?)
        } else {
            None
        };

        Ok(PipelineConfig {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            name: self.name,
            crs: TargetCrs::new(&self.crs)?,
            zoom,
            vrt_options: VrtOptions::from_pairs(&self.vrt_opts)?,
            sources_dir: self.sources_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MosaicError;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["vrt-mosaic"]).unwrap();
        assert_eq!(args.input_dir, PathBuf::from("../../data_glaciers/"));
        assert_eq!(args.output_dir, PathBuf::from("./"));
        assert_eq!(args.name, "output.vrt");
        assert!(!args.tile);

        let config = args.into_config().unwrap();
        assert_eq!(config.crs.as_str(), "EPSG:4326");
        assert!(config.zoom.is_none());
        assert!(config.vrt_options.is_empty());
        assert!(config.sources_dir.is_none());
    }

    #[test]
    fn test_full_invocation() {
        let args = Args::try_parse_from([
            "vrt-mosaic",
            "-d",
            "rasters",
            "--output_dir",
            "out",
            "-n",
            "merged.vrt",
            "-t",
            "-c",
            "EPSG:3857",
            "-z",
            "10-12",
            "--vrt-opt",
            "resolution=highest",
            "--vrt-opt",
            "separate",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("rasters"));
        assert_eq!(config.mosaic_path(), PathBuf::from("out/merged.vrt"));
        assert_eq!(config.crs.as_str(), "EPSG:3857");
        assert_eq!(config.zoom, Some(ZoomRange::new(10, 12).unwrap()));
        assert_eq!(
            config.vrt_options.args(),
            ["-resolution", "highest", "-separate"]
        );
    }

    #[test]
    fn test_tile_uses_default_zoom() {
        let args = Args::try_parse_from(["vrt-mosaic", "--tile"]).unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.zoom, Some(ZoomRange::default()));
    }

    #[test]
    fn test_bad_zoom_only_matters_when_tiling() {
        let args = Args::try_parse_from(["vrt-mosaic", "-z", "20-10"]).unwrap();
        assert!(args.into_config().is_ok());

        let args = Args::try_parse_from(["vrt-mosaic", "-t", "-z", "20-10"]).unwrap();
        assert!(matches!(args.into_config(), Err(MosaicError::InvalidZoom(_))));
    }

    #[test]
    fn test_bad_vrt_option() {
        let args = Args::try_parse_from(["vrt-mosaic", "--vrt-opt", "=x"]).unwrap();
        assert!(matches!(args.into_config(), Err(MosaicError::InvalidVrtOption(_))));
    }
}
