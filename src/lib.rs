// Library exports for testing and reuse

pub mod cli;
pub mod crs;
pub mod engine;
pub mod error;
pub mod gdal_engine;
pub mod mosaic;
pub mod pipeline;
pub mod reproject;
pub mod scan;
pub mod staging;
pub mod tiles;
pub mod tools;

// Re-export commonly used types
pub use engine::RasterEngine;
pub use error::{MosaicError, Result};
pub use gdal_engine::GdalEngine;
pub use mosaic::{vrt_from_dir, MosaicDescriptor, VrtOptions};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineReport, Stage};
pub use reproject::reproject_directory;
pub use tiles::{tiles, TileSet, ZoomRange};
