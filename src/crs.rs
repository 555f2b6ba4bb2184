use crate::error::{MosaicError, Result};
use gdal::spatial_ref::SpatialRef;
use log::{info, warn};
use std::fmt;

/// Target CRS used when none is given on the command line
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// A target coordinate reference system identifier (e.g. `EPSG:3857`).
///
/// Only checked for emptiness here; whether the engine accepts it is decided
/// by [`RasterEngine::validate_crs`](crate::engine::RasterEngine::validate_crs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCrs(String);

impl TargetCrs {
    pub fn new(definition: &str) -> Result<Self> {
        let definition = definition.trim();
        if definition.is_empty() {
            return Err(MosaicError::InvalidCrs {
                crs: String::new(),
                reason: "empty identifier".to_string(),
            });
        }
        Ok(Self(definition.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TargetCrs {
    fn default() -> Self {
        Self(DEFAULT_CRS.to_string())
    }
}

impl fmt::Display for TargetCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the identifier through GDAL/PROJ and log what kind of CRS it is
pub fn resolve_with_gdal(crs: &TargetCrs) -> Result<SpatialRef> {
    let spatial_ref =
        SpatialRef::from_definition(crs.as_str()).map_err(|e| MosaicError::InvalidCrs {
            crs: crs.to_string(),
            reason: e.to_string(),
        })?;

    if spatial_ref.is_geographic() {
        info!("Target CRS {} is geographic (lat/lon)", crs);
    } else if spatial_ref.is_projected() {
        info!(
            "Target CRS {} is projected (linear units={:.6})",
            crs,
            spatial_ref.linear_units()
        );
    } else {
        warn!("Target CRS {} is neither geographic nor projected", crs);
    }

    Ok(spatial_ref)
}
