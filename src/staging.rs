use crate::error::{MosaicError, Result};
use crate::scan;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEMP_PREFIX: &str = "vrt-mosaic-";

/// Working directory for reprojected rasters.
///
/// A temporary directory is removed when this value is closed or dropped,
/// including on error and panic paths. A persistent directory is left in
/// place so a VRT referencing it stays valid.
#[derive(Debug)]
pub enum StagingDir {
    Temporary(TempDir),
    Persistent(PathBuf),
}

impl StagingDir {
    /// Create a fresh directory under the system temp location
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir()?;
        debug!("Staging in temporary directory {}", dir.path().display());
        Ok(Self::Temporary(dir))
    }

    /// Stage into `dir`, creating it if needed.
    ///
    /// The directory must not already hold rasters, otherwise stale files
    /// would end up in the mosaic.
    pub fn persistent(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        if !scan::find_rasters(dir)?.is_empty() {
            return Err(MosaicError::StagingNotEmpty(dir.to_path_buf()));
        }
        debug!("Staging in persistent directory {}", dir.display());
        Ok(Self::Persistent(dir.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Persistent(dir) => dir,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Release the directory, reporting removal failures that a plain drop
    /// would swallow
    pub fn close(self) -> Result<()> {
        match self {
            Self::Temporary(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|source| {
                    warn!("Could not remove staging directory {}", path.display());
                    MosaicError::Cleanup { path, source }
                })
            }
            Self::Persistent(_) => Ok(()),
        }
    }
}
