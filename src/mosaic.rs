use crate::engine::RasterEngine;
use crate::error::{MosaicError, Result};
use crate::scan;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Options forwarded verbatim to the VRT builder.
///
/// Entries are written as `key` or `key=value` and become `-key` or
/// `-key value` arguments, e.g. `resolution=highest` or `separate`. Keys are
/// not checked against the builder's option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VrtOptions {
    args: Vec<String>,
}

impl VrtOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for pair in pairs {
            options.push_pair(pair.as_ref())?;
        }
        Ok(options)
    }

    /// Append one `key[=value]` entry
    pub fn push_pair(&mut self, pair: &str) -> Result<()> {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (pair, None),
        };
        let key = key.trim().trim_start_matches('-');
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(MosaicError::InvalidVrtOption(pair.to_string()));
        }

        self.args.push(format!("-{}", key));
        if let Some(value) = value {
            self.args.push(value.to_string());
        }
        Ok(())
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A written VRT and the rasters it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicDescriptor {
    pub path: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// Build a VRT at `output_path` from every raster in `input_dir`.
///
/// Inputs are expected to share one CRS already; nothing here checks that.
/// An empty directory is an error rather than an empty mosaic.
pub fn vrt_from_dir<E: RasterEngine>(
    engine: &E,
    input_dir: &Path,
    output_path: &Path,
    options: &VrtOptions,
) -> Result<MosaicDescriptor> {
    let sources = scan::require_rasters(input_dir)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    info!(
        "Building VRT {} from {} rasters",
        output_path.display(),
        sources.len()
    );
    for source in &sources {
        debug!("  {}", source.display());
    }

    engine.build_vrt(&sources, output_path, options)?;

    if !output_path.exists() {
        return Err(MosaicError::MissingOutput(output_path.to_path_buf()));
    }

    Ok(MosaicDescriptor {
        path: output_path.to_path_buf(),
        sources,
    })
}
