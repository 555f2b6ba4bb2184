use crate::engine::RasterEngine;
use crate::error::{MosaicError, Result};
use log::info;
use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Zoom range used when the caller does not give one
pub const DEFAULT_ZOOM: &str = "15-17";

/// Deepest zoom level accepted
pub const MAX_ZOOM: u8 = 30;

/// Inclusive zoom range, written `min-max` or a single `z`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Result<Self> {
        if min > max || max > MAX_ZOOM {
            return Err(MosaicError::InvalidZoom(format!("{}-{}", min, max)));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn levels(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 15, max: 17 }
    }
}

impl FromStr for ZoomRange {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MosaicError::InvalidZoom(s.to_string());
        let parse = |level: &str| level.trim().parse::<u8>().map_err(|_| invalid());

        let (min, max) = match s.trim().split_once('-') {
            Some((min, max)) => (parse(min)?, parse(max)?),
            None => {
                let level = parse(s)?;
                (level, level)
            }
        };
        Self::new(min, max).map_err(|_| invalid())
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// A rendered tile pyramid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    pub dir: PathBuf,
    pub zoom: ZoomRange,
    pub tile_count: usize,
}

/// Count `.png` tiles anywhere below `dir`; symlinks are not followed
pub fn count_tiles(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        // Check extension
        let is_png = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            count += 1;
        }
    }
    Ok(count)
}

/// Render tiles for `input_file` into `output_dir` over `zoom`.
///
/// `output_dir` must not already hold tiles, so the returned count only
/// covers tiles rendered by this call.
pub fn tiles<E: RasterEngine>(
    engine: &E,
    input_file: &Path,
    output_dir: &Path,
    zoom: &ZoomRange,
) -> Result<TileSet> {
    // Validate input
    if !input_file.is_file() {
        return Err(MosaicError::InputNotFound(input_file.to_path_buf()));
    }
    if output_dir.is_dir() && count_tiles(output_dir)? > 0 {
        return Err(MosaicError::StaleTiles(output_dir.to_path_buf()));
    }

    info!(
        "Generating tiles for {} at zoom {} into {}",
        input_file.display(),
        zoom,
        output_dir.display()
    );
    fs::create_dir_all(output_dir)?;
    engine.generate_tiles(input_file, output_dir, zoom)?;

    // Engines can exit cleanly without rendering anything
    let tile_count = count_tiles(output_dir)?;
    if tile_count == 0 {
        return Err(MosaicError::EmptyTileSet(output_dir.to_path_buf()));
    }
    info!("Wrote {} tiles", tile_count);

    Ok(TileSet {
        dir: output_dir.to_path_buf(),
        zoom: *zoom,
        tile_count,
    })
}
