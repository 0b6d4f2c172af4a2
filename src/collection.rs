//! Image collections: one directory's worth of images, listed single-depth

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::CollectionOverride;
use crate::constants::IMAGE_EXTENSIONS;
use crate::error::{RotateError, RotateResult};

/// A configured collection directory plus its optional render overrides
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub path: PathBuf,
    pub overrides: CollectionOverride,
}

impl Collection {
    pub fn new(path: impl Into<PathBuf>, overrides: CollectionOverride) -> Self {
        Self {
            path: path.into(),
            overrides,
        }
    }

    /// List this collection's images, failing on an unreadable or empty directory
    pub fn load_images(&self) -> RotateResult<Vec<PathBuf>> {
        let images = read_images(&self.path)?;
        if images.is_empty() {
            return Err(RotateError::EmptyCollection {
                path: self.path.clone(),
            });
        }
        Ok(images)
    }
}

/// True when `path` has one of the known image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Absolute paths of the image files directly inside `dir`, sorted by file name
pub fn read_images(dir: &Path) -> RotateResult<Vec<PathBuf>> {
    let read_failure = |source| RotateError::ReadFailure {
        path: dir.to_path_buf(),
        source,
    };

    let dir = fs::canonicalize(dir).map_err(read_failure)?;
    let mut images = Vec::new();
    for entry in fs::read_dir(&dir).map_err(read_failure)? {
        let entry = entry.map_err(read_failure)?;
        // Follows symlinks, so a linked image still counts
        let is_file = fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
        if is_file && is_image_file(&entry.path()) {
            images.push(entry.path());
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), count = images.len(), "Listed collection images");
    Ok(images)
}
