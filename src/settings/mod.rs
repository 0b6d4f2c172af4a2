//! Host terminal settings: locating the file and patching background fields
//!
//! The document is read fresh on every publish and everything outside the
//! four background-image fields of the addressed profile is written back as it
//! was read, key order included.

mod patch;

pub use patch::{publish, Background};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::paths;
use crate::error::{RotateError, RotateResult};

/// Probe order: stable release, preview release, unpackaged install
pub fn candidate_paths(local_data: &Path) -> Vec<PathBuf> {
    [
        paths::STABLE_SETTINGS,
        paths::PREVIEW_SETTINGS,
        paths::UNPACKAGED_SETTINGS,
    ]
    .iter()
    .map(|relative| local_data.join(relative))
    .collect()
}

/// First candidate that exists as a file
pub fn probe(candidates: &[PathBuf]) -> RotateResult<PathBuf> {
    for candidate in candidates {
        debug!(path = %candidate.display(), "Probing for terminal settings");
        if candidate.is_file() {
            info!(path = %candidate.display(), "Found terminal settings");
            return Ok(candidate.clone());
        }
    }
    Err(RotateError::SettingsNotFound {
        probed: candidates.to_vec(),
    })
}

/// Resolve the settings file, honouring an explicit path when one is configured
pub fn locate_settings(explicit: Option<&Path>) -> RotateResult<PathBuf> {
    if let Some(path) = explicit {
        return probe(&[path.to_path_buf()]);
    }

    let local_data = dirs::data_local_dir().ok_or(RotateError::SettingsNotFound { probed: Vec::new() })?;
    probe(&candidate_paths(&local_data))
}
