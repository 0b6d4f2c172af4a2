//! Error types raised by the rotation engine.
//!
//! Load-time variants abort startup. Everything raised while applying a
//! transition is logged by the rotation loop and the loop keeps going.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotateError {
    /// The run configuration lists no collections at all.
    #[error("no image collections configured")]
    NoCollections,

    /// A configured collection directory holds no image files.
    #[error("collection {path:?} contains no images")]
    EmptyCollection { path: PathBuf },

    /// The host settings file could not be found at any probed location.
    #[error("terminal settings file not found (looked in: {probed:?})")]
    SettingsNotFound { probed: Vec<PathBuf> },

    /// A numbered profile points past the end of `profiles.list`.
    #[error("profile list-{index} does not exist (settings define {len} profile(s))")]
    ProfileIndexOutOfRange { index: usize, len: usize },

    /// The settings document is not JSON, or lacks the `profiles` object.
    #[error("malformed settings document {path:?}: {reason}")]
    MalformedSettingsDocument { path: PathBuf, reason: String },

    /// A collection directory or the settings file could not be read.
    #[error("failed to read {path:?}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The patched settings document could not be written back.
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RotateError {
    /// Returns a short stable label (snake_case) for use in log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            RotateError::NoCollections => "no_collections",
            RotateError::EmptyCollection { .. } => "empty_collection",
            RotateError::SettingsNotFound { .. } => "settings_not_found",
            RotateError::ProfileIndexOutOfRange { .. } => "profile_index_out_of_range",
            RotateError::MalformedSettingsDocument { .. } => "malformed_settings_document",
            RotateError::ReadFailure { .. } => "read_failure",
            RotateError::WriteFailure { .. } => "write_failure",
        }
    }

    /// True for failures the next timer tick or key press may clear on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RotateError::ReadFailure { .. } | RotateError::WriteFailure { .. }
        )
    }
}

pub type RotateResult<T> = Result<T, RotateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = RotateError::ProfileIndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.as_label(), "profile_index_out_of_range");
        assert_eq!(
            err.to_string(),
            "profile list-3 does not exist (settings define 2 profile(s))"
        );
    }

    #[test]
    fn test_read_failure_is_retryable() {
        let err = RotateError::ReadFailure {
            path: PathBuf::from("/gone"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_retryable());
        assert!(!RotateError::EmptyCollection { path: PathBuf::from("/x") }.is_retryable());
    }
}
