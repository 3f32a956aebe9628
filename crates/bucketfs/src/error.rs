//! Error types for Bucketfs
//!
//! This module provides error types for tree building and path lookup with the
//! following design goals:
//! - Lookup failures name the exact sub-path where resolution stopped
//! - Store failures pass through unchanged
//! - Clear categorization for programmatic handling

use thiserror::Error;

/// Result type alias using Bucketfs's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason attached to a failed path lookup.
pub const PATH_NOT_FOUND: &str = "path not found";
/// Reason attached to a failed single-level file lookup.
pub const FILE_NOT_FOUND: &str = "file not found";
/// Reason attached to a failed single-level folder lookup.
pub const FOLDER_NOT_FOUND: &str = "folder not found";

/// Bucketfs error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment or child name is absent.
    ///
    /// `path` is the sub-path at which resolution diverged (relative to the
    /// tree root, no leading slash), never the full requested path.
    #[error("cannot find {path}: {reason}")]
    NotFound { path: String, reason: String },

    /// A listing entry claims a key is both a file and a folder prefix.
    #[error("structural conflict: {0} is both a file and a folder")]
    StructuralConflict(String),

    /// The listing source returned a key outside the filesystem's root prefix.
    #[error("key {key} is outside prefix {prefix}")]
    OutsidePrefix { key: String, prefix: String },

    /// Failure reported by the listing source or write sink.
    #[error("store error: {0}")]
    Listing(String),

    /// I/O error from a store implementation.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid filesystem configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a not-found error for `path` with the given reason.
    pub fn not_found(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The path a lookup failed at, if this is a lookup failure.
    pub fn missing_path(&self) -> Option<&str> {
        match self {
            Self::NotFound { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("a/c.txt", PATH_NOT_FOUND);
        assert_eq!(err.to_string(), "cannot find a/c.txt: path not found");
        assert!(err.is_not_found());
        assert_eq!(err.missing_path(), Some("a/c.txt"));
    }

    #[test]
    fn test_conflict_is_not_lookup_failure() {
        let err = Error::StructuralConflict("a/b".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.missing_path(), None);
    }

    #[test]
    fn test_io_error_passes_through() {
        let err: Error = std::io::Error::other("throttled").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "io error: throttled");
    }
}
