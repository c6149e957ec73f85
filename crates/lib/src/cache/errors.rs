//! Error types for the local cache.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the local cache.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("Cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a JSON object of strings.
    #[error("Corrupt cache file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl CacheError {
    /// Check if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, CacheError::Io { .. })
    }

    /// Check if the cache contents could not be parsed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, CacheError::Corrupt { .. })
    }
}

// Conversion from CacheError to the main Error type
impl From<CacheError> for crate::Error {
    fn from(err: CacheError) -> Self {
        crate::Error::Cache(err)
    }
}
