//! Error types for packaging operations.

use thiserror::Error;

/// Errors that can occur while loading, transforming, or archiving.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Packaging configuration could not be parsed.
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Manifest document is well-formed JSON but has the wrong shape.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A key the platform transform expects to remove is absent.
    #[error("Manifest key not found: {key}")]
    MissingKey { key: String },

    /// A static asset could not be read from disk.
    #[error("Asset not found: {path}: {source}")]
    AssetNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Missing required file in an archive.
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// Archived content differs from its source.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Archive holds a different number of entries than were written.
    #[error("Entry count mismatch for {path}: expected {expected}, got {actual}")]
    EntryCountMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },

    /// Packaging configuration is unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
