use std::path::PathBuf;

/// Errors that can occur while locating or parsing a host manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// No enabled search directory contains a manifest for the app.
    #[error("no native messaging manifest found for app {app:?}")]
    NotFound { app: String },

    /// A manifest file exists but cannot be used.
    #[error("invalid manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// An I/O error occurred while reading a manifest file.
    #[error("failed to read manifest at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
