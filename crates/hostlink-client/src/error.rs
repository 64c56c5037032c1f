use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur in connection operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Manifest lookup failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] hostlink_manifest::ManifestError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] hostlink_frame::FrameError),

    /// The companion process could not be spawned.
    #[error("failed to spawn companion {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a frame to the companion's stdin failed.
    #[error("write to companion failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// An outbound value could not be serialized to JSON.
    #[error("failed to serialize outbound message: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A complete frame arrived whose payload is not valid JSON.
    ///
    /// Reported to the one reader the frame was destined for; frame
    /// boundary tracking is unaffected because the length prefix is
    /// trusted independently of payload validity.
    #[error("malformed frame payload: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    /// A receive's deadline expired before a frame completed.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The connection is closed; no further frames will be produced.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
