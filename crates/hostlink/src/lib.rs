//! Talk to browser native messaging hosts over length-prefixed JSON frames.
//!
//! Browsers hand WebExtensions a "native messaging" channel to a companion
//! process: each message is a JSON document prefixed on the wire by a
//! 4-byte length, exchanged over the companion's stdin/stdout. This crate
//! provides the browser side of that channel:
//!
//! - [`locate`] finds the companion's manifest in the platform's
//!   well-known directories and yields its executable path.
//! - [`connect`] (or [`launch`] with an explicit path) spawns the
//!   companion and binds a [`Connection`] to its stdio.
//! - [`Connection::send`] and [`Connection::receive`] exchange JSON
//!   values with guaranteed frame ordering; receives may carry deadlines.
//!
//! The blocking [`FrameReader`]/[`FrameWriter`] pair covers the other end
//! of the pipe, for implementing the companion process itself.
//!
//! ```no_run
//! use hostlink::{connect, Scope};
//!
//! # async fn demo() -> hostlink::Result<()> {
//! let conn = connect("com.example.myapp", Scope::ALL)?;
//! conn.send(&serde_json::json!({"cmd": "version"})).await?;
//! let reply = conn.receive().await?;
//! println!("companion says: {reply}");
//! conn.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub use hostlink_client::{connect, launch, spawn_host, ClientError, Connection, HostProcess};
pub use hostlink_frame::{
    decode_frame, encode_frame, FrameConfig, FrameError, FrameReader, FrameWriter,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use hostlink_manifest::{
    locate, locate_in_dirs, Browser, HostLocation, Manifest, ManifestError, Scope,
};

/// Result alias over the connection-level error type.
pub type Result<T> = std::result::Result<T, ClientError>;
