//! Browser-side connection engine for native messaging hosts.
//!
//! This is the "just works" layer. Locate a companion through its manifest,
//! spawn it, then exchange length-prefixed JSON frames over its stdio with
//! ordered, timeout-aware receives.

pub mod connect;
pub mod connection;
pub mod error;
pub mod launcher;

pub use connect::connect;
pub use connection::Connection;
pub use error::{ClientError, Result};
pub use launcher::{launch, spawn_host, HostProcess};
