//! Native messaging host manifest discovery and parsing.
//!
//! Browsers register native messaging companions through small JSON
//! manifest files in well-known, platform-specific directories. Given a
//! logical app name and a browser-family search scope, this crate finds
//! the first matching manifest and yields the companion executable's path
//! together with the family that registered it.

pub mod browser;
pub mod error;
pub mod locate;
pub mod manifest;

pub use browser::{Browser, Scope};
pub use error::{ManifestError, Result};
pub use locate::{locate, locate_in_dirs, HostLocation};
pub use manifest::Manifest;
