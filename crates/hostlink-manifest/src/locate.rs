use std::path::PathBuf;

use tracing::debug;

use crate::browser::{Browser, Scope};
use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

/// A located companion: where its executable lives and which browser
/// family registered it.
#[derive(Debug, Clone, PartialEq)]
pub struct HostLocation {
    /// Path to the companion executable, as declared by the manifest.
    pub executable: PathBuf,
    /// The family whose manifest directory won the search.
    pub browser: Browser,
    /// The full parsed manifest, for callers that need the metadata.
    pub manifest: Manifest,
}

/// Manifest directories for a family on this platform, in search order.
///
/// Firefox keeps a system directory and a per-user directory; Chrome and
/// Chromium each keep a single system directory.
#[cfg(target_os = "linux")]
pub fn candidate_dirs(browser: Browser) -> Vec<PathBuf> {
    match browser {
        Browser::Firefox => {
            let mut dirs = vec![PathBuf::from("/usr/lib/mozilla/native-messaging-hosts")];
            if let Some(home) = std::env::var_os("HOME") {
                dirs.push(PathBuf::from(home).join(".mozilla/native-messaging-hosts"));
            }
            dirs
        }
        Browser::Chrome => vec![PathBuf::from("/etc/opt/chrome/native-messaging-hosts")],
        Browser::Chromium => vec![PathBuf::from("/etc/chromium/native-messaging-hosts")],
    }
}

#[cfg(target_os = "macos")]
pub fn candidate_dirs(browser: Browser) -> Vec<PathBuf> {
    let (system, per_user) = match browser {
        Browser::Firefox => (
            "/Library/Application Support/Mozilla/NativeMessagingHosts",
            Some("Library/Application Support/Mozilla/NativeMessagingHosts"),
        ),
        Browser::Chrome => (
            "/Library/Google/Chrome/NativeMessagingHosts",
            None,
        ),
        Browser::Chromium => (
            "/Library/Application Support/Chromium/NativeMessagingHosts",
            None,
        ),
    };

    let mut dirs = vec![PathBuf::from(system)];
    if let Some(per_user) = per_user {
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join(per_user));
        }
    }
    dirs
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn candidate_dirs(_browser: Browser) -> Vec<PathBuf> {
    Vec::new()
}

/// Locate the manifest for `app_name` within `scope` using this platform's
/// well-known directories.
///
/// The first directory containing a regular file named `<app_name>.json`
/// wins; ties are broken by search order, never by file freshness. A
/// missing file just moves the search to the next candidate, but a file
/// that exists and fails to parse terminates the search with
/// `InvalidManifest`.
pub fn locate(app_name: &str, scope: Scope) -> Result<HostLocation> {
    let dirs: Vec<(Browser, PathBuf)> = Browser::SEARCH_ORDER
        .into_iter()
        .filter(|browser| scope.contains(*browser))
        .flat_map(|browser| candidate_dirs(browser).into_iter().map(move |d| (browser, d)))
        .collect();

    locate_in_dirs(app_name, &dirs)
}

/// Locate the manifest for `app_name` in an explicit list of
/// `(family, directory)` candidates, in order.
///
/// `locate` delegates here with the platform defaults; tests and embedders
/// with non-standard layouts can call it directly.
pub fn locate_in_dirs(app_name: &str, dirs: &[(Browser, PathBuf)]) -> Result<HostLocation> {
    let file_name = format!("{app_name}.json");

    for (browser, dir) in dirs {
        let path = dir.join(&file_name);
        if !path.is_file() {
            continue;
        }

        debug!(?path, %browser, "found native messaging manifest");
        let manifest = Manifest::load(&path)?;
        return Ok(HostLocation {
            executable: manifest.path.clone(),
            browser: *browser,
            manifest,
        });
    }

    debug!(app = app_name, "no manifest in any enabled directory");
    Err(ManifestError::NotFound {
        app: app_name.to_string(),
    })
}
