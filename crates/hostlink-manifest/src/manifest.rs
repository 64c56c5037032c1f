use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};

/// Transport declared by every stdio-based native messaging manifest.
pub const TRANSPORT_STDIO: &str = "stdio";

/// A native messaging host manifest.
///
/// The on-disk format is shared across browser families; Firefox lists
/// `allowed_extensions`, Chrome and Chromium list `allowed_origins`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub name: String,
    /// Absolute path to the companion executable.
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub transport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,
}

impl Manifest {
    /// Load and validate a manifest from a file.
    ///
    /// Fails with `InvalidManifest` if the file is not valid JSON, lacks a
    /// usable `path`, or declares a transport other than `"stdio"`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest: Manifest =
            serde_json::from_str(&contents).map_err(|err| ManifestError::InvalidManifest {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        if manifest.transport != TRANSPORT_STDIO {
            return Err(ManifestError::InvalidManifest {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported transport {:?} (expected {TRANSPORT_STDIO:?})",
                    manifest.transport
                ),
            });
        }

        if manifest.path.as_os_str().is_empty() {
            return Err(ManifestError::InvalidManifest {
                path: path.to_path_buf(),
                reason: "empty executable path".to_string(),
            });
        }

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hostlink-manifest-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("app.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_valid_manifest() {
        let path = write_temp(
            "valid",
            r#"{
                "name": "myapp",
                "description": "test host",
                "path": "/bin/myapp",
                "type": "stdio",
                "allowed_extensions": ["app@example.org"]
            }"#,
        );

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.name, "myapp");
        assert_eq!(manifest.path, PathBuf::from("/bin/myapp"));
        assert_eq!(manifest.allowed_extensions, vec!["app@example.org"]);
        assert!(manifest.allowed_origins.is_empty());
    }

    #[test]
    fn load_rejects_bad_json() {
        let path = write_temp("badjson", "{ not json");
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    #[test]
    fn load_rejects_missing_path_field() {
        let path = write_temp("nopath", r#"{"name": "myapp", "type": "stdio"}"#);
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    #[test]
    fn load_rejects_non_stdio_transport() {
        let path = write_temp(
            "badtype",
            r#"{"name": "myapp", "path": "/bin/myapp", "type": "socket"}"#,
        );
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let path = write_temp(
            "extra",
            r#"{"name": "myapp", "path": "/bin/myapp", "type": "stdio", "future_field": 7}"#,
        );
        assert!(Manifest::load(&path).is_ok());
    }
}
