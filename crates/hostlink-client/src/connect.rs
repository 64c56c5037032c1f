use hostlink_manifest::{locate, Scope};
use tracing::debug;

use crate::connection::Connection;
use crate::error::Result;
use crate::launcher::launch;

/// Connect to the native messaging companion registered as `app_name`.
///
/// Locates the manifest within `scope`, spawns the executable it names,
/// and binds a [`Connection`] to its stdio. Must be called from within a
/// Tokio runtime.
pub fn connect(app_name: &str, scope: Scope) -> Result<Connection> {
    let location = locate(app_name, scope)?;
    debug!(
        executable = ?location.executable,
        browser = %location.browser,
        "connecting to native messaging host"
    );
    launch(&location.executable)
}
