use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use hostlink_frame::FrameConfig;

use crate::connection::Connection;
use crate::error::{ClientError, Result};

/// A spawned companion process with its stdio pipes split out.
#[derive(Debug)]
pub struct HostProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// Spawn a companion executable with piped stdin/stdout.
///
/// Stderr is inherited so the companion's diagnostics land wherever the
/// caller's do. Must be called from within a Tokio runtime.
pub fn spawn_host(executable: &Path) -> Result<HostProcess> {
    debug!(?executable, "spawning companion process");

    let spawn_err = |source: std::io::Error| ClientError::Spawn {
        path: executable.to_path_buf(),
        source,
    };

    let mut child = Command::new(executable)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_err)?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| spawn_err(std::io::Error::other("stdin pipe not captured")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_err(std::io::Error::other("stdout pipe not captured")))?;

    Ok(HostProcess {
        child,
        stdin,
        stdout,
    })
}

/// Spawn a companion executable and bind a [`Connection`] to its stdio.
pub fn launch(executable: &Path) -> Result<Connection> {
    let process = spawn_host(executable)?;
    Ok(Connection::from_process(process, FrameConfig::default()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_missing_executable_fails() {
        let err = spawn_host(Path::new("/nonexistent/hostlink-test-binary")).unwrap_err();
        assert!(matches!(err, ClientError::Spawn { .. }));
    }

    #[tokio::test]
    async fn spawn_real_executable_yields_pipes() {
        let process = spawn_host(Path::new("/bin/cat")).expect("cat should spawn");
        drop(process); // kill_on_drop reaps it
    }
}
