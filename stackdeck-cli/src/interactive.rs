//! Subcommands that take over the terminal while they run.
//!
//! The caller is responsible for leaving raw mode and the alternate screen
//! first, and for restoring both afterwards.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

use stackdeck_core::tool_output;

use crate::backend::Backend;
use crate::error::TaskError;

pub async fn run(backend: &dyn Backend, dir: Option<&Path>, args: &[String]) -> Result<(), TaskError> {
    info!(tool = backend.name(), ?args, "interactive run");
    let status = backend
        .command(dir, args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| TaskError::spawn(backend.name(), e))?;
    TaskError::check(status)
}

/// Run the interactive configuration flow.
///
/// Stderr goes to the terminal and into a buffer; a failure reports the last
/// non-empty stderr line.
pub async fn run_config(backend: &dyn Backend) -> Result<(), TaskError> {
    info!(tool = backend.name(), "interactive config");
    let mut child = backend
        .command(None, &["config".to_string()])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TaskError::spawn(backend.name(), e))?;

    let mut captured = Vec::new();
    if let Some(mut pipe) = child.stderr.take() {
        let mut terminal = tokio::io::stderr();
        let mut buf = [0u8; 4096];
        loop {
            let n = pipe.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            terminal.write_all(&buf[..n]).await?;
            captured.extend_from_slice(&buf[..n]);
        }
        terminal.flush().await?;
    }

    let status = child.wait().await?;
    if status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&captured);
    match tool_output::last_nonempty_line(&stderr) {
        Some(line) => Err(TaskError::Failed(line.to_string())),
        None => Err(TaskError::ExitStatus { status }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use stackdeck_core::config::RouterProbe;

    use super::*;
    use crate::backend::ToolBackend;

    fn fake_tool(dir: &Path, body: &str) -> ToolBackend {
        let path = dir.join("fake-tool");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        ToolBackend::new(path.to_string_lossy(), "DDEV_NO_TUI", RouterProbe::default())
    }

    #[tokio::test]
    async fn test_config_failure_uses_last_stderr_line() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "echo 'Creating config' >&2; echo 'Error: invalid docroot' >&2; echo >&2; exit 1",
        );
        let err = run_config(&tool).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: invalid docroot");
    }

    #[tokio::test]
    async fn test_config_silent_failure_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "exit 4");
        let err = run_config(&tool).await.unwrap_err();
        assert!(matches!(err, TaskError::ExitStatus { .. }));
    }

    #[tokio::test]
    async fn test_run_passes_args_and_marker() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "[ \"$1\" = launch ] && [ \"$2\" = -m ] && [ \"$DDEV_NO_TUI\" = true ] && [ \"$(pwd)\" = \"$EXPECT_DIR\" ]",
        );
        let project = tempfile::tempdir().unwrap();
        let project_dir = project.path().canonicalize().unwrap();
        // SAFETY: this test is the only reader of EXPECT_DIR.
        unsafe { std::env::set_var("EXPECT_DIR", &project_dir) };

        let args = vec!["launch".to_string(), "-m".to_string()];
        run(&tool, Some(&project_dir), &args).await.unwrap();
        assert!(run(&tool, None, &args).await.is_err());
    }
}
