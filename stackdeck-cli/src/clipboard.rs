use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::TaskError;

/// Linux helpers in order of preference: Wayland first, then X11.
const LINUX_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[derive(Debug, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: PathBuf,
    pub args: &'static [&'static str],
}

/// Pick the clipboard helper for `os`, searching `path_dirs` on Linux.
pub fn locate(os: &str, path_dirs: &[PathBuf]) -> Result<ClipboardTool, TaskError> {
    match os {
        "macos" => Ok(ClipboardTool {
            program: PathBuf::from("pbcopy"),
            args: &[],
        }),
        "linux" => LINUX_TOOLS
            .iter()
            .find_map(|&(name, args)| {
                find_executable(name, path_dirs).map(|program| ClipboardTool { program, args })
            })
            .ok_or(TaskError::NoClipboardTool),
        other => Err(TaskError::UnsupportedPlatform {
            os: other.to_string(),
        }),
    }
}

fn find_executable(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn path_dirs() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default()
}

/// Copy `text` to the system clipboard.
pub async fn copy(text: &str) -> Result<(), TaskError> {
    let tool = locate(std::env::consts::OS, &path_dirs())?;
    let program = tool.program.to_string_lossy().into_owned();
    debug!(%program, "copying to clipboard");

    let mut child = Command::new(&tool.program)
        .args(tool.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| TaskError::spawn(&program, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
        stdin.shutdown().await?;
    }
    TaskError::check(child.wait().await?)
}
