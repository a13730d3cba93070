use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures of background tasks. Rendered to a string before reaching the state machine.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("project directory no longer exists: {}", root.display())]
    ProjectMissing { root: PathBuf },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{status}")]
    ExitStatus { status: ExitStatus },

    /// Non-zero exit with a message taken from the tool's own stderr.
    #[error("{0}")]
    Failed(String),

    #[error("unexpected output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no clipboard tool found (install xclip, xsel, or wl-copy)")]
    NoClipboardTool,

    #[error("clipboard not supported on {os}")]
    UnsupportedPlatform { os: String },

    #[error("{program} not found in PATH")]
    NotFound { program: String },
}

impl TaskError {
    pub fn spawn(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return TaskError::NotFound {
                program: program.to_string(),
            };
        }
        TaskError::Spawn {
            program: program.to_string(),
            source,
        }
    }

    /// `Ok(())` for a successful exit, `ExitStatus` otherwise.
    pub fn check(status: ExitStatus) -> Result<(), TaskError> {
        if status.success() {
            Ok(())
        } else {
            Err(TaskError::ExitStatus { status })
        }
    }
}
