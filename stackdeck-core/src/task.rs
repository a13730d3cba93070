use std::path::PathBuf;
use std::time::Duration;

use crate::state::ViewMode;
use crate::stream::{ProcessRef, StreamId};

/// A unit of work requested by the state machine.
///
/// Tasks are plain data; the executor turns each into a background job that
/// reports back with one or more `Message`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    LoadProjects,
    LoadDetail {
        root: PathBuf,
    },
    LoadRouterStatus,
    /// Follow `logs -f` for a project.
    StartLogStream {
        id: StreamId,
        root: PathBuf,
    },
    /// Run a lifecycle subcommand with exit-status tracking.
    StartOperation {
        id: StreamId,
        dir: Option<PathBuf>,
        args: Vec<String>,
    },
    /// Hand the terminal to a subcommand (launch, ssh, xhgui).
    RunInteractive {
        dir: Option<PathBuf>,
        args: Vec<String>,
        origin: ViewMode,
    },
    /// Interactive `config`; stderr is captured for the error message.
    RunConfig,
    ToggleDebug {
        root: PathBuf,
    },
    CopyToClipboard {
        text: String,
    },
    ScheduleTick {
        after: Duration,
    },
    /// Leave the finished operation `id` after the delay.
    ScheduleAutoReturn {
        id: StreamId,
        after: Duration,
    },
    KillProcessTree(ProcessRef),
    Quit,
}

impl Task {
    pub fn operation(id: StreamId, dir: Option<PathBuf>, args: &[&str]) -> Self {
        Task::StartOperation {
            id,
            dir,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn interactive(dir: Option<PathBuf>, args: &[&str], origin: ViewMode) -> Self {
        Task::RunInteractive {
            dir,
            args: args.iter().map(|a| a.to_string()).collect(),
            origin,
        }
    }

    /// Short name for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Task::LoadProjects => "load-projects",
            Task::LoadDetail { .. } => "load-detail",
            Task::LoadRouterStatus => "load-router-status",
            Task::StartLogStream { .. } => "start-log-stream",
            Task::StartOperation { .. } => "start-operation",
            Task::RunInteractive { .. } => "run-interactive",
            Task::RunConfig => "run-config",
            Task::ToggleDebug { .. } => "toggle-debug",
            Task::CopyToClipboard { .. } => "copy-to-clipboard",
            Task::ScheduleTick { .. } => "schedule-tick",
            Task::ScheduleAutoReturn { .. } => "schedule-auto-return",
            Task::KillProcessTree(_) => "kill-process-tree",
            Task::Quit => "quit",
        }
    }
}
