use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use stackdeck_core::reducer::Message;
use stackdeck_core::state::ViewMode;
use stackdeck_core::stream::{StreamId, StreamKind};
use stackdeck_core::task::Task;

use crate::backend::Backend;
use crate::{clipboard, interactive, process_tree};

/// Work that needs the terminal and therefore runs on the event loop itself.
#[derive(Debug, PartialEq, Eq)]
pub enum Interactive {
    Command {
        dir: Option<PathBuf>,
        args: Vec<String>,
        origin: ViewMode,
    },
    Config,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Spawned,
    Interactive(Interactive),
    Quit,
}

/// Runs tasks in the background and reports back over the message channel.
pub struct Executor {
    backend: Arc<dyn Backend>,
    tx: mpsc::UnboundedSender<Message>,
    kills: JoinSet<()>,
}

impl Executor {
    pub fn new(backend: Arc<dyn Backend>, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            backend,
            tx,
            kills: JoinSet::new(),
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // The loop is gone when this fails; nothing left to tell.
            let _ = tx.send(work.await);
        });
    }

    pub fn dispatch(&mut self, task: Task) -> Dispatch {
        debug!(task = task.label(), "dispatch");
        self.reap_kills();
        let backend = self.backend.clone();
        match task {
            Task::LoadProjects => self.spawn(async move {
                Message::ProjectsLoaded(backend.list_projects().await.map_err(|e| e.to_string()))
            }),
            Task::LoadDetail { root } => self.spawn(async move {
                let result = backend.describe(&root).await.map_err(|e| e.to_string());
                Message::DetailLoaded { root, result }
            }),
            Task::LoadRouterStatus => {
                self.spawn(async move { Message::RouterStatus(backend.router_status().await) })
            }
            Task::StartLogStream { id, root } => {
                let args = vec!["logs".to_string(), "-f".to_string()];
                self.start_stream(id, StreamKind::Logs, Some(root), args);
            }
            Task::StartOperation { id, dir, args } => {
                self.start_stream(id, StreamKind::Operation, dir, args);
            }
            Task::RunInteractive { dir, args, origin } => {
                return Dispatch::Interactive(Interactive::Command { dir, args, origin });
            }
            Task::RunConfig => return Dispatch::Interactive(Interactive::Config),
            Task::ToggleDebug { root } => self.spawn(async move {
                Message::DebugToggled(backend.toggle_debug(&root).await.map_err(|e| e.to_string()))
            }),
            Task::CopyToClipboard { text } => self.spawn(async move {
                Message::Clipboard(clipboard::copy(&text).await.map_err(|e| e.to_string()))
            }),
            Task::ScheduleTick { after } => self.spawn(async move {
                tokio::time::sleep(after).await;
                Message::Tick
            }),
            Task::ScheduleAutoReturn { id, after } => self.spawn(async move {
                tokio::time::sleep(after).await;
                Message::AutoReturn(id)
            }),
            Task::KillProcessTree(process) => {
                self.kills.spawn(process_tree::kill_tree(process));
            }
            Task::Quit => return Dispatch::Quit,
        }
        Dispatch::Spawned
    }

    /// Drop kills that already finished so the set only holds live ones.
    fn reap_kills(&mut self) {
        while self.kills.try_join_next().is_some() {}
    }

    fn start_stream(
        &self,
        id: StreamId,
        kind: StreamKind,
        dir: Option<PathBuf>,
        args: Vec<String>,
    ) {
        let backend = self.backend.clone();
        self.spawn(async move {
            match backend.stream(id, kind, dir.as_deref(), &args) {
                Ok(handle) => Message::StreamStarted(handle),
                Err(e) => {
                    warn!(stream = %id, ?args, error = %e, "failed to launch stream");
                    Message::StreamEnded {
                        id,
                        kind,
                        error: Some(e.to_string()),
                    }
                }
            }
        });
    }

    /// Run a terminal-owning task to completion and report the result.
    ///
    /// The caller must have released the terminal.
    pub async fn run_interactive(&self, run: Interactive) {
        let (origin, result) = match run {
            Interactive::Command { dir, args, origin } => (
                origin,
                interactive::run(self.backend.as_ref(), dir.as_deref(), &args).await,
            ),
            Interactive::Config => (
                ViewMode::Dashboard,
                interactive::run_config(self.backend.as_ref()).await,
            ),
        };
        if let Err(e) = &result {
            warn!(error = %e, "interactive run failed");
        }
        let _ = self.tx.send(Message::InteractiveFinished {
            origin,
            result: result.map_err(|e| e.to_string()),
        });
    }

    /// Wait for outstanding process-tree kills.
    pub async fn shutdown(&mut self) {
        while self.kills.join_next().await.is_some() {}
    }
}
