//! Killing a subprocess together with everything it spawned.
//!
//! Unix puts the child in its own process group and signals the group.
//! Windows walks the tree with `taskkill /T`, falling back to the top-level
//! process alone.

use tokio::process::Command;
use tracing::{debug, warn};

use stackdeck_core::stream::ProcessRef;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::ProcessGroup as PlatformTree;
#[cfg(windows)]
pub use windows::TaskKill as PlatformTree;

pub trait ProcessTree {
    /// Set up a command before spawn so its whole tree can be killed later.
    fn prepare(&self, cmd: &mut Command);

    /// Forcefully end the process and all of its descendants. Blocking.
    fn kill(&self, process: ProcessRef) -> std::io::Result<()>;
}

pub fn prepare(cmd: &mut Command) {
    PlatformTree.prepare(cmd);
}

/// Kill a tree off the event loop. Failures are logged, never returned.
pub async fn kill_tree(process: ProcessRef) {
    let result = tokio::task::spawn_blocking(move || PlatformTree.kill(process)).await;
    match result {
        Ok(Ok(())) => debug!(pid = process.pid, "process tree killed"),
        Ok(Err(e)) => warn!(pid = process.pid, error = %e, "failed to kill process tree"),
        Err(e) => warn!(pid = process.pid, error = %e, "kill task panicked"),
    }
}
