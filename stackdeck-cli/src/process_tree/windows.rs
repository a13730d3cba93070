use std::process::Stdio;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::process::Command;
use tracing::warn;

use stackdeck_core::stream::ProcessRef;

use super::ProcessTree;

/// Tree kill through `taskkill /T /F`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskKill;

impl ProcessTree for TaskKill {
    fn prepare(&self, _cmd: &mut Command) {}

    fn kill(&self, process: ProcessRef) -> std::io::Result<()> {
        let spawned = std::process::Command::new("taskkill")
            .args(["/T", "/F", "/PID", &process.pid.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match spawned {
            // A non-zero status usually means the tree already exited.
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(pid = process.pid, error = %e, "taskkill unavailable, killing top-level process only");
                kill_single(process.pid);
                Ok(())
            }
        }
    }
}

fn kill_single(pid: u32) {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    if let Some(process) = sys.process(Pid::from_u32(pid)) {
        process.kill();
    }
}
