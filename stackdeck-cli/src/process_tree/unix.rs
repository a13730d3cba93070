use tokio::process::Command;

use stackdeck_core::stream::ProcessRef;

use super::ProcessTree;

/// The child leads a new process group; killing the group reaches every descendant.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessGroup;

impl ProcessTree for ProcessGroup {
    fn prepare(&self, cmd: &mut Command) {
        cmd.process_group(0);
    }

    fn kill(&self, process: ProcessRef) -> std::io::Result<()> {
        let pgid = process.pid as libc::pid_t;
        if pgid <= 0 {
            return Ok(());
        }
        let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        // Already gone.
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use std::process::Stdio;
    use std::time::Duration;

    use sysinfo::{Pid, ProcessesToUpdate, System};

    use super::*;

    fn alive(pid: u32) -> bool {
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
        match sys.process(Pid::from_u32(pid)) {
            // A killed-but-unreaped child shows up as a zombie.
            Some(p) => !matches!(p.status(), sysinfo::ProcessStatus::Zombie),
            None => false,
        }
    }

    #[tokio::test]
    async fn test_kill_reaches_grandchild() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg("sleep 60 & echo $!; wait")
            .stdout(Stdio::piped())
            .stdin(Stdio::null());
        ProcessGroup.prepare(&mut cmd);
        let mut child = cmd.spawn().unwrap();
        let pid = child.id().unwrap();

        let mut stdout = tokio::io::BufReader::new(child.stdout.take().unwrap());
        let mut line = String::new();
        tokio::io::AsyncBufReadExt::read_line(&mut stdout, &mut line)
            .await
            .unwrap();
        let grandchild: u32 = line.trim().parse().unwrap();
        assert!(alive(grandchild));

        ProcessGroup.kill(ProcessRef { pid }).unwrap();
        let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .unwrap()
            .unwrap();
        assert!(!status.success());

        let mut gone = false;
        for _ in 0..50 {
            if !alive(grandchild) {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(gone, "grandchild {} survived the group kill", grandchild);
    }

    #[test]
    fn test_kill_missing_group_is_ok() {
        // Far above any default pid_max.
        assert!(ProcessGroup.kill(ProcessRef { pid: 4_000_000 }).is_ok());
    }
}
