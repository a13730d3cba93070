use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use stackdeck_core::stream::{ProcessRef, StreamHandle, StreamId, StreamKind};

use crate::error::TaskError;
use crate::process_tree;

/// Line queue depth shared by both output pipes.
const LINE_QUEUE: usize = 100;

/// Spawn `cmd` with stdout and stderr merged into one line stream.
///
/// The finalizer publishes the exit result and only then drops the last
/// sender, so the completion slot is always filled once the queue has closed.
pub fn spawn_stream(
    id: StreamId,
    kind: StreamKind,
    mut cmd: Command,
) -> Result<StreamHandle, TaskError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());
    process_tree::prepare(&mut cmd);

    let mut child = cmd.spawn().map_err(|e| TaskError::spawn(&program, e))?;
    let process = child.id().map(|pid| ProcessRef { pid });

    let (line_tx, line_rx) = mpsc::channel(LINE_QUEUE);
    let (done_tx, done_rx) = oneshot::channel();

    let stdout = child.stdout.take().map(|out| tokio::spawn(scan(out, line_tx.clone())));
    let stderr = child.stderr.take().map(|err| tokio::spawn(scan(err, line_tx.clone())));

    tokio::spawn(async move {
        let _keep_open = line_tx;
        for scanner in [stdout, stderr].into_iter().flatten() {
            let _ = scanner.await;
        }
        let error = match child.wait().await {
            Ok(status) => TaskError::check(status).err().map(|e| e.to_string()),
            Err(e) => Some(TaskError::Io(e).to_string()),
        };
        debug!(stream = %id, ?error, "stream process exited");
        let _ = done_tx.send(error);
    });

    Ok(StreamHandle::new(id, kind, line_rx, done_rx, process))
}

/// Forward lines from one pipe until EOF or until the reader side is gone.
async fn scan<R>(pipe: R, tx: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use stackdeck_core::stream::StreamEvent;

    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    async fn drain(mut handle: StreamHandle) -> (Vec<String>, Option<String>) {
        let mut lines = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(10), handle.next_event())
                .await
                .unwrap();
            match event {
                StreamEvent::Line(line) => lines.push(line),
                StreamEvent::Ended { error } => return (lines, error),
            }
        }
    }

    #[tokio::test]
    async fn test_merges_both_pipes_and_reports_exit() {
        let handle = spawn_stream(
            StreamId(1),
            StreamKind::Operation,
            sh("echo one; echo two >&2; echo three; exit 3"),
        )
        .unwrap();
        assert!(handle.process().is_some());

        let (lines, error) = drain(handle).await;
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"two".to_string()));
        let one = lines.iter().position(|l| l == "one").unwrap();
        let three = lines.iter().position(|l| l == "three").unwrap();
        assert!(one < three, "stdout order lost: {:?}", lines);
        assert!(error.unwrap().contains('3'));
    }

    #[tokio::test]
    async fn test_successful_operation_has_no_error() {
        let handle = spawn_stream(StreamId(2), StreamKind::Operation, sh("echo done")).unwrap();
        let (lines, error) = drain(handle).await;
        assert_eq!(lines, vec!["done"]);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_logs_ignore_exit_status() {
        let handle = spawn_stream(StreamId(3), StreamKind::Logs, sh("echo tail; exit 1")).unwrap();
        let (lines, error) = drain(handle).await;
        assert_eq!(lines, vec!["tail"]);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = spawn_stream(
            StreamId(4),
            StreamKind::Operation,
            Command::new("stackdeck-no-such-program"),
        );
        assert!(matches!(result, Err(TaskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_kill_ends_stream() {
        let mut handle =
            spawn_stream(StreamId(5), StreamKind::Operation, sh("echo up; sleep 60")).unwrap();
        assert_eq!(handle.next_event().await, StreamEvent::Line("up".into()));

        process_tree::kill_tree(handle.process().unwrap()).await;
        let event = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
            .await
            .unwrap();
        assert!(matches!(event, StreamEvent::Ended { error: Some(_) }));
    }

    #[tokio::test]
    async fn test_many_lines_keep_order() {
        let handle = spawn_stream(
            StreamId(6),
            StreamKind::Logs,
            sh("i=1; while [ $i -le 300 ]; do echo $i; i=$((i+1)); done"),
        )
        .unwrap();
        let (lines, _) = drain(handle).await;
        let numbers: Vec<u32> = lines.iter().map(|l| l.parse().unwrap()).collect();
        assert_eq!(numbers, (1..=300).collect::<Vec<_>>());
    }
}
