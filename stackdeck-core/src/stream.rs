//! Handle to a running subprocess output stream.
//!
//! A stream is a bounded queue of merged stdout/stderr lines plus a one-shot
//! completion slot carrying the exit error. The queue closing is the only
//! signal that the stream is over; the completion slot is read after that.

use tokio::sync::{mpsc, oneshot};

/// Identifies one launch so late results from an abandoned stream can be told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub u64);

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    /// `logs -f`: not exit-status aware.
    Logs,
    /// Lifecycle operation: the exit error is reported when the queue closes.
    Operation,
}

/// Opaque reference to the spawned process, enough to kill its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessRef {
    pub pid: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Line(String),
    Ended { error: Option<String> },
}

#[derive(Debug)]
pub struct StreamHandle {
    id: StreamId,
    kind: StreamKind,
    lines: mpsc::Receiver<String>,
    done: Option<oneshot::Receiver<Option<String>>>,
    process: Option<ProcessRef>,
}

impl StreamHandle {
    pub fn new(
        id: StreamId,
        kind: StreamKind,
        lines: mpsc::Receiver<String>,
        done: oneshot::Receiver<Option<String>>,
        process: Option<ProcessRef>,
    ) -> Self {
        Self {
            id,
            kind,
            lines,
            done: Some(done),
            process,
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn process(&self) -> Option<ProcessRef> {
        self.process
    }

    /// Wait for the next line, or for the end of the stream.
    ///
    /// Cancel safe: dropping the future before it resolves loses nothing.
    pub async fn next_event(&mut self) -> StreamEvent {
        if let Some(line) = self.lines.recv().await {
            return StreamEvent::Line(line);
        }

        let Some(done) = self.done.as_mut() else {
            return StreamEvent::Ended { error: None };
        };
        let result = done.await;
        self.done = None;

        let error = match (self.kind, result) {
            (StreamKind::Logs, _) => None,
            (StreamKind::Operation, Ok(error)) => error,
            (StreamKind::Operation, Err(_)) => {
                Some("operation ended without reporting a status".to_string())
            }
        };
        StreamEvent::Ended { error }
    }
}
