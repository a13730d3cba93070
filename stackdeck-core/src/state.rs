use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use crate::filter::FilterState;
use crate::model::{ProjectDetail, ProjectSummary};
use crate::stream::{StreamHandle, StreamId};

/// Retained line limit for logs/operation output.
pub const OUTPUT_CAP: usize = 1000;
/// Lines kept after the cap is exceeded.
pub const OUTPUT_KEEP: usize = 500;

/// Status text shown while a manual refresh is in flight.
pub const STATUS_REFRESHING: &str = "Refreshing...";
pub const STATUS_OPERATION_COMPLETED: &str = "Operation completed";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    lines: VecDeque<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line; past `OUTPUT_CAP` only the newest `OUTPUT_KEEP` survive.
    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        if self.lines.len() > OUTPUT_CAP {
            let excess = self.lines.len() - OUTPUT_KEEP;
            self.lines.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(String::as_str)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    Dashboard,
    Detail,
    Logs,
    Operation,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Dashboard => "dashboard",
            ViewMode::Detail => "detail",
            ViewMode::Logs => "logs",
            ViewMode::Operation => "operation",
        }
    }
}

/// Bulk or destructive actions that need a second key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    StartAll,
    StopAll,
    Poweroff,
}

impl ConfirmAction {
    pub fn prompt(&self, project_count: usize) -> String {
        match self {
            ConfirmAction::StartAll => format!(
                "Start all {} projects? (y to confirm, any key to cancel)",
                project_count
            ),
            ConfirmAction::StopAll => format!(
                "Stop all {} projects? (y to confirm, any key to cancel)",
                project_count
            ),
            ConfirmAction::Poweroff => {
                "Poweroff all projects and containers? (y to confirm, any key to cancel)".into()
            }
        }
    }
}

/// Where a launched stream currently is in its life.
#[derive(Debug)]
pub enum StreamSlot {
    /// Launch requested, `StreamStarted` not yet seen.
    Pending(StreamId),
    Live(StreamHandle),
    Closed,
}

impl StreamSlot {
    pub fn is_live(&self) -> bool {
        matches!(self, StreamSlot::Live(_))
    }

    pub fn expects(&self, id: StreamId) -> bool {
        match self {
            StreamSlot::Pending(pending) => *pending == id,
            StreamSlot::Live(handle) => handle.id() == id,
            StreamSlot::Closed => false,
        }
    }

    pub fn handle_mut(&mut self) -> Option<&mut StreamHandle> {
        match self {
            StreamSlot::Live(handle) => Some(handle),
            _ => None,
        }
    }

    /// Take the live handle out, leaving the slot closed.
    pub fn take(&mut self) -> Option<StreamHandle> {
        match std::mem::replace(self, StreamSlot::Closed) {
            StreamSlot::Live(handle) => Some(handle),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
    pub root: PathBuf,
    pub name: String,
    pub detail: Option<ProjectDetail>,
    pub loading: bool,
    pub scroll: u16,
}

impl DetailView {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            detail: None,
            loading: true,
            scroll: 0,
        }
    }
}

#[derive(Debug)]
pub struct LogsView {
    /// The detail view to go back to.
    pub detail: DetailView,
    pub output: OutputBuffer,
    pub stream: StreamSlot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationState {
    pub name: String,
    pub done: bool,
    pub error: Option<String>,
    pub return_view: ViewMode,
}

#[derive(Debug)]
pub struct OperationView {
    /// The launch this view belongs to.
    pub id: StreamId,
    pub operation: OperationState,
    pub output: OutputBuffer,
    pub stream: StreamSlot,
    /// Set when launched from the detail view; restored on return.
    pub origin: Option<DetailView>,
}

impl OperationView {
    pub fn new(name: impl Into<String>, id: StreamId, origin: Option<DetailView>) -> Self {
        let return_view = if origin.is_some() {
            ViewMode::Detail
        } else {
            ViewMode::Dashboard
        };
        Self {
            id,
            operation: OperationState {
                name: name.into(),
                done: false,
                error: None,
                return_view,
            },
            output: OutputBuffer::new(),
            stream: StreamSlot::Pending(id),
            origin,
        }
    }

    /// The view to restore when leaving the operation.
    pub fn into_return_view(self) -> View {
        match self.origin {
            Some(detail) => View::Detail(detail),
            None => View::Dashboard,
        }
    }
}

/// The active screen and its per-screen payload.
#[derive(Debug, Default)]
pub enum View {
    #[default]
    Dashboard,
    Detail(DetailView),
    Logs(LogsView),
    Operation(OperationView),
}

impl View {
    pub fn mode(&self) -> ViewMode {
        match self {
            View::Dashboard => ViewMode::Dashboard,
            View::Detail(_) => ViewMode::Detail,
            View::Logs(_) => ViewMode::Logs,
            View::Operation(_) => ViewMode::Operation,
        }
    }

    /// The detail snapshot reachable from this view, wherever it is parked.
    pub fn detail_view(&self) -> Option<&DetailView> {
        match self {
            View::Detail(detail) => Some(detail),
            View::Logs(logs) => Some(&logs.detail),
            View::Operation(op) => op.origin.as_ref(),
            View::Dashboard => None,
        }
    }

    pub fn detail_view_mut(&mut self) -> Option<&mut DetailView> {
        match self {
            View::Detail(detail) => Some(detail),
            View::Logs(logs) => Some(&mut logs.detail),
            View::Operation(op) => op.origin.as_mut(),
            View::Dashboard => None,
        }
    }

    pub fn stream_slot_mut(&mut self) -> Option<&mut StreamSlot> {
        match self {
            View::Logs(logs) => Some(&mut logs.stream),
            View::Operation(op) => Some(&mut op.stream),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&OutputBuffer> {
        match self {
            View::Logs(logs) => Some(&logs.output),
            View::Operation(op) => Some(&op.output),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub refresh_interval: Duration,
    pub auto_return_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            auto_return_delay: Duration::from_secs(2),
        }
    }
}

/// Everything the dashboard knows. Mutated only by `reducer::update`.
#[derive(Debug)]
pub struct DashboardState {
    pub projects: Vec<ProjectSummary>,
    pub load_error: Option<String>,
    pub loading: bool,
    pub cursor: usize,
    pub filter: FilterState,
    pub confirmation: Option<ConfirmAction>,
    pub show_help: bool,
    pub router_status: String,
    pub status: String,
    pub viewport: Viewport,
    pub view: View,
    pub timings: Timings,
    next_stream: u64,
}

impl DashboardState {
    pub fn new(timings: Timings) -> Self {
        Self {
            projects: Vec::new(),
            load_error: None,
            loading: true,
            cursor: 0,
            filter: FilterState::new(),
            confirmation: None,
            show_help: false,
            router_status: String::new(),
            status: String::new(),
            viewport: Viewport::default(),
            view: View::Dashboard,
            timings,
            next_stream: 0,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    pub fn filtered_projects(&self) -> Vec<&ProjectSummary> {
        self.filter.apply(&self.projects)
    }

    pub fn selected_project(&self) -> Option<&ProjectSummary> {
        self.filtered_projects().get(self.cursor).copied()
    }

    /// Keep the cursor inside the filtered list (0 when empty).
    pub fn clamp_cursor(&mut self) {
        let len = self.filtered_projects().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn all_stopped(&self) -> bool {
        self.projects
            .iter()
            .all(|p| p.status == crate::model::ProjectStatus::Stopped)
    }

    pub fn is_loading(&self) -> bool {
        match &self.view {
            View::Operation(op) => !op.operation.done,
            View::Detail(detail) => detail.loading,
            _ => self.loading,
        }
    }

    pub(crate) fn allocate_stream(&mut self) -> StreamId {
        self.next_stream += 1;
        StreamId(self.next_stream)
    }

    /// Resolve the next line or end-of-stream from the live stream, if any.
    ///
    /// Never resolves when no stream is live, so it can sit in a `select!`
    /// next to the message channel.
    pub async fn next_stream_message(&mut self) -> crate::reducer::Message {
        use crate::reducer::Message;
        use crate::stream::StreamEvent;

        let Some(handle) = self.view.stream_slot_mut().and_then(StreamSlot::handle_mut) else {
            return std::future::pending().await;
        };
        let id = handle.id();
        let kind = handle.kind();
        match handle.next_event().await {
            StreamEvent::Line(line) => Message::Line { id, line },
            StreamEvent::Ended { error } => Message::StreamEnded { id, kind, error },
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Timings::default())
    }
}
