use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::keys::Key;
use crate::model::{ProjectDetail, ProjectSummary};
use crate::state::{
    ConfirmAction, DashboardState, DetailView, LogsView, OperationView, STATUS_OPERATION_COMPLETED,
    STATUS_REFRESHING, StreamSlot, View, ViewMode,
};
use crate::stream::{StreamHandle, StreamId, StreamKind};
use crate::task::Task;

#[derive(Debug)]
pub enum Message {
    Resize {
        width: u16,
        height: u16,
    },
    ProjectsLoaded(Result<Vec<ProjectSummary>, String>),
    DetailLoaded {
        root: PathBuf,
        result: Result<ProjectDetail, String>,
    },
    RouterStatus(String),
    /// `Ok(enabled)` with the resulting debugger state.
    DebugToggled(Result<bool, String>),
    Clipboard(Result<(), String>),
    InteractiveFinished {
        origin: ViewMode,
        result: Result<(), String>,
    },
    StreamStarted(StreamHandle),
    Line {
        id: StreamId,
        line: String,
    },
    StreamEnded {
        id: StreamId,
        kind: StreamKind,
        error: Option<String>,
    },
    /// Auto-return timer for the operation launched as this stream.
    AutoReturn(StreamId),
    Tick,
    Key(Key),
}

/// Tasks to run once at startup.
pub fn init(state: &DashboardState) -> Vec<Task> {
    vec![
        Task::LoadProjects,
        Task::LoadRouterStatus,
        Task::ScheduleTick {
            after: state.timings.refresh_interval,
        },
    ]
}

/// Apply one message and return the follow-up work.
pub fn update(state: &mut DashboardState, msg: Message) -> Vec<Task> {
    match msg {
        Message::Resize { width, height } => {
            state.viewport.width = width;
            state.viewport.height = height;
            vec![]
        }
        Message::ProjectsLoaded(result) => on_projects_loaded(state, result),
        Message::DetailLoaded { root, result } => on_detail_loaded(state, root, result),
        Message::RouterStatus(status) => {
            state.router_status = status;
            vec![]
        }
        Message::DebugToggled(result) => on_debug_toggled(state, result),
        Message::Clipboard(result) => {
            state.status = match result {
                Ok(()) => "URL copied to clipboard".into(),
                Err(e) => format!("Copy failed: {}", e),
            };
            vec![]
        }
        Message::InteractiveFinished { origin, result } => {
            on_interactive_finished(state, origin, result)
        }
        Message::StreamStarted(handle) => on_stream_started(state, handle),
        Message::Line { id, line } => {
            match &mut state.view {
                View::Logs(logs) if logs.stream.expects(id) => logs.output.push(line),
                View::Operation(op) if op.stream.expects(id) => op.output.push(line),
                _ => {}
            }
            vec![]
        }
        Message::StreamEnded { id, kind, error } => on_stream_ended(state, id, kind, error),
        Message::AutoReturn(id) => on_auto_return(state, id),
        Message::Tick => on_tick(state),
        Message::Key(key) => on_key(state, key),
    }
}

fn take_view(state: &mut DashboardState) -> View {
    std::mem::take(&mut state.view)
}

fn kill(handle: StreamHandle) -> Option<Task> {
    info!(stream = %handle.id(), "cancelling stream");
    handle.process().map(Task::KillProcessTree)
}

fn refresh_list() -> Vec<Task> {
    vec![Task::LoadProjects, Task::LoadRouterStatus]
}

fn on_projects_loaded(
    state: &mut DashboardState,
    result: Result<Vec<ProjectSummary>, String>,
) -> Vec<Task> {
    state.loading = false;
    match result {
        Ok(projects) => {
            debug!(count = projects.len(), "projects loaded");
            state.load_error = None;
            if state.status == STATUS_REFRESHING {
                state.status.clear();
            }
            state.projects = projects;
            state.clamp_cursor();
        }
        Err(e) => {
            warn!(error = %e, "project list failed");
            state.status = format!("Error loading projects: {}", e);
            state.load_error = Some(e);
        }
    }
    vec![]
}

fn on_detail_loaded(
    state: &mut DashboardState,
    root: PathBuf,
    result: Result<ProjectDetail, String>,
) -> Vec<Task> {
    let mode = state.mode();
    let Some(detail_view) = state.view.detail_view_mut() else {
        debug!(root = %root.display(), "detail arrived with no detail view, dropped");
        return vec![];
    };
    if detail_view.root != root {
        debug!(root = %root.display(), "detail for another project, dropped");
        return vec![];
    }
    detail_view.loading = false;

    match result {
        Ok(detail) => {
            detail_view.detail = Some(detail);
            if state.status == STATUS_REFRESHING {
                state.status.clear();
            }
        }
        Err(e) => {
            warn!(error = %e, "detail load failed");
            state.status = format!("Error loading detail: {}", e);
            match mode {
                ViewMode::Detail => state.view = View::Dashboard,
                ViewMode::Operation => {
                    if let View::Operation(op) = &mut state.view {
                        op.origin = None;
                        op.operation.return_view = ViewMode::Dashboard;
                    }
                }
                ViewMode::Logs | ViewMode::Dashboard => {}
            }
        }
    }
    vec![]
}

fn on_debug_toggled(state: &mut DashboardState, result: Result<bool, String>) -> Vec<Task> {
    state.status = match result {
        Ok(true) => "Xdebug enabled".into(),
        Ok(false) => "Xdebug disabled".into(),
        Err(e) => format!("Xdebug toggle failed: {}", e),
    };
    match state.view.detail_view_mut() {
        Some(detail_view) if detail_view.detail.is_some() => {
            detail_view.loading = true;
            vec![Task::LoadDetail {
                root: detail_view.root.clone(),
            }]
        }
        _ => vec![],
    }
}

fn on_interactive_finished(
    state: &mut DashboardState,
    origin: ViewMode,
    result: Result<(), String>,
) -> Vec<Task> {
    state.status = match result {
        Ok(()) => STATUS_OPERATION_COMPLETED.into(),
        Err(e) => format!("Error: {}", e),
    };
    state.loading = true;

    let mut tasks = refresh_list();
    if origin == ViewMode::Detail {
        if let Some(detail_view) = state.view.detail_view_mut() {
            detail_view.loading = true;
            tasks.push(Task::LoadDetail {
                root: detail_view.root.clone(),
            });
        }
    }
    tasks
}

fn on_stream_started(state: &mut DashboardState, handle: StreamHandle) -> Vec<Task> {
    let id = handle.id();
    if let Some(slot) = state.view.stream_slot_mut() {
        if matches!(&*slot, StreamSlot::Pending(pending) if *pending == id) {
            info!(stream = %id, kind = ?handle.kind(), "stream started");
            *slot = StreamSlot::Live(handle);
            return vec![];
        }
    }
    // The view that asked for this stream is gone.
    kill(handle).into_iter().collect()
}

fn on_stream_ended(
    state: &mut DashboardState,
    id: StreamId,
    kind: StreamKind,
    error: Option<String>,
) -> Vec<Task> {
    match &mut state.view {
        View::Logs(logs) if logs.stream.expects(id) => {
            info!(stream = %id, "log stream ended");
            logs.stream = StreamSlot::Closed;
            if let Some(e) = error {
                state.status = format!("Error following logs: {}", e);
            }
            vec![]
        }
        View::Operation(op) if op.stream.expects(id) => {
            info!(stream = %id, failed = error.is_some(), "operation ended");
            op.stream = StreamSlot::Closed;
            op.operation.done = true;
            op.operation.error = error;

            let mut tasks = refresh_list();
            if let Some(origin) = op.origin.as_mut() {
                origin.loading = true;
                tasks.push(Task::LoadDetail {
                    root: origin.root.clone(),
                });
            }
            if op.operation.error.is_none() {
                tasks.push(Task::ScheduleAutoReturn {
                    id,
                    after: state.timings.auto_return_delay,
                });
            }
            tasks
        }
        _ => {
            debug!(stream = %id, ?kind, "stale stream end ignored");
            vec![]
        }
    }
}

fn on_auto_return(state: &mut DashboardState, id: StreamId) -> Vec<Task> {
    let ready = matches!(
        &state.view,
        View::Operation(op) if op.id == id && op.operation.done && op.operation.error.is_none()
    );
    if !ready {
        return vec![];
    }
    if let View::Operation(op) = take_view(state) {
        state.view = op.into_return_view();
        state.status = STATUS_OPERATION_COMPLETED.into();
    }
    vec![]
}

fn on_tick(state: &mut DashboardState) -> Vec<Task> {
    let mut tasks = match &state.view {
        View::Dashboard => refresh_list(),
        View::Detail(detail_view) if !detail_view.loading => vec![
            Task::LoadDetail {
                root: detail_view.root.clone(),
            },
            Task::LoadRouterStatus,
        ],
        View::Detail(_) => vec![Task::LoadRouterStatus],
        View::Logs(_) | View::Operation(_) => vec![],
    };
    tasks.push(Task::ScheduleTick {
        after: state.timings.refresh_interval,
    });
    tasks
}

fn on_key(state: &mut DashboardState, key: Key) -> Vec<Task> {
    debug!(mode = state.mode().label(), ?key, "key");
    if key == Key::CtrlC {
        return quit(state);
    }
    match state.mode() {
        ViewMode::Dashboard => dashboard_key(state, key),
        ViewMode::Detail => detail_key(state, key),
        ViewMode::Logs | ViewMode::Operation => stream_key(state, key),
    }
}

fn quit(state: &mut DashboardState) -> Vec<Task> {
    let mut tasks = Vec::new();
    if let Some(handle) = state.view.stream_slot_mut().and_then(StreamSlot::take) {
        tasks.extend(kill(handle));
    }
    tasks.push(Task::Quit);
    tasks
}

fn dashboard_page(state: &DashboardState) -> usize {
    match state.viewport.height.saturating_sub(10) {
        0 => 10,
        page => page as usize,
    }
}

fn detail_page(state: &DashboardState) -> u16 {
    match state.viewport.height.saturating_sub(6) {
        0 => 10,
        page => page,
    }
}

/// Switch to the operation view and launch the subcommand.
///
/// When called from the detail view, the detail is parked as the return target.
fn begin_operation(
    state: &mut DashboardState,
    name: String,
    dir: Option<PathBuf>,
    args: &[&str],
) -> Vec<Task> {
    let origin = match take_view(state) {
        View::Detail(detail_view) => Some(detail_view),
        _ => None,
    };
    let id = state.allocate_stream();
    info!(stream = %id, %name, "operation launched");
    state.view = View::Operation(OperationView::new(name, id, origin));
    state.status.clear();
    vec![Task::operation(id, dir, args)]
}

fn dashboard_key(state: &mut DashboardState, key: Key) -> Vec<Task> {
    if let Some(action) = state.confirmation.take() {
        if key.is_confirm() {
            return match action {
                ConfirmAction::StartAll => begin_operation(
                    state,
                    "Starting all projects".into(),
                    None,
                    &["start", "--all"],
                ),
                ConfirmAction::StopAll => begin_operation(
                    state,
                    "Stopping all projects".into(),
                    None,
                    &["stop", "--all"],
                ),
                ConfirmAction::Poweroff => {
                    begin_operation(state, "Powering off".into(), None, &["poweroff"])
                }
            };
        }
        state.status.clear();
        return vec![];
    }

    if state.filter.active {
        filter_key(state, key);
        return vec![];
    }

    if state.show_help {
        state.show_help = false;
        return vec![];
    }

    if key.is_up() {
        state.cursor = state.cursor.saturating_sub(1);
        return vec![];
    }
    if key.is_down() {
        if state.cursor + 1 < state.filtered_projects().len() {
            state.cursor += 1;
        }
        return vec![];
    }

    match key {
        Key::Esc => {
            if state.filter.is_narrowing() {
                state.filter.cancel();
                state.cursor = 0;
            }
            vec![]
        }
        Key::Char('q') => vec![Task::Quit],
        Key::PageUp => {
            state.cursor = state.cursor.saturating_sub(dashboard_page(state));
            vec![]
        }
        Key::PageDown => {
            let last = state.filtered_projects().len().saturating_sub(1);
            state.cursor = (state.cursor + dashboard_page(state)).min(last);
            vec![]
        }
        Key::Enter | Key::Char('d') => {
            let Some(project) = state.selected_project() else {
                return vec![];
            };
            let name = project.name.clone();
            let root = project.root.clone();
            state.view = View::Detail(DetailView::new(name, root.clone()));
            state.status.clear();
            vec![Task::LoadDetail { root }]
        }
        Key::Char(c @ ('s' | 'S' | 'r')) => {
            let Some(project) = state.selected_project() else {
                return vec![];
            };
            let name = project.name.clone();
            let (verb, arg) = match c {
                's' => ("Starting", "start"),
                'S' => ("Stopping", "stop"),
                _ => ("Restarting", "restart"),
            };
            begin_operation(state, format!("{} {}", verb, name), None, &[arg, &name])
        }
        Key::Char(c @ ('l' | 'm' | 'x')) => {
            let Some(project) = state.selected_project() else {
                return vec![];
            };
            let root = Some(project.root.clone());
            match c {
                'l' if !project.url.is_empty() => {
                    vec![Task::interactive(root, &["launch"], ViewMode::Dashboard)]
                }
                'm' if !project.url.is_empty() => {
                    vec![Task::interactive(root, &["launch", "-m"], ViewMode::Dashboard)]
                }
                'x' => vec![Task::interactive(root, &["xhgui"], ViewMode::Dashboard)],
                _ => vec![],
            }
        }
        Key::Char('P') => {
            request_confirmation(state, ConfirmAction::Poweroff);
            vec![]
        }
        Key::Char('a') => {
            if !state.projects.is_empty() {
                request_confirmation(state, ConfirmAction::StartAll);
            }
            vec![]
        }
        Key::Char('A') => {
            if !state.projects.is_empty() {
                request_confirmation(state, ConfirmAction::StopAll);
            }
            vec![]
        }
        Key::Char('C') => vec![Task::RunConfig],
        Key::Char('R') => {
            state.loading = true;
            state.status = STATUS_REFRESHING.into();
            refresh_list()
        }
        Key::Char('/') => {
            state.filter.begin();
            state.cursor = 0;
            vec![]
        }
        Key::Char('?') => {
            state.show_help = true;
            vec![]
        }
        _ => vec![],
    }
}

fn request_confirmation(state: &mut DashboardState, action: ConfirmAction) {
    state.status = action.prompt(state.projects.len());
    state.confirmation = Some(action);
}

fn filter_key(state: &mut DashboardState, key: Key) {
    match key {
        Key::Esc => {
            state.filter.cancel();
            state.cursor = 0;
        }
        Key::Enter => state.filter.confirm(),
        Key::Backspace => {
            if state.filter.pop() {
                state.cursor = 0;
            }
        }
        Key::Char(c) => {
            state.filter.push(c);
            state.cursor = 0;
        }
        _ => {}
    }
}

fn detail_key(state: &mut DashboardState, key: Key) -> Vec<Task> {
    let page = detail_page(state);
    let View::Detail(detail_view) = &mut state.view else {
        return vec![];
    };
    // The last content row stays on screen.
    let max_scroll = detail_view
        .detail
        .as_ref()
        .map_or(0, |d| d.line_count().saturating_sub(1));

    match key {
        k if k.is_up() => {
            detail_view.scroll = detail_view.scroll.saturating_sub(1);
            return vec![];
        }
        k if k.is_down() => {
            detail_view.scroll = detail_view.scroll.saturating_add(1).min(max_scroll);
            return vec![];
        }
        Key::PageUp => {
            detail_view.scroll = detail_view.scroll.saturating_sub(page);
            return vec![];
        }
        Key::PageDown => {
            detail_view.scroll = detail_view.scroll.saturating_add(page).min(max_scroll);
            return vec![];
        }
        k if k.is_back() => {
            state.view = View::Dashboard;
            state.status.clear();
            return vec![];
        }
        Key::Char('q') => return vec![Task::Quit],
        _ => {}
    }

    let Some(detail) = detail_view.detail.clone() else {
        return vec![];
    };
    let root = detail_view.root.clone();

    match key {
        Key::Char('L') => {
            let View::Detail(detail_view) = take_view(state) else {
                return vec![];
            };
            let id = state.allocate_stream();
            info!(stream = %id, project = %detail.name, "following logs");
            state.view = View::Logs(LogsView {
                detail: detail_view,
                output: Default::default(),
                stream: StreamSlot::Pending(id),
            });
            vec![Task::StartLogStream { id, root }]
        }
        Key::Char('s') => begin_operation(
            state,
            format!("Starting {}", detail.name),
            Some(root),
            &["start"],
        ),
        Key::Char('S') => begin_operation(
            state,
            format!("Stopping {}", detail.name),
            Some(root),
            &["stop"],
        ),
        Key::Char('r') => begin_operation(
            state,
            format!("Restarting {}", detail.name),
            Some(root),
            &["restart"],
        ),
        Key::Char('l') if !detail.urls.is_empty() => {
            vec![Task::interactive(Some(root), &["launch"], ViewMode::Detail)]
        }
        Key::Char('m') if !detail.mail_url.is_empty() => {
            vec![Task::interactive(Some(root), &["launch", "-m"], ViewMode::Detail)]
        }
        Key::Char('x') => vec![Task::interactive(Some(root), &["xhgui"], ViewMode::Detail)],
        Key::Char('e') => vec![Task::interactive(Some(root), &["ssh"], ViewMode::Detail)],
        Key::Char('X') if detail.status.is_running() => {
            state.status = "Toggling xdebug...".into();
            vec![Task::ToggleDebug { root }]
        }
        Key::Char('c') => match detail.primary_url() {
            Some(url) => {
                state.status = "Copying URL...".into();
                vec![Task::CopyToClipboard {
                    text: url.to_string(),
                }]
            }
            None => vec![],
        },
        Key::Char('R') => {
            detail_view.loading = true;
            state.status = STATUS_REFRESHING.into();
            vec![Task::LoadDetail { root }]
        }
        _ => vec![],
    }
}

fn stream_key(state: &mut DashboardState, key: Key) -> Vec<Task> {
    if key.is_quit() {
        return quit(state);
    }
    if !key.is_back() {
        return vec![];
    }

    let mut tasks = Vec::new();
    match take_view(state) {
        View::Logs(mut logs) => {
            if let Some(handle) = logs.stream.take() {
                tasks.extend(kill(handle));
            }
            state.view = View::Detail(logs.detail);
        }
        View::Operation(mut op) => {
            if let Some(handle) = op.stream.take() {
                tasks.extend(kill(handle));
            }
            let mut back = op.into_return_view();
            tasks.extend(refresh_list());
            if let View::Detail(detail_view) = &mut back {
                detail_view.loading = true;
                tasks.push(Task::LoadDetail {
                    root: detail_view.root.clone(),
                });
            }
            state.view = back;
        }
        other => state.view = other,
    }
    tasks
}
