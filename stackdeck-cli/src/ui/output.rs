use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use stackdeck_core::keys::STREAM_HINTS;
use stackdeck_core::state::{DashboardState, OperationState, OutputBuffer, StreamSlot, View};

use super::{Theme, divider, hints_line};

/// Logs and operation output: the newest lines that fit, plus a footer.
pub(super) fn draw(f: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let (title, output, operation, closed) = match &state.view {
        View::Logs(logs) => (
            format!("Logs: {}", logs.detail.name),
            &logs.output,
            None,
            matches!(logs.stream, StreamSlot::Closed),
        ),
        View::Operation(op) => {
            let name = if op.operation.name.is_empty() {
                "Operation".to_string()
            } else {
                op.operation.name.clone()
            };
            (name, &op.output, Some(&op.operation), false)
        }
        _ => return,
    };

    let outcome = operation.and_then(|op| outcome_line(op, theme));
    let status = (!state.status.is_empty())
        .then(|| Line::from(Span::styled(state.status.clone(), theme.warn_style())));
    let footer_height = 2 + u16::from(outcome.is_some()) + u16::from(status.is_some());
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(footer_height),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(title, theme.title_style())),
            divider(area.width, theme),
        ]),
        header_area,
    );

    let body = output_lines(output, operation, closed, body_area.height as usize, theme);
    f.render_widget(Paragraph::new(body), body_area);

    let mut footer = Vec::with_capacity(4);
    footer.extend(outcome);
    footer.extend(status);
    footer.push(divider(area.width, theme));
    footer.push(hints_line(STREAM_HINTS, theme));
    f.render_widget(Paragraph::new(footer), footer_area);
}

fn output_lines(
    output: &OutputBuffer,
    operation: Option<&OperationState>,
    closed: bool,
    height: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if output.is_empty() {
        let waiting = match operation {
            None if closed => "  Log stream ended",
            None => "  Waiting for log output...",
            Some(op) if !op.done => "  Running...",
            Some(_) => return Vec::new(),
        };
        return vec![
            Line::from(""),
            Line::from(Span::styled(waiting, theme.text_dim_style())),
        ];
    }
    output
        .tail(height)
        .map(|line| Line::from(Span::styled(line.to_string(), theme.text_style())))
        .collect()
}

fn outcome_line(op: &OperationState, theme: &Theme) -> Option<Line<'static>> {
    if !op.done {
        return None;
    }
    Some(match &op.error {
        Some(err) => Line::from(Span::styled(format!("Failed: {}", err), theme.error_style())),
        None => Line::from(Span::styled(
            "Completed, returning shortly...",
            theme.success_style(),
        )),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stackdeck_core::keys::Key;
    use stackdeck_core::model::{ProjectDetail, ProjectStatus, ProjectSummary};
    use stackdeck_core::reducer::{Message, update};
    use stackdeck_core::state::{DetailView, LogsView, OperationView, StreamSlot, Timings};
    use stackdeck_core::stream::{StreamId, StreamKind};
    use stackdeck_core::task::Task;

    use super::super::test_support::screen;
    use super::*;

    #[test]
    fn test_logs_show_newest_lines() {
        let mut output = OutputBuffer::new();
        for i in 0..100 {
            output.push(format!("line {:03}", i));
        }
        let mut state = DashboardState::default();
        state.view = View::Logs(LogsView {
            detail: DetailView::new("shop", "/srv/shop"),
            output,
            stream: StreamSlot::Closed,
        });
        let text = screen(&state, 24);
        assert!(text.contains("Logs: shop"));
        assert!(text.contains("line 099"));
        assert!(!text.contains("line 000"));
    }

    #[test]
    fn test_logs_waiting() {
        let mut state = DashboardState::default();
        state.view = View::Logs(LogsView {
            detail: DetailView::new("shop", "/srv/shop"),
            output: OutputBuffer::new(),
            stream: StreamSlot::Pending(StreamId(1)),
        });
        assert!(screen(&state, 24).contains("Waiting for log output..."));
    }

    #[test]
    fn test_log_launch_error_is_shown() {
        let mut state = DashboardState::default();
        state.view = View::Logs(LogsView {
            detail: DetailView::new("shop", "/srv/shop"),
            output: OutputBuffer::new(),
            stream: StreamSlot::Closed,
        });
        state.status = "Error following logs: ddev not found in PATH".into();
        let text = screen(&state, 24);
        assert!(text.contains("Error following logs: ddev not found in PATH"));
        assert!(text.contains("Log stream ended"));
        assert!(!text.contains("Waiting for log output..."));
    }

    #[test]
    fn test_failed_log_launch_from_detail() {
        let mut state = DashboardState::new(Timings::default());
        let shop = ProjectSummary {
            name: "shop".into(),
            status: ProjectStatus::Running,
            root: PathBuf::from("/srv/shop"),
            ..Default::default()
        };
        update(&mut state, Message::ProjectsLoaded(Ok(vec![shop])));
        update(&mut state, Message::Key(Key::Enter));
        update(
            &mut state,
            Message::DetailLoaded {
                root: PathBuf::from("/srv/shop"),
                result: Ok(ProjectDetail {
                    name: "shop".into(),
                    root: PathBuf::from("/srv/shop"),
                    ..Default::default()
                }),
            },
        );
        let tasks = update(&mut state, Message::Key(Key::Char('L')));
        let Some(Task::StartLogStream { id, .. }) = tasks.first().cloned() else {
            panic!("no log stream task: {:?}", tasks);
        };
        update(
            &mut state,
            Message::StreamEnded {
                id,
                kind: StreamKind::Logs,
                error: Some("ddev not found in PATH".into()),
            },
        );

        let text = screen(&state, 24);
        assert!(text.contains("ddev not found"));
        assert!(text.contains("Log stream ended"));
    }

    #[test]
    fn test_operation_footer() {
        let mut op = OperationView::new("Starting shop", StreamId(1), None);
        let mut state = DashboardState::default();
        state.view = View::Operation(OperationView::new("Starting shop", StreamId(2), None));
        let text = screen(&state, 24);
        assert!(text.contains("Starting shop"));
        assert!(text.contains("Running..."));

        op.output.push("Container web Started".into());
        op.operation.done = true;
        state.view = View::Operation(op);
        let text = screen(&state, 24);
        assert!(text.contains("Container web Started"));
        assert!(text.contains("Completed, returning shortly..."));

        if let View::Operation(op) = &mut state.view {
            op.operation.error = Some("exit status: 1".into());
        }
        assert!(screen(&state, 24).contains("Failed: exit status: 1"));
    }
}
