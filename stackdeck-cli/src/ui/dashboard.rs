use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use stackdeck_core::keys::DASHBOARD_HINTS;
use stackdeck_core::model::ProjectSummary;
use stackdeck_core::state::DashboardState;

use super::{Theme, divider, hints_height, hints_line, truncate};

const TYPE_WIDTH: usize = 12;
const STATUS_WIDTH: usize = 10;

pub(super) fn draw(f: &mut Frame, area: Rect, state: &DashboardState, theme: &Theme) {
    let footer = footer_lines(state, area.width, theme);
    let hints = hints_height(DASHBOARD_HINTS, area.width);
    let [header_area, body_area, footer_area, hints_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(footer.len() as u16),
        Constraint::Length(hints),
    ])
    .areas(area);

    let version = env!("CARGO_PKG_VERSION");
    let title = "Projects";
    let gap = (area.width as usize).saturating_sub(title.len() + version.len());
    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(title, theme.title_style()),
                Span::raw(" ".repeat(gap)),
                Span::styled(version, theme.text_muted_style()),
            ]),
            divider(area.width, theme),
        ]),
        header_area,
    );

    let mut body = filter_lines(state, theme);
    let rows_height = (body_area.height as usize).saturating_sub(body.len());
    body.extend(project_lines(state, area.width, rows_height, theme));
    f.render_widget(Paragraph::new(body), body_area);

    f.render_widget(
        Paragraph::new(footer).wrap(Wrap { trim: false }),
        footer_area,
    );
    f.render_widget(
        Paragraph::new(hints_line(DASHBOARD_HINTS, theme)).wrap(Wrap { trim: false }),
        hints_area,
    );
}

fn filter_lines(state: &DashboardState, theme: &Theme) -> Vec<Line<'static>> {
    let filter = &state.filter;
    let text = if filter.active {
        format!("Filter: {}█", filter.text)
    } else if filter.is_narrowing() {
        format!("Filter: {} (press / to edit, esc to clear)", filter.text)
    } else {
        return Vec::new();
    };
    vec![
        Line::from(Span::styled(text, theme.accent_style())),
        Line::from(""),
    ]
}

fn project_lines(
    state: &DashboardState,
    width: u16,
    height: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if state.projects.is_empty() {
        if state.loading {
            return vec![Line::from(Span::styled(
                "  Loading projects...",
                theme.text_dim_style(),
            ))];
        }
        if let Some(err) = &state.load_error {
            return vec![
                Line::from(Span::styled(format!("  Error: {}", err), theme.error_style())),
                Line::from("  Is Docker running? Press R to retry."),
            ];
        }
        return vec![
            Line::from("  No projects found."),
            Line::from(Span::styled(
                "  Press C to configure a project in the current directory.",
                theme.text_dim_style(),
            )),
        ];
    }

    let filtered = state.filtered_projects();
    if filtered.is_empty() {
        return vec![Line::from("  No projects match the filter.")];
    }

    let name_width = name_width(&filtered, width);
    let narrow = width < 60;
    // Keep the cursor row on screen.
    let offset = (state.cursor + 1).saturating_sub(height.max(1));
    filtered
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, p)| project_row(p, i == state.cursor, name_width, narrow, width, theme))
        .collect()
}

fn name_width(projects: &[&ProjectSummary], width: u16) -> usize {
    let longest = projects
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(16);
    let cap = (width as usize / 3).max(16);
    let mut name_width = longest.min(cap);
    if width < 60 {
        name_width = name_width.min((width as usize / 4).max(8));
    }
    name_width
}

fn project_row(
    p: &ProjectSummary,
    selected: bool,
    name_width: usize,
    narrow: bool,
    width: u16,
    theme: &Theme,
) -> Line<'static> {
    let status_style = theme.status_style(p.status);
    let name_style = if selected {
        theme.selection_style()
    } else {
        theme.text_style()
    };
    let mut spans = vec![
        Span::styled(
            if selected { "> " } else { "  " },
            theme.accent_style(),
        ),
        Span::styled(
            format!("{:<w$}", truncate(&p.name, name_width), w = name_width),
            name_style,
        ),
        Span::raw(" "),
        Span::styled(
            format!(
                "{} {:<w$}",
                theme.status_icon(p.status),
                p.status.label(),
                w = STATUS_WIDTH
            ),
            status_style,
        ),
        Span::styled(
            format!("{:<w$}", truncate(&p.project_type, TYPE_WIDTH), w = TYPE_WIDTH),
            theme.text_dim_style(),
        ),
    ];
    if !narrow && p.status.is_running() && !p.url.is_empty() {
        let room = (width as usize).saturating_sub(name_width + STATUS_WIDTH + TYPE_WIDTH + 8);
        if room > 10 {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(truncate(&p.url, room), theme.accent_style()));
        }
    }
    Line::from(spans)
}

/// Status or prompt, router line, and the dividers around them.
fn footer_lines(state: &DashboardState, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![divider(width, theme)];
    if let Some(action) = state.confirmation {
        lines.push(Line::from(Span::styled(
            action.prompt(state.projects.len()),
            theme.warn_style(),
        )));
    } else if !state.status.is_empty() {
        lines.push(Line::from(Span::styled(
            state.status.clone(),
            theme.text_style(),
        )));
    } else if !state.projects.is_empty() && state.all_stopped() {
        lines.push(Line::from(Span::styled(
            "All projects stopped. Press 's' to start selected, 'a' to start all.",
            theme.text_dim_style(),
        )));
    }
    if !state.router_status.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Router: ", theme.text_dim_style()),
            Span::styled(
                state.router_status.clone(),
                theme.router_style(&state.router_status),
            ),
        ]));
    }
    lines.push(divider(width, theme));
    lines
}

#[cfg(test)]
mod tests {
    use stackdeck_core::model::ProjectStatus;
    use stackdeck_core::state::ConfirmAction;

    use super::super::test_support::screen;
    use super::*;

    fn project(name: &str, status: ProjectStatus) -> ProjectSummary {
        ProjectSummary {
            name: name.into(),
            status,
            project_type: "drupal10".into(),
            url: format!("https://{}.ddev.site", name),
            root: format!("/srv/{}", name).into(),
        }
    }

    fn loaded(projects: Vec<ProjectSummary>) -> DashboardState {
        let mut state = DashboardState::default();
        state.projects = projects;
        state.loading = false;
        state
    }

    #[test]
    fn test_loading_and_error_messages() {
        let state = DashboardState::default();
        assert!(screen(&state, 24).contains("Loading projects..."));

        let mut state = loaded(vec![]);
        state.load_error = Some("docker not running".into());
        let text = screen(&state, 24);
        assert!(text.contains("Error: docker not running"));
        assert!(text.contains("Is Docker running? Press R to retry."));

        state.load_error = None;
        assert!(screen(&state, 24).contains("No projects found."));
    }

    #[test]
    fn test_rows_show_url_only_when_running() {
        let state = loaded(vec![
            project("shop", ProjectStatus::Running),
            project("blog", ProjectStatus::Stopped),
        ]);
        let text = screen(&state, 24);
        assert!(text.contains("> shop"));
        assert!(text.contains("https://shop.ddev.site"));
        assert!(text.contains("blog"));
        assert!(!text.contains("https://blog.ddev.site"));
    }

    #[test]
    fn test_filter_lines() {
        let mut state = loaded(vec![project("shop", ProjectStatus::Running)]);
        state.filter.begin();
        state.filter.push('x');
        let text = screen(&state, 24);
        assert!(text.contains("Filter: x█"));
        assert!(text.contains("No projects match the filter."));

        state.filter.confirm();
        assert!(screen(&state, 24).contains("Filter: x (press / to edit, esc to clear)"));
    }

    #[test]
    fn test_all_stopped_hint_and_status_priority() {
        let mut state = loaded(vec![project("blog", ProjectStatus::Stopped)]);
        assert!(screen(&state, 24).contains("All projects stopped."));

        state.status = "Refreshing...".into();
        let text = screen(&state, 24);
        assert!(text.contains("Refreshing..."));
        assert!(!text.contains("All projects stopped."));

        state.confirmation = Some(ConfirmAction::StopAll);
        assert!(screen(&state, 24).contains("Stop all 1 projects?"));
    }

    #[test]
    fn test_router_line_hidden_when_unknown() {
        let mut state = loaded(vec![project("shop", ProjectStatus::Running)]);
        assert!(!screen(&state, 24).contains("Router:"));
        state.router_status = "healthy".into();
        assert!(screen(&state, 24).contains("Router: healthy"));
    }

    #[test]
    fn test_cursor_row_stays_visible() {
        let projects = (0..40)
            .map(|i| project(&format!("site{:02}", i), ProjectStatus::Stopped))
            .collect();
        let mut state = loaded(projects);
        state.cursor = 39;
        let text = screen(&state, 20);
        assert!(text.contains("> site39"));
        assert!(!text.contains("site00"));
    }
}
