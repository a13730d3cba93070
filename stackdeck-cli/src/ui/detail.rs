use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use stackdeck_core::keys::DETAIL_HINTS;
use stackdeck_core::model::{ProjectDetail, ProjectStatus, sort_services};
use stackdeck_core::state::{DashboardState, DetailView};

use super::{Theme, divider, hints_height, hints_line, truncate};

pub(super) fn draw(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    view: &DetailView,
    theme: &Theme,
) {
    let hints = hints_height(DETAIL_HINTS, area.width);
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1 + hints),
    ])
    .areas(area);

    let title = format!("Project: {}", view.name);
    let mut header = vec![Span::styled(title.clone(), theme.title_style())];
    if let Some(detail) = &view.detail {
        let label = detail.status.label();
        let gap = (area.width as usize).saturating_sub(title.chars().count() + label.len());
        header.push(Span::raw(" ".repeat(gap)));
        header.push(Span::styled(label, theme.status_style(detail.status)));
    }
    f.render_widget(
        Paragraph::new(vec![Line::from(header), divider(area.width, theme)]),
        header_area,
    );

    let mut body = match &view.detail {
        // A refresh keeps showing the previous snapshot.
        Some(detail) => detail_lines(detail, area.width, theme),
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading project detail...",
                theme.text_dim_style(),
            )),
        ],
    };
    if !state.status.is_empty() {
        body.push(Line::from(""));
        body.push(Line::from(Span::styled(
            state.status.clone(),
            theme.text_style(),
        )));
    }
    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0)),
        body_area,
    );

    let mut footer = vec![divider(area.width, theme)];
    footer.push(hints_line(DETAIL_HINTS, theme));
    f.render_widget(
        Paragraph::new(footer).wrap(Wrap { trim: false }),
        footer_area,
    );
}

fn detail_lines(d: &ProjectDetail, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let label = |s: &str| Span::styled(format!("{:<11}", s), theme.text_dim_style());
    let value = |s: &str| Span::styled(s.to_string(), theme.text_style());
    let grid = |l1: &str, v1: &str, l2: &str, v2: &str| {
        Line::from(vec![
            Span::raw(" "),
            label(l1),
            Span::styled(format!("{:<16}", v1), theme.text_style()),
            Span::raw("  "),
            label(l2),
            value(v2),
        ])
    };

    let perf = if d.performance_mode.is_empty() {
        "none"
    } else {
        d.performance_mode.as_str()
    };
    let xdebug = if d.debug_enabled { "on" } else { "off" };
    let url_width = (width as usize).saturating_sub(5).max(20);

    let mut lines = vec![
        Line::from(""),
        grid("Type:", &d.project_type, "PHP:", &d.php_version),
        grid("Webserver:", &d.webserver_type, "Node.js:", &d.nodejs_version),
        grid("Docroot:", &d.docroot, "Perf:", perf),
        grid("Database:", &d.database_label(), "Xdebug:", xdebug),
        Line::from(""),
    ];

    if !d.urls.is_empty() {
        lines.push(Line::from(vec![Span::raw(" "), label("URLs:")]));
        for url in &d.urls {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(truncate(url, url_width), theme.accent_style()),
            ]));
        }
        lines.push(Line::from(""));
    }
    if !d.mail_url.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(" "),
            label("Mailpit:"),
            Span::styled(truncate(&d.mail_url, url_width), theme.accent_style()),
        ]));
    }
    if !d.db_published_port.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(" "),
            label("DB Port:"),
            value(&d.db_published_port),
        ]));
    }
    if !d.addons.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(" "),
            label("Add-ons:"),
            value(&d.addons.join(", ")),
        ]));
    }

    if !d.services.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::raw(" "), label("Services:")]));
        let mut spans = vec![Span::raw("   ")];
        for (i, svc) in sort_services(&d.services).into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(", "));
            }
            let style = theme.status_style(ProjectStatus::parse(&svc.status));
            spans.push(Span::styled(svc.name, theme.text_style()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(svc.status, style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

#[cfg(test)]
mod tests {
    use stackdeck_core::model::ServiceInfo;
    use stackdeck_core::state::View;

    use super::super::test_support::screen;
    use super::*;

    fn svc(name: &str) -> ServiceInfo {
        ServiceInfo {
            name: name.into(),
            status: "running".into(),
        }
    }

    fn detail() -> ProjectDetail {
        ProjectDetail {
            name: "shop".into(),
            status: ProjectStatus::Running,
            project_type: "drupal10".into(),
            php_version: "8.3".into(),
            database_type: "mariadb".into(),
            database_version: "10.11".into(),
            debug_enabled: true,
            urls: vec!["https://shop.ddev.site".into()],
            mail_url: "https://shop.ddev.site:8026".into(),
            db_published_port: "127.0.0.1:32768".into(),
            addons: vec!["redis".into(), "solr".into()],
            services: vec![svc("redis"), svc("db"), svc("web")],
            root: "/srv/shop".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_loading_placeholder() {
        let mut state = DashboardState::default();
        state.view = View::Detail(DetailView::new("shop", "/srv/shop"));
        let text = screen(&state, 24);
        assert!(text.contains("Project: shop"));
        assert!(text.contains("Loading project detail..."));
    }

    #[test]
    fn test_detail_sections() {
        let mut view = DetailView::new("shop", "/srv/shop");
        view.detail = Some(detail());
        view.loading = false;
        let mut state = DashboardState::default();
        state.view = View::Detail(view);
        state.status = "Copying URL...".into();

        let text = screen(&state, 30);
        assert!(text.contains("mariadb:10.11"));
        assert!(text.contains("Xdebug:    on"));
        assert!(text.contains("Perf:      none"));
        assert!(text.contains("https://shop.ddev.site:8026"));
        assert!(text.contains("127.0.0.1:32768"));
        assert!(text.contains("redis, solr"));
        assert!(text.contains("web running, db running, redis running"));
        assert!(text.contains("Copying URL..."));
    }
}
