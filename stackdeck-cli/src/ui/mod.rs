//! Rendering. Every function here reads the state and draws; nothing mutates.

mod dashboard;
mod detail;
mod output;
pub mod theme;

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use stackdeck_core::keys::{HELP_SECTIONS, KeyHint};
use stackdeck_core::state::{DashboardState, View};

pub use theme::Theme;

pub fn render(f: &mut Frame, state: &DashboardState, theme: &Theme) {
    let area = f.area();
    match &state.view {
        View::Dashboard => dashboard::draw(f, area, state, theme),
        View::Detail(detail) => detail::draw(f, area, state, detail, theme),
        View::Logs(_) | View::Operation(_) => output::draw(f, area, state, theme),
    }
    if state.show_help {
        draw_help(f, area, theme);
    }
}

/// Shorten to `max` characters, ending in an ellipsis when cut.
fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    if max == 1 {
        return "…".into();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

fn divider(width: u16, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        "─".repeat(width as usize),
        theme.subtle_border_style(),
    ))
}

fn hints_line(hints: &[KeyHint], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, theme.key_hint_style()));
        spans.push(Span::styled(format!(" {}", hint.desc), theme.text_dim_style()));
    }
    Line::from(spans)
}

/// Rows needed to show `hints` wrapped at `width`.
fn hints_height(hints: &[KeyHint], width: u16) -> u16 {
    let total: usize = hints
        .iter()
        .map(|h| h.key.chars().count() + 1 + h.desc.chars().count() + 2)
        .sum();
    let width = (width as usize).max(1);
    total.div_ceil(width).max(1) as u16
}

fn draw_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let mut lines = Vec::new();
    for (heading, entries) in HELP_SECTIONS {
        lines.push(Line::from(Span::styled(
            heading.to_string(),
            theme.section_header_style(),
        )));
        for (keys, desc) in entries.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<16}", keys), theme.key_hint_style()),
                Span::styled(desc.to_string(), theme.text_style()),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        theme.text_muted_style(),
    )));

    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.subtle_border_style())
        .title(Span::styled(" Help ", theme.title_style()));
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    /// Draw `state` on a plain 80x`height` screen and return its text.
    pub fn screen(state: &DashboardState, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, height)).unwrap();
        terminal
            .draw(|f| render(f, state, &Theme::plain()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::screen;
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("shop", 10), "shop");
        assert_eq!(truncate("storefront", 5), "stor…");
        assert_eq!(truncate("storefront", 1), "…");
        assert_eq!(truncate("storefront", 0), "");
    }

    #[test]
    fn test_hints_height_wraps() {
        let hints = [
            KeyHint {
                key: "esc",
                desc: "back",
            },
            KeyHint {
                key: "q",
                desc: "quit",
            },
        ];
        assert_eq!(hints_height(&hints, 80), 1);
        assert_eq!(hints_height(&hints, 10), 2);
    }

    #[test]
    fn test_help_overlay_lists_bindings() {
        let mut state = DashboardState::default();
        state.show_help = true;
        let text = screen(&state, 40);
        assert!(text.contains("Help"));
        assert!(text.contains("Navigation"));
        assert!(text.contains("Poweroff all projects and containers"));
    }
}
