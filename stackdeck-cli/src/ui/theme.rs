//! UI Theme Module - color palette and style helpers
//!
//! The theme is resolved once at startup and handed to every render
//! function; nothing reads formatting preferences while drawing.

use ratatui::style::{Color, Modifier, Style};

use stackdeck_core::model::ProjectStatus;

/// Color palette tokens for the theme
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (tertiary info, disabled)
    pub text_muted: Color,
    /// Accent color (highlights, focus)
    pub accent: Color,
    /// Success state (running, healthy)
    pub success: Color,
    /// Warning state (paused, starting)
    pub warn: Color,
    /// Error state (failed, unhealthy)
    pub error: Color,
    /// Selection background
    pub selection_bg: Color,
    /// Selection foreground
    pub selection_fg: Color,
    /// Key hint text
    pub key_hint: Color,
}

impl Palette {
    /// VS Code-esque dark theme
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255), // Light blue
            success: Color::Rgb(78, 201, 176), // Teal green
            warn: Color::Rgb(220, 180, 100),   // Amber
            error: Color::Rgb(244, 135, 113),  // Coral red
            selection_bg: Color::Rgb(38, 79, 120), // Dark blue
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120), // Soft orange
        }
    }

    /// No colors at all; the terminal's defaults everywhere.
    pub fn plain() -> Self {
        Self {
            panel_border: Color::Reset,
            text: Color::Reset,
            text_dim: Color::Reset,
            text_muted: Color::Reset,
            accent: Color::Reset,
            success: Color::Reset,
            warn: Color::Reset,
            error: Color::Reset,
            selection_bg: Color::Reset,
            selection_fg: Color::Reset,
            key_hint: Color::Reset,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub palette: Palette,
    /// Plain rendering: no colors, emphasis through modifiers only.
    pub plain: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::dark(),
            plain: false,
        }
    }
}

impl Theme {
    pub fn plain() -> Self {
        Self {
            palette: Palette::plain(),
            plain: true,
        }
    }

    /// Pick the theme from the config flag and the `NO_COLOR` convention.
    pub fn resolve(simple_formatting: bool, no_color: bool) -> Self {
        if simple_formatting || no_color {
            Self::plain()
        } else {
            Self::default()
        }
    }

    fn fg(&self, color: Color) -> Style {
        if self.plain {
            Style::default()
        } else {
            Style::default().fg(color)
        }
    }

    /// Style for a project status
    pub fn status_style(&self, status: ProjectStatus) -> Style {
        match status {
            ProjectStatus::Running => self.fg(self.palette.success),
            ProjectStatus::Paused => self.fg(self.palette.warn),
            ProjectStatus::Stopped => self.fg(self.palette.text_muted),
            ProjectStatus::Unknown => self.fg(self.palette.error),
        }
    }

    /// Icon for a project status
    pub fn status_icon(&self, status: ProjectStatus) -> &'static str {
        match status {
            ProjectStatus::Running => "●",
            ProjectStatus::Paused => "◐",
            ProjectStatus::Stopped => "○",
            ProjectStatus::Unknown => "?",
        }
    }

    /// Style for the router health tag
    pub fn router_style(&self, tag: &str) -> Style {
        match tag {
            "healthy" => self.fg(self.palette.success),
            "starting" => self.fg(self.palette.warn),
            _ => self.fg(self.palette.error),
        }
    }

    /// Style for key hints in footer
    pub fn key_hint_style(&self) -> Style {
        self.fg(self.palette.key_hint).add_modifier(Modifier::BOLD)
    }

    /// Style for subtle borders
    pub fn subtle_border_style(&self) -> Style {
        self.fg(self.palette.panel_border)
    }

    /// Style for selected items
    pub fn selection_style(&self) -> Style {
        if self.plain {
            return Style::default().add_modifier(Modifier::REVERSED);
        }
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        self.fg(self.palette.text)
    }

    pub fn text_dim_style(&self) -> Style {
        self.fg(self.palette.text_dim)
    }

    pub fn text_muted_style(&self) -> Style {
        self.fg(self.palette.text_muted)
    }

    pub fn accent_style(&self) -> Style {
        self.fg(self.palette.accent)
    }

    pub fn success_style(&self) -> Style {
        self.fg(self.palette.success)
    }

    pub fn warn_style(&self) -> Style {
        self.fg(self.palette.warn)
    }

    pub fn error_style(&self) -> Style {
        self.fg(self.palette.error).add_modifier(Modifier::BOLD)
    }

    /// Style for title text
    pub fn title_style(&self) -> Style {
        self.fg(self.palette.accent).add_modifier(Modifier::BOLD)
    }

    /// Style for section headers
    pub fn section_header_style(&self) -> Style {
        self.fg(self.palette.accent).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert!(!Theme::resolve(false, false).plain);
        assert!(Theme::resolve(true, false).plain);
        assert!(Theme::resolve(false, true).plain);
    }

    #[test]
    fn test_plain_has_no_colors() {
        let theme = Theme::plain();
        assert_eq!(theme.status_style(ProjectStatus::Running).fg, None);
        assert_eq!(theme.router_style("unhealthy").fg, None);
        assert!(theme
            .selection_style()
            .add_modifier
            .contains(Modifier::REVERSED));
    }

    #[test]
    fn test_router_colors() {
        let theme = Theme::default();
        assert_eq!(
            theme.router_style("healthy").fg,
            Some(theme.palette.success)
        );
        assert_eq!(theme.router_style("exited").fg, Some(theme.palette.error));
    }
}
