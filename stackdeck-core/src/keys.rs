/// Terminal-independent key press, mapped from the terminal backend's events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Up,
    Down,
    PageUp,
    PageDown,
    CtrlC,
    /// Anything the dashboard has no binding for.
    Other,
}

impl Key {
    pub fn is_up(&self) -> bool {
        matches!(self, Key::Up | Key::Char('k'))
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Key::Down | Key::Char('j'))
    }

    pub fn is_back(&self) -> bool {
        matches!(self, Key::Esc | Key::Backspace)
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Key::Char('q') | Key::CtrlC)
    }

    pub fn is_confirm(&self) -> bool {
        matches!(self, Key::Char('y'))
    }
}

/// One entry of the on-screen key hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub desc: &'static str,
}

const fn hint(key: &'static str, desc: &'static str) -> KeyHint {
    KeyHint { key, desc }
}

pub const DASHBOARD_HINTS: &[KeyHint] = &[
    hint("s", "start"),
    hint("S", "stop"),
    hint("r", "restart"),
    hint("a", "start all"),
    hint("A", "stop all"),
    hint("P", "poweroff"),
    hint("l", "launch"),
    hint("m", "mailpit"),
    hint("x", "xhgui"),
    hint("C", "config"),
    hint("enter", "detail"),
    hint("/", "filter"),
    hint("?", "help"),
    hint("q", "quit"),
];

pub const DETAIL_HINTS: &[KeyHint] = &[
    hint("s", "start"),
    hint("S", "stop"),
    hint("r", "restart"),
    hint("l", "launch"),
    hint("m", "mailpit"),
    hint("x", "xhgui"),
    hint("X", "xdebug"),
    hint("c", "copy url"),
    hint("e", "ssh"),
    hint("L", "logs"),
    hint("R", "refresh"),
    hint("esc", "back"),
];

pub const STREAM_HINTS: &[KeyHint] = &[hint("esc", "back"), hint("q", "quit")];

/// Sections of the help overlay: (heading, [(keys, description)]).
pub const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("up/k, down/j", "Move selection"),
            ("pgup/pgdown", "Move by one page"),
            ("enter/d", "Open project detail"),
            ("/", "Filter projects"),
            ("esc", "Back / clear filter"),
        ],
    ),
    (
        "Actions",
        &[
            ("s", "Start selected project"),
            ("S", "Stop selected project"),
            ("r", "Restart selected project"),
            ("a", "Start all projects"),
            ("A", "Stop all projects"),
            ("P", "Poweroff all projects and containers"),
            ("C", "Run config interactively"),
            ("l", "Launch project URL in browser"),
            ("m", "Launch Mailpit in browser"),
            ("x", "Launch XHGui"),
            ("X", "Toggle Xdebug on/off (detail view)"),
            ("c", "Copy primary URL to clipboard (detail view)"),
            ("e", "SSH into web container (detail view)"),
            ("L", "Follow logs (detail view)"),
            ("R", "Refresh"),
        ],
    ),
    ("Other", &[("?", "Toggle this help"), ("q, ctrl+c", "Quit")]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vim_keys_alias_arrows() {
        assert!(Key::Char('k').is_up());
        assert!(Key::Up.is_up());
        assert!(Key::Char('j').is_down());
        assert!(!Key::Char('J').is_down());
    }

    #[test]
    fn test_back_and_quit() {
        assert!(Key::Esc.is_back());
        assert!(Key::Backspace.is_back());
        assert!(Key::CtrlC.is_quit());
        assert!(!Key::Char('Q').is_quit());
    }
}
