//! Event loop: terminal events and task results in, frames out.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use stackdeck_core::config::DashboardConfig;
use stackdeck_core::keys::Key;
use stackdeck_core::reducer::{Message, init, update};
use stackdeck_core::state::DashboardState;
use stackdeck_core::task::Task;

use crate::backend::Backend;
use crate::executor::{Dispatch, Executor};
use crate::ui::{self, Theme};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Term) -> io::Result<()> {
    suspend_terminal(&mut terminal)
}

/// Hand the terminal back to the shell without dropping it.
fn suspend_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn resume_terminal(terminal: &mut Term) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()
}

/// Map a terminal event to a dashboard message. Only key presses count.
fn translate(event: Event) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Message::Key(map_key(key))),
        Event::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::CtrlC,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => Key::Other,
    }
}

/// Blocking terminal-event reader on its own thread.
///
/// Pausing stops it from touching stdin so an interactive child can own it.
struct Reader {
    paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Reader {
    fn spawn(tx: mpsc::UnboundedSender<Message>) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let paused = paused.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if paused.load(Ordering::Relaxed) {
                        thread::sleep(POLL_INTERVAL);
                        continue;
                    }
                    match event::poll(POLL_INTERVAL) {
                        Ok(false) => {}
                        Ok(true) => match event::read() {
                            Ok(ev) => {
                                if let Some(msg) = translate(ev) {
                                    if tx.send(msg).is_err() {
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "terminal read failed");
                                break;
                            }
                        },
                        Err(e) => {
                            warn!(error = %e, "terminal poll failed");
                            break;
                        }
                    }
                }
            })
        };
        Self {
            paused,
            stop,
            handle: Some(handle),
        }
    }

    async fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
        // Let an in-flight poll finish before the child reads stdin.
        tokio::time::sleep(POLL_INTERVAL * 2).await;
    }

    fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub async fn run(
    config: &DashboardConfig,
    backend: Arc<dyn Backend>,
    theme: Theme,
) -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, config, backend, &theme).await;
    restore_terminal(terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Term,
    config: &DashboardConfig,
    backend: Arc<dyn Backend>,
    theme: &Theme,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let reader = Reader::spawn(tx.clone());
    let mut executor = Executor::new(backend, tx.clone());
    let mut state = DashboardState::new(config.timings());

    let size = terminal.size()?;
    let _ = tx.send(Message::Resize {
        width: size.width,
        height: size.height,
    });

    let mut pending: VecDeque<Task> = init(&state).into();
    info!("dashboard started");

    loop {
        while let Some(task) = pending.pop_front() {
            match executor.dispatch(task) {
                Dispatch::Spawned => {}
                Dispatch::Interactive(run) => {
                    debug!(?run, "handing over terminal");
                    reader.pause().await;
                    suspend_terminal(terminal)?;
                    executor.run_interactive(run).await;
                    resume_terminal(terminal)?;
                    reader.resume();
                }
                Dispatch::Quit => {
                    info!("quitting");
                    drop(reader);
                    executor.shutdown().await;
                    return Ok(());
                }
            }
        }

        terminal.draw(|f| ui::render(f, &state, theme))?;

        let msg = tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => msg,
                None => return Ok(()),
            },
            msg = state.next_stream_message() => msg,
        };
        pending.extend(update(&mut state, msg));
    }
}
