#![forbid(unsafe_code)]

//! Interactive terminal front end.
//!
//! [`TerminalSession`] owns raw mode and the hidden cursor and restores the
//! terminal on drop (and on panic). [`run`] is the event loop: it waits for
//! a key no longer than the engine's nearest inactivity deadline, feeds the
//! key, fires due timeouts, and redraws the panel after every change.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use calc_core::event::KeyEvent;
use calc_core::format::NumberFormat;
use calc_engine::{DisplayModel, Engine, EngineConfig, EngineOutput};
use crossterm::event::{self as cte, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, queue, terminal};

use crate::render;

/// Longest wait between polls when no timer is armed.
const IDLE_POLL: Duration = Duration::from_secs(60);

/// Raw-mode terminal guard.
#[derive(Debug)]
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    /// Enter raw mode and hide the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");
        let session = Self { _private: () };

        execute!(io::stdout(), cursor::Hide)?;
        Ok(session)
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show);
        let _ = terminal::disable_raw_mode();
        tracing::info!("terminal raw mode disabled");
        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let mut stdout = io::stdout();
            let _ = execute!(stdout, cursor::Show);
            let _ = terminal::disable_raw_mode();
            let _ = stdout.flush();
            previous(info);
        }));
    });
}

/// Host-level commands that never reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostKey {
    Quit,
}

fn host_key(event: &cte::KeyEvent) -> Option<HostKey> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Esc => Some(HostKey::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') if event.modifiers.is_empty() => {
            Some(HostKey::Quit)
        }
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(HostKey::Quit)
        }
        _ => None,
    }
}

/// Draw the panel at the top-left of the screen.
fn draw(out: &mut impl Write, view: &DisplayModel) -> io::Result<()> {
    let lines = render::panel(view);
    queue!(out, terminal::Clear(terminal::ClearType::All))?;
    for (row, line) in lines.iter().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16))?;
        out.write_all(line.as_bytes())?;
    }
    queue!(out, cursor::MoveTo(0, lines.len() as u16 + 1))?;
    out.write_all(b"q: quit")?;
    out.flush()
}

/// Run the interactive calculator until the user quits.
///
/// # Errors
///
/// Returns any terminal I/O error.
pub fn run(config: EngineConfig, format: NumberFormat) -> io::Result<()> {
    let _session = TerminalSession::new()?;
    let mut stdout = io::stdout();

    let mut engine = Engine::new(config);
    let mut changed = has_updates(&engine.start());

    loop {
        if changed {
            let view = DisplayModel::project(engine.snapshot(), engine.clear_label(), &format);
            draw(&mut stdout, &view)?;
            changed = false;
        }

        let now = Instant::now();
        let wait = engine.time_until_timeout(now).unwrap_or(IDLE_POLL);
        if !cte::poll(wait)? {
            changed |= has_updates(&engine.check_timeout(Instant::now()));
            continue;
        }

        match cte::read()? {
            Event::Key(key) => {
                if host_key(&key) == Some(HostKey::Quit) {
                    tracing::info!("quit requested");
                    return Ok(());
                }
                if let Some(event) = KeyEvent::from_crossterm(&key) {
                    changed |= has_updates(&engine.feed(event, Instant::now()));
                }
            }
            Event::Resize(..) => changed = true,
            _ => {}
        }
    }
}

fn has_updates(outputs: &[EngineOutput]) -> bool {
    !outputs.is_empty()
}
