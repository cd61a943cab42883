// Input - key reading and per-screen key bindings

use crate::wizard::gallery::ActivationKey;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};

/// Raw mode for the lifetime of the guard
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Wait for a single key press
pub async fn next_key() -> io::Result<KeyEvent> {
    tokio::task::spawn_blocking(|| {
        let _guard = RawModeGuard::enter()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    })
    .await
    .map_err(io::Error::other)?
}

/// Read one line in cooked mode
pub async fn read_line(prompt: &str) -> io::Result<String> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await
    .map_err(io::Error::other)?
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsAction {
    Professional,
    Creative,
    Custom,
    StartOver,
    Quit,
}

pub fn options_action(key: &KeyEvent) -> Option<OptionsAction> {
    if is_quit(key) {
        return Some(OptionsAction::Quit);
    }

    match key.code {
        KeyCode::Char('1') | KeyCode::Char('p') => Some(OptionsAction::Professional),
        KeyCode::Char('2') | KeyCode::Char('c') => Some(OptionsAction::Creative),
        KeyCode::Char('3') | KeyCode::Char('w') => Some(OptionsAction::Custom),
        KeyCode::Char('b') | KeyCode::Char('s') => Some(OptionsAction::StartOver),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsAction {
    Previous,
    Next,
    Select(usize),
    FocusNext,
    FocusPrevious,
    Activate(ActivationKey),
    Download,
    StartOver,
    Quit,
}

pub fn results_action(key: &KeyEvent) -> Option<ResultsAction> {
    if is_quit(key) {
        return Some(ResultsAction::Quit);
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(ResultsAction::Previous),
        KeyCode::Right | KeyCode::Char('l') => Some(ResultsAction::Next),
        KeyCode::Char(c) if c.is_ascii_digit() => c
            .to_digit(10)
            .map(|d| ResultsAction::Select(d as usize)),
        KeyCode::Tab => Some(ResultsAction::FocusNext),
        KeyCode::BackTab => Some(ResultsAction::FocusPrevious),
        KeyCode::Enter => Some(ResultsAction::Activate(ActivationKey::Enter)),
        KeyCode::Char(' ') => Some(ResultsAction::Activate(ActivationKey::Space)),
        KeyCode::Char('d') => Some(ResultsAction::Download),
        KeyCode::Char('s') => Some(ResultsAction::StartOver),
        _ => None,
    }
}
