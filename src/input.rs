//! Key bindings for the play screen; settings are slider-like and live on keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press while playing (or paused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pause,
    Restart,
    Quit,
    SpeedUp,
    SpeedDown,
    SizeUp,
    SizeDown,
    SpacingUp,
    SpacingDown,
    None,
}

/// Map key event to game action. Arrows adjust speed/spacing, PgUp/PgDn
/// adjust text size.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => Action::SpeedUp,
        KeyCode::Down | KeyCode::Char('-') => Action::SpeedDown,
        KeyCode::PageUp => Action::SizeUp,
        KeyCode::PageDown => Action::SizeDown,
        KeyCode::Right => Action::SpacingUp,
        KeyCode::Left => Action::SpacingDown,
        _ => Action::None,
    }
}
