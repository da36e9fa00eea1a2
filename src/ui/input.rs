//! Input handling for the TUI.
//!
//! This module handles keyboard input and translates it into application actions.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Actions that can be performed based on user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Quit the application
    Quit,
    /// Toggle help panel
    ToggleHelp,
    /// No action
    None,
}

/// Wait up to `timeout` for a key press and map it to an action
pub fn handle_input(timeout: Duration) -> std::io::Result<InputAction> {
    if event::poll(timeout)? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                return Ok(map_key_to_action(key_event));
            }
        }
    }
    Ok(InputAction::None)
}

/// Map a key event to an application action
fn map_key_to_action(key_event: KeyEvent) -> InputAction {
    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            InputAction::Quit
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => InputAction::Quit,

        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            InputAction::ToggleHelp
        }

        _ => InputAction::None,
    }
}
