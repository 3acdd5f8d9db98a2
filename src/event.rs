//! Keyboard and mouse event handling.
//!
//! Keys:
//! - `j` / `Down`: scroll down one line
//! - `k` / `Up`: scroll up one line
//! - `PageDown` / `Ctrl+D`, `PageUp` / `Ctrl+U`: scroll one page
//! - `:`: enter command mode (`:q` quits, `:h` shows help)
//!
//! Mouse:
//! - left button press, drag and release: select residues
//! - press on an annotation mark: report the annotation
//! - wheel: scroll

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

use crate::state::{AppMode, AppState};

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (input not recognized)
    None,
    /// Quit the application
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Resize event (terminal resized)
    Resize(u16, u16),
    /// Dismiss the help overlay
    DismissHelp,
    /// Left button pressed at (column, row)
    PointerDown(u16, u16),
    /// Mouse moved with the left button held
    PointerDrag(u16, u16),
    /// Left button released
    PointerUp(u16, u16),
    /// Mouse moved with no button held
    Hover(u16, u16),
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help),
        Event::Mouse(mouse_event) => handle_mouse_event(mouse_event),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('u') => Action::PageUp,
            KeyCode::Char('d') => Action::PageDown,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Char(':') => Action::EnterCommandMode,
        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Handles mouse events. Only the left button selects.
fn handle_mouse_event(mouse: MouseEvent) -> Action {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::PointerDown(column, row),
        MouseEventKind::Drag(MouseButton::Left) => Action::PointerDrag(column, row),
        MouseEventKind::Up(MouseButton::Left) => Action::PointerUp(column, row),
        MouseEventKind::Moved => Action::Hover(column, row),
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ScrollUp => state.scroll_up(),
        Action::ScrollDown => state.scroll_down(),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
        Action::PointerDown(column, row) => state.pointer_down(column, row),
        Action::PointerDrag(column, row) => state.pointer_drag(column, row),
        Action::PointerUp(column, row) => state.pointer_up(column, row),
        Action::Hover(column, row) => state.hover(column, row),
    }

    !state.should_quit
}
