use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

use super::*;

/// Keys that stand in for a registered shortcut. Escape only means "back"
/// while something is focused.
fn alias(shortcut: &str, focused: bool) -> Option<&'static str> {
    match shortcut {
        "ArrowDown" => Some("J"),
        "ArrowUp" => Some("K"),
        "ArrowRight" | "Enter" => Some("L"),
        "ArrowLeft" => Some("H"),
        "Shift+ArrowUp" => Some("Shift+K"),
        "Shift+ArrowDown" => Some("Shift+J"),
        "X" | "Backspace" => Some("Delete"),
        "!" => Some("P"),
        "Escape" if focused => Some("H"),
        _ => None,
    }
}

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                app.focus.jump_to_index(&app.repo, index);
                return;
            }
            KeyCode::Char('/') => {
                app.open_compose("/");
                return;
            }
            KeyCode::Char('i') | KeyCode::Char('a') => {
                app.open_compose("");
                return;
            }
            _ => {}
        }
    }

    let Some(shortcut) = shortcut_for(key) else {
        return;
    };
    if app.execute_by_shortcut(&shortcut) {
        return;
    }
    if let Some(aliased) = alias(&shortcut, app.focus.has_focus()) {
        app.execute_by_shortcut(aliased);
    }
}
