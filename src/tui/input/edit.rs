use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::line_buffer::LineEdit;

/// In-place edit of a todo or note
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(session) = app.edit.as_mut() else {
        // Focus says editing but no buffer exists yet; let the
        // post-event sync open one.
        if key.code == KeyCode::Esc {
            app.cancel_edit();
        }
        return;
    };
    match session.buffer.handle_key(key) {
        LineEdit::Submit => app.commit_edit(),
        LineEdit::Cancel => app.cancel_edit(),
        LineEdit::Changed | LineEdit::Moved | LineEdit::Ignored => {}
    }
}

/// The compose line at the bottom of the screen
pub(super) fn handle_compose(app: &mut App, key: KeyEvent) {
    // Ctrl+K from the compose line hands over to the palette
    if key.code == KeyCode::Char('k') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.close_compose();
        app.commands.open();
        return;
    }
    let Some(buffer) = app.compose.as_mut() else {
        return;
    };
    match buffer.handle_key(key) {
        LineEdit::Submit => app.submit_compose(),
        LineEdit::Cancel => app.close_compose(),
        LineEdit::Ignored if key.code == KeyCode::Backspace => {
            // Backspace on an empty line closes it
            app.close_compose();
        }
        LineEdit::Changed | LineEdit::Moved | LineEdit::Ignored => {}
    }
}

/// Insert pasted text into whichever line is taking input
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(session) = app.edit.as_mut()
        && app.focus.is_editing()
    {
        session.buffer.insert_str(text);
    } else if app.commands.is_open() {
        let mut filter = app.commands.filter().to_string();
        filter.push_str(&text.replace(['\n', '\r'], " "));
        app.commands.set_filter(&filter);
    } else if let Some(buffer) = app.compose.as_mut() {
        buffer.insert_str(text);
    }
}
