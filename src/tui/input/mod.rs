mod command;
mod common;
mod confirm;
mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

// Import all submodule functions into this module's namespace
// so that submodules can access cross-module functions via `use super::*;`
#[allow(unused_imports)]
use command::*;
#[allow(unused_imports)]
use common::*;
#[allow(unused_imports)]
use confirm::*;
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use navigate::*;

// Re-export public items
pub use common::shortcut_for;
pub use edit::handle_paste;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    // Toasts last until the next key
    app.clear_status();

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    let key = normalize_key(key);
    match app.mode() {
        Mode::Confirm => handle_confirm(app, key),
        Mode::Popup => handle_popup(app, key),
        Mode::Help => handle_help(app, key),
        Mode::Command => handle_command(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Compose => handle_compose(app, key),
        Mode::Navigate => handle_navigate(app, key),
    }
}
