use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::command_actions::run_confirmed;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y or Enter
        (KeyModifiers::NONE, KeyCode::Char('y')) | (_, KeyCode::Enter) => {
            if let Some(state) = app.confirm.take() {
                run_confirmed(app, state.action);
            }
        }
        // Cancel: n or Esc
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm = None;
        }
        _ => {}
    }
}

/// Any key dismisses a popup
pub(super) fn handle_popup(app: &mut App, _key: KeyEvent) {
    app.popup = None;
}

pub(super) fn handle_help(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
        app.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Config, Priority};
    use crate::ops::todo_ops::TodoRepository;
    use crate::tui::app::{ConfirmAction, ConfirmState};

    fn app_pending_delete() -> App {
        let mut repo = TodoRepository::new();
        let id = repo.add("a", Priority::Default, vec![]);
        let mut app = App::new(repo, &Config::default());
        app.confirm = Some(ConfirmState {
            message: "Delete \"a\"?".into(),
            action: ConfirmAction::DeleteTodo { todo_id: id },
        });
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn y_confirms() {
        let mut app = app_pending_delete();
        handle_confirm(&mut app, key(KeyCode::Char('y')));
        assert!(app.confirm.is_none());
        assert!(app.repo.is_empty());
    }

    #[test]
    fn esc_cancels() {
        let mut app = app_pending_delete();
        handle_confirm(&mut app, key(KeyCode::Esc));
        assert!(app.confirm.is_none());
        assert_eq!(app.repo.len(), 1);
    }

    #[test]
    fn other_keys_keep_asking() {
        let mut app = app_pending_delete();
        handle_confirm(&mut app, key(KeyCode::Char('x')));
        assert!(app.confirm.is_some());
    }
}
