use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::unicode;

/// Keys while the command palette is open
pub(super) fn handle_command(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => app.commands.close(),
        (_, KeyCode::Enter) => {
            if !app.execute_selected() {
                app.commands.close();
            }
        }
        (_, KeyCode::Up) | (_, KeyCode::BackTab) => app.commands.select_prev(),
        (_, KeyCode::Down) | (_, KeyCode::Tab) => {
            app.commands.select_next(app.focus.state(), &app.repo);
        }
        (_, KeyCode::Char('p')) if ctrl => app.commands.select_prev(),
        (_, KeyCode::Char('n')) if ctrl => {
            app.commands.select_next(app.focus.state(), &app.repo);
        }
        (_, KeyCode::Char('k')) if ctrl => app.commands.close(),
        (_, KeyCode::Char('u')) if ctrl => app.commands.set_filter(""),
        (_, KeyCode::Backspace) => {
            let filter = app.commands.filter();
            if filter.is_empty() {
                app.commands.close();
            } else {
                let end = unicode::prev_grapheme_boundary(filter, filter.len()).unwrap_or(0);
                let shorter = filter[..end].to_string();
                app.commands.set_filter(&shorter);
            }
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) && !m.contains(KeyModifiers::ALT) => {
            let mut filter = app.commands.filter().to_string();
            filter.push(c);
            app.commands.set_filter(&filter);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Config, Priority};
    use crate::ops::todo_ops::TodoRepository;
    use pretty_assertions::assert_eq;

    fn app_with(contents: &[&str]) -> App {
        let mut repo = TodoRepository::new();
        for c in contents {
            repo.add(c, Priority::Default, vec![]);
        }
        App::new(repo, &Config::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_filters_and_enter_runs() {
        let mut app = app_with(&["a"]);
        app.commands.open();
        for c in "statis".chars() {
            handle_command(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.commands.filter(), "statis");
        handle_command(&mut app, key(KeyCode::Enter));
        assert!(!app.commands.is_open());
        assert_eq!(app.popup.as_ref().map(|p| p.title.as_str()), Some("Statistics"));
    }

    #[test]
    fn enter_with_no_match_just_closes() {
        let mut app = app_with(&[]);
        app.commands.open();
        app.commands.set_filter("no such command");
        handle_command(&mut app, key(KeyCode::Enter));
        assert!(!app.commands.is_open());
        assert!(app.commands.recent_ids().is_empty());
    }

    #[test]
    fn backspace_trims_then_closes() {
        let mut app = app_with(&[]);
        app.commands.open();
        app.commands.set_filter("ab");
        handle_command(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.commands.filter(), "a");
        handle_command(&mut app, key(KeyCode::Backspace));
        handle_command(&mut app, key(KeyCode::Backspace));
        assert!(!app.commands.is_open());
    }

    #[test]
    fn arrows_move_selection() {
        let mut app = app_with(&[]);
        app.commands.open();
        handle_command(&mut app, key(KeyCode::Down));
        handle_command(&mut app, key(KeyCode::Down));
        assert_eq!(app.commands.selected_index(), 2);
        handle_command(&mut app, key(KeyCode::Up));
        assert_eq!(app.commands.selected_index(), 1);
    }
}
