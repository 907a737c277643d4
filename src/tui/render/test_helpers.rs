use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::{Config, Priority, TodoStatus};
use crate::ops::todo_ops::TodoRepository;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over the given todo contents, all TODO, no focus.
pub fn app_with_todos(contents: &[&str]) -> App {
    let mut repo = TodoRepository::new();
    for content in contents {
        repo.add(content, Priority::Default, vec![]);
    }
    App::new(repo, &Config::default())
}

/// A small list exercising every status, a tag and a note.
pub fn sample_app() -> App {
    let mut repo = TodoRepository::new();
    repo.add("Buy milk", Priority::Important, vec!["home".into()]);
    let report = repo.add("Write report", Priority::Default, vec!["work".into()]);
    let plants = repo.add("Water plants", Priority::Default, vec![]);
    repo.add_note(&report, "first draft due friday");
    repo.set_status(&plants, TodoStatus::Done);
    App::new(repo, &Config::default())
}

/// Id of the todo at `index` in list order
pub fn id_at(app: &App, index: usize) -> String {
    app.repo.todos()[index].id.clone()
}
