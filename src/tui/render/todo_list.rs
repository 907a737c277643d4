use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{EditTarget, Note, Todo, TodoStatus};
use crate::tui::app::App;
use crate::tui::line_buffer::LineBuffer;

use super::helpers::{spans_width, status_symbol, truncate_spans};

const NOTE_INDENT: &str = "        ";

/// Render the todo list with the focused todo's notes expanded under it
pub fn render_todo_list(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let visible = app.repo.visible_todos();

    if visible.is_empty() {
        let empty = Paragraph::new(" No todos. Press i to add one.")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let focus = app.focus.state();
    let mut lines: Vec<Line> = Vec::new();
    let mut focus_row: Option<usize> = None;
    let mut cursor: Option<(usize, u16)> = None;

    for (index, todo) in visible.iter().enumerate() {
        let is_focused = focus.todo_id() == Some(todo.id.as_str());
        let edit = editing_buffer(app, EditTarget::Todo, &todo.id, None);
        let selected = is_focused && (focus.is_todo() || edit.is_some());

        if selected {
            focus_row = Some(lines.len());
        }
        let (line, edit_col) = todo_line(app, todo, index, selected, is_focused, edit, width);
        if let Some(col) = edit_col {
            cursor = Some((lines.len(), col));
        }
        lines.push(line);

        if !is_focused {
            continue;
        }
        for note in &todo.notes {
            let edit = editing_buffer(app, EditTarget::Note, &todo.id, Some(&note.id));
            let note_selected = focus.note_id() == Some(note.id.as_str());
            if note_selected {
                focus_row = Some(lines.len());
            }
            let (line, edit_col) = note_line(app, todo, note, note_selected, edit, width);
            if let Some(col) = edit_col {
                cursor = Some((lines.len(), col));
            }
            lines.push(line);
        }
    }

    if app.repo.is_focus_mode() {
        let hidden = app.repo.len().saturating_sub(1);
        if hidden > 0 {
            lines.push(Line::from(Span::styled(
                format!(
                    "   {} other todo{} hidden while one is in progress",
                    hidden,
                    if hidden == 1 { "" } else { "s" }
                ),
                Style::default().fg(app.theme.dim).bg(bg),
            )));
        }
    }

    // Keep the focused row on screen
    let height = area.height as usize;
    let scroll = focus_row.map_or(0, |row| (row + 1).saturating_sub(height));
    let shown: Vec<Line> = lines.into_iter().skip(scroll).take(height).collect();

    let paragraph = Paragraph::new(shown).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);

    if let Some((row, col)) = cursor
        && row >= scroll
        && row < scroll + height
    {
        frame.set_cursor_position((area.x + col, area.y + (row - scroll) as u16));
    }
}

/// The live edit buffer, if the given todo or note is being edited
fn editing_buffer<'a>(
    app: &'a App,
    target: EditTarget,
    todo_id: &str,
    note_id: Option<&str>,
) -> Option<&'a LineBuffer> {
    if !app.focus.is_editing() {
        return None;
    }
    app.edit
        .as_ref()
        .filter(|s| s.target == target && s.todo_id == todo_id && s.note_id.as_deref() == note_id)
        .map(|s| &s.buffer)
}

fn todo_line(
    app: &App,
    todo: &Todo,
    index: usize,
    selected: bool,
    expanded: bool,
    edit: Option<&LineBuffer>,
    width: usize,
) -> (Line<'static>, Option<u16>) {
    let theme = &app.theme;
    let row_bg = if selected { theme.selection_bg } else { theme.background };
    let dim_style = Style::default().fg(theme.dim).bg(row_bg);
    let mut spans: Vec<Span<'static>> = Vec::new();

    // Column 0: accent bar on the focused row
    if selected {
        spans.push(Span::styled(
            "\u{258E}",
            Style::default().fg(theme.selection_border).bg(row_bg),
        ));
    } else {
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
    }

    let index_style = if selected {
        Style::default().fg(theme.selection_id).bg(row_bg)
    } else {
        dim_style
    };
    spans.push(Span::styled(format!("{:>2} ", index + 1), index_style));
    spans.push(Span::styled(
        format!("{} ", status_symbol(todo.status)),
        Style::default().fg(theme.status_color(todo.status)).bg(row_bg),
    ));
    if todo.is_important() {
        spans.push(Span::styled(
            "! ",
            Style::default()
                .fg(theme.red)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled("  ", Style::default().bg(row_bg)));
    }

    let mut edit_col = None;
    match edit {
        Some(buffer) => {
            edit_col = Some((spans_width(&spans) + buffer.cursor_col()) as u16);
            spans.push(Span::styled(
                buffer.text().to_string(),
                Style::default().fg(theme.text_bright).bg(row_bg),
            ));
        }
        None => {
            let content_style = match todo.status {
                TodoStatus::Done => Style::default()
                    .fg(theme.dim)
                    .bg(row_bg)
                    .add_modifier(Modifier::CROSSED_OUT),
                TodoStatus::Doing => Style::default()
                    .fg(theme.highlight)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD),
                TodoStatus::Todo if selected => Style::default().fg(theme.text_bright).bg(row_bg),
                TodoStatus::Todo => Style::default().fg(theme.text).bg(row_bg),
            };
            spans.push(Span::styled(todo.content.clone(), content_style));
        }
    }

    for tag in &todo.tags {
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        spans.push(Span::styled(
            format!("#{}", tag),
            Style::default().fg(theme.tag_color(tag)).bg(row_bg),
        ));
    }
    if !expanded && !todo.notes.is_empty() {
        spans.push(Span::styled(format!(" ({})", todo.notes.len()), dim_style));
    }

    (finish_row(spans, row_bg, width), edit_col)
}

fn note_line(
    app: &App,
    todo: &Todo,
    note: &Note,
    selected: bool,
    edit: Option<&LineBuffer>,
    width: usize,
) -> (Line<'static>, Option<u16>) {
    let theme = &app.theme;
    let row_bg = if selected { theme.selection_bg } else { theme.background };
    let mut spans: Vec<Span<'static>> = Vec::new();

    if selected {
        spans.push(Span::styled(
            "\u{258E}",
            Style::default().fg(theme.selection_border).bg(row_bg),
        ));
    } else {
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
    }
    spans.push(Span::styled(NOTE_INDENT, Style::default().bg(row_bg)));
    spans.push(Span::styled(
        "\u{2022} ",
        Style::default().fg(theme.dim).bg(row_bg),
    ));

    let mut edit_col = None;
    match edit {
        Some(buffer) => {
            edit_col = Some((spans_width(&spans) + buffer.cursor_col()) as u16);
            spans.push(Span::styled(
                buffer.text().to_string(),
                Style::default().fg(theme.text_bright).bg(row_bg),
            ));
        }
        None => {
            let fg = if todo.is_done() {
                theme.dim
            } else if selected {
                theme.text_bright
            } else {
                theme.text
            };
            spans.push(Span::styled(
                note.content.clone(),
                Style::default().fg(fg).bg(row_bg),
            ));
        }
    }

    (finish_row(spans, row_bg, width), edit_col)
}

/// Clip to `width` and pad with the row background
fn finish_row(mut spans: Vec<Span<'static>>, row_bg: ratatui::style::Color, width: usize) -> Line<'static> {
    truncate_spans(&mut spans, width);
    let used = spans_width(&spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(row_bg)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, 10, |frame, area| {
            render_todo_list(frame, app, area);
        })
    }

    #[test]
    fn empty_list_shows_hint() {
        let app = app_with_todos(&[]);
        assert_eq!(render(&app), " No todos. Press i to add one.");
    }

    #[test]
    fn rows_show_index_status_priority_and_tags() {
        let app = sample_app();
        let output = render(&app);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows[0], "  1 [ ] ! Buy milk #home");
        assert_eq!(rows[1], "  2 [ ]   Write report #work (1)");
        assert_eq!(rows[2], "  3 [x]   Water plants");
    }

    #[test]
    fn focused_todo_expands_its_notes() {
        let mut app = sample_app();
        let report = id_at(&app, 1);
        app.focus.focus_todo(&report);
        let output = render(&app);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows[1], "\u{258E} 2 [ ]   Write report #work");
        assert_eq!(rows[2], "         \u{2022} first draft due friday");
        assert_eq!(rows[3], "  3 [x]   Water plants");
    }

    #[test]
    fn focus_mode_shows_only_the_doing_todo() {
        let mut app = sample_app();
        let milk = id_at(&app, 0);
        app.repo.start(&milk);
        let output = render(&app);
        assert!(output.contains("1 [>] ! Buy milk"));
        assert!(!output.contains("Write report"));
        assert!(output.contains("2 other todos hidden while one is in progress"));
    }

    #[test]
    fn editing_shows_the_buffer() {
        let mut app = sample_app();
        let milk = id_at(&app, 0);
        app.focus.focus_todo(&milk);
        app.begin_edit(EditTarget::Todo, &milk, None, false);
        if let Some(session) = app.edit.as_mut() {
            session.buffer.insert_str(" and bread");
        }
        let output = render(&app);
        assert!(output.contains("Buy milk and bread #home"));
    }
}
