use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::parse::{ParsedInput, parse_input};
use crate::tui::app::{App, Mode};
use crate::tui::line_buffer::LineBuffer;

use super::helpers::{spans_width, truncate_spans};

/// Render the status row (bottom of screen): compose line, toast, or hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    if let Some(buffer) = &app.compose {
        render_compose_line(frame, app, buffer, area);
        return;
    }

    let mut spans: Vec<Span> = Vec::new();
    if let Some(message) = &app.status_message {
        let fg = if app.status_is_error {
            app.theme.red
        } else {
            app.theme.green
        };
        spans.push(Span::styled(
            format!(" {}", message),
            Style::default().fg(fg).bg(bg),
        ));
    } else {
        let stats = app.repo.stats();
        spans.push(Span::styled(
            format!(" {} todo{}, {} done", stats.total, plural(stats.total), stats.done),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let hint = match app.mode() {
        Mode::Edit => "Enter save  Esc cancel",
        Mode::Command => "Enter run  Esc close",
        Mode::Confirm => "y confirm  n cancel",
        Mode::Help | Mode::Popup => "Esc close",
        Mode::Compose | Mode::Navigate => "? help  Ctrl+K commands",
    };
    push_right_aligned(&mut spans, hint, Style::default().fg(app.theme.dim).bg(bg), width, bg);
    truncate_spans(&mut spans, width);

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn render_compose_line(frame: &mut Frame, app: &App, buffer: &LineBuffer, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let label = match parse_input(buffer.text(), app.focused_todo_id().is_some()) {
        ParsedInput::NewTodo(_) => "new",
        ParsedInput::Note { .. } => "note",
        ParsedInput::Command { .. } => "run",
        ParsedInput::Select { .. } | ParsedInput::NoteSelect { .. } => "go",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {}> ", label),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            buffer.text().to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
    ];
    let cursor_x = spans_width(&spans[..1]) + buffer.cursor_col();
    push_right_aligned(
        &mut spans,
        "Enter submit  Esc cancel",
        Style::default().fg(app.theme.dim).bg(bg),
        width,
        bg,
    );
    truncate_spans(&mut spans, width);

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);

    if cursor_x < width {
        frame.set_cursor_position((area.x + cursor_x as u16, area.y));
    }
}

/// Render the key-hint line: shortcuts of the commands available right now
pub fn render_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let key_style = Style::default().fg(app.theme.highlight).bg(bg);
    let desc_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans: Vec<Span> = vec![Span::styled(" ", desc_style)];
    for command in app.commands.available(app.focus.state(), &app.repo) {
        let Some(shortcut) = &command.shortcut else {
            continue;
        };
        if command.id.starts_with("nav:") {
            continue;
        }
        spans.push(Span::styled(shortcut.clone(), key_style));
        spans.push(Span::styled(format!(" {}  ", command.name), desc_style));
    }
    truncate_spans(&mut spans, width);

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn push_right_aligned<'a>(
    spans: &mut Vec<Span<'a>>,
    hint: &'a str,
    style: Style,
    width: usize,
    bg: ratatui::style::Color,
) {
    let used = spans_width(spans);
    let hint_width = crate::util::unicode::display_width(hint);
    if used + hint_width + 1 < width {
        spans.push(Span::styled(
            " ".repeat(width - used - hint_width - 1),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, style));
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, app, area);
        })
    }

    #[test]
    fn idle_row_shows_counts_and_hint() {
        let app = sample_app();
        let output = render(&app);
        assert!(output.starts_with(" 3 todos, 1 done"));
        assert!(output.ends_with("? help  Ctrl+K commands"));
    }

    #[test]
    fn toast_replaces_counts() {
        let mut app = sample_app();
        app.notify_error("No todo 9");
        assert!(render(&app).starts_with(" No todo 9"));
    }

    #[test]
    fn compose_line_labels_what_enter_will_do() {
        let mut app = sample_app();
        app.open_compose("milk");
        assert!(render(&app).starts_with(" new> milk"));

        app.open_compose("/undo");
        assert!(render(&app).starts_with(" run> /undo"));

        let id = id_at(&app, 0);
        app.focus.focus_todo(&id);
        app.open_compose("call mum");
        assert!(render(&app).starts_with(" note> call mum"));
    }

    #[test]
    fn key_hints_follow_focus() {
        let mut app = sample_app();
        let hints = |app: &App| {
            render_to_string(300, 1, |frame, area| render_key_hints(frame, app, area))
        };
        assert!(!hints(&app).contains("Start"));
        let id = id_at(&app, 0);
        app.focus.focus_todo(&id);
        let output = hints(&app);
        assert!(output.contains("S Start"));
        assert!(output.contains("Ctrl+N New todo"));
    }
}
