pub mod command_palette;
mod helpers;
pub mod help_overlay;
pub mod popup;
pub mod status_row;
#[cfg(test)]
pub mod test_helpers;
pub mod todo_list;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use super::app::App;

/// Main render function: the list, then overlays from bottom to top
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: list | key hints (optional) | status row
    let hint_rows = u16::from(app.show_key_hints);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(hint_rows),
            Constraint::Length(1),
        ])
        .split(area);

    todo_list::render_todo_list(frame, app, chunks[0]);
    if app.show_key_hints {
        status_row::render_key_hints(frame, app, chunks[1]);
    }
    status_row::render_status_row(frame, app, chunks[2]);

    if app.commands.is_open() {
        command_palette::render_command_palette(frame, app, chunks[0]);
    }
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
    if app.popup.is_some() {
        popup::render_popup(frame, app, area);
    }
    if app.confirm.is_some() {
        popup::render_confirm(frame, app, area);
    }
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let re = match search_re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
