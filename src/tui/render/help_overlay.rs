use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const KEY_WIDTH: usize = 14;

/// Section headings, keyed by command id prefix
const SECTIONS: [(&str, &str); 4] = [
    ("todo", "Todo"),
    ("note", "Note"),
    ("global", "Global"),
    ("nav", "Navigation"),
];

/// Keys handled outside the command catalogue
const EXTRA_KEYS: [(&str, &str); 4] = [
    ("i / a", "Compose a new todo"),
    ("/", "Run a command by name"),
    ("1-9", "Jump to todo N"),
    ("\u{2191}\u{2193}\u{2190}\u{2192}", "Same as K J H L"),
];

/// Render the help overlay (toggled with ?). Built from the live command
/// catalogue so it always matches the bindings.
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(90, 100, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let text_color = app.theme.text;
    let bright = app.theme.text_bright;
    let highlight = app.theme.highlight;
    let dim = app.theme.dim;

    let key_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(text_color).bg(bg);
    let header_style = Style::default()
        .fg(bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .title(Span::styled(" Key Bindings ", header_style))
        .style(Style::default().bg(bg));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut sections: Vec<Vec<Line>> = SECTIONS
        .iter()
        .map(|(prefix, title)| {
            let mut lines = vec![Line::from(Span::styled(format!(" {}", title), header_style))];
            for command in app.commands.commands() {
                let in_section = command
                    .id
                    .split_once(':')
                    .is_some_and(|(p, _)| p == *prefix);
                if in_section && let Some(shortcut) = &command.shortcut {
                    add_binding(&mut lines, shortcut, &command.name, key_style, desc_style);
                }
            }
            lines
        })
        .collect();

    let mut extra = vec![Line::from(Span::styled(" Other", header_style))];
    for (key, desc) in EXTRA_KEYS {
        add_binding(&mut extra, key, desc, key_style, desc_style);
    }
    sections.push(extra);

    // Todo and Note on the left, the rest on the right
    let right = join_sections(sections.split_off(2));
    let left = join_sections(sections);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(left).style(Style::default().bg(bg)),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(right).style(Style::default().bg(bg)),
        columns[1],
    );
}

fn join_sections(sections: Vec<Vec<Line<'_>>>) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for (i, section) in sections.into_iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(section);
    }
    lines
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let padded_key = format!(" {:<width$}", key, width = KEY_WIDTH);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
