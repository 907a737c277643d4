use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use regex::{Regex, RegexBuilder};

use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::{spans_width, truncate_spans};
use super::push_highlighted_spans;

const MAX_VISIBLE: usize = 10;
const MAX_INNER_WIDTH: u16 = 60;

/// Render the command palette overlay
pub fn render_command_palette(frame: &mut Frame, app: &App, area: Rect) {
    if !app.commands.is_open() {
        return;
    }

    let bg = app.theme.background;
    let text_color = app.theme.text;
    let bright = app.theme.text_bright;
    let highlight = app.theme.highlight;
    let dim = app.theme.dim;
    let sel_bg = app.theme.selection_bg;

    let prompt_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let input_style = Style::default().fg(bright).bg(bg);
    let cursor_style = Style::default().fg(highlight).bg(bg);
    let normal_style = Style::default().fg(text_color).bg(bg);
    let footer_style = Style::default().fg(dim).bg(bg);
    let blank_style = Style::default().bg(bg);

    let content_width = area.width.saturating_sub(4);
    let inner_w = content_width.min(MAX_INNER_WIDTH) as usize;
    let popup_w = (inner_w as u16) + 2;

    let focus = app.focus.state();
    let results = app.commands.filtered(focus, &app.repo);
    let total = app.commands.available(focus, &app.repo).len();
    let selected = app.commands.selected_index();
    let filter = app.commands.filter();
    let visible_count = results.len().min(MAX_VISIBLE);

    let mut lines: Vec<Line> = Vec::new();

    // Input line: " > filter▌"
    let mut input_spans = vec![
        Span::styled(" > ", prompt_style),
        Span::styled(filter.to_string(), input_style),
        Span::styled("\u{258C}", cursor_style),
    ];
    let input_used = spans_width(&input_spans);
    if input_used < inner_w {
        input_spans.push(Span::styled(" ".repeat(inner_w - input_used), blank_style));
    }
    lines.push(Line::from(input_spans));

    lines.push(Line::from(Span::styled(
        "\u{2500}".repeat(inner_w),
        Style::default().fg(dim).bg(bg),
    )));

    if results.is_empty() {
        lines.push(Line::from(Span::styled(" ".repeat(inner_w), blank_style)));
        let msg = "No matching commands";
        let msg_len = unicode::display_width(msg);
        let left_pad = inner_w.saturating_sub(msg_len) / 2;
        let right_pad = inner_w.saturating_sub(msg_len + left_pad);
        lines.push(Line::from(vec![
            Span::styled(" ".repeat(left_pad), blank_style),
            Span::styled(msg, normal_style),
            Span::styled(" ".repeat(right_pad), blank_style),
        ]));
        lines.push(Line::from(Span::styled(" ".repeat(inner_w), blank_style)));
    } else {
        let match_re = match_regex(filter);
        let scroll_offset = if selected >= visible_count {
            selected - visible_count + 1
        } else {
            0
        };

        for (result_idx, command) in results
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(visible_count)
        {
            let is_selected = result_idx == selected;
            let row_bg = if is_selected { sel_bg } else { bg };
            let row_pad = Style::default().bg(row_bg);
            let indicator_style = if is_selected {
                Style::default()
                    .fg(highlight)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                row_pad
            };
            let label_style = if is_selected {
                Style::default()
                    .fg(bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(text_color).bg(row_bg)
            };
            let hl_style = Style::default()
                .fg(app.theme.match_fg)
                .bg(app.theme.match_bg)
                .add_modifier(Modifier::BOLD);

            let indicator = if is_selected { " \u{25B6} " } else { "   " };
            let mut spans: Vec<Span> = vec![Span::styled(indicator, indicator_style)];
            push_highlighted_spans(
                &mut spans,
                &command.name,
                label_style,
                hl_style,
                match_re.as_ref(),
            );

            // Right-align the shortcut when it fits
            let shortcut = command.shortcut.as_deref().unwrap_or("");
            let label_len = spans_width(&spans);
            let shortcut_len = unicode::display_width(shortcut);
            if !shortcut.is_empty() && label_len + 1 + shortcut_len < inner_w {
                spans.push(Span::styled(
                    " ".repeat(inner_w - label_len - shortcut_len),
                    row_pad,
                ));
                spans.push(Span::styled(
                    shortcut.to_string(),
                    Style::default().fg(dim).bg(row_bg),
                ));
            } else {
                truncate_spans(&mut spans, inner_w);
                let used = spans_width(&spans);
                if used < inner_w {
                    spans.push(Span::styled(" ".repeat(inner_w - used), row_pad));
                }
            }

            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(Span::styled(" ".repeat(inner_w), blank_style)));

    // Footer: "N of M commands"
    let footer_text = format!("   {} of {} commands", results.len(), total);
    let footer_len = unicode::display_width(&footer_text);
    let mut footer_spans = vec![Span::styled(footer_text, footer_style)];
    if footer_len < inner_w {
        footer_spans.push(Span::styled(" ".repeat(inner_w - footer_len), blank_style));
    }
    lines.push(Line::from(footer_spans));

    let popup_h = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));

    // Centered horizontally, near the top
    let x = area.x + area.width.saturating_sub(popup_w) / 2;
    let y = area.y + 2.min(area.height.saturating_sub(popup_h));
    let popup_area = Rect::new(x, y, popup_w.min(area.width), popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, popup_area);
}

/// Case-insensitive literal matcher for the palette filter
fn match_regex(filter: &str) -> Option<Regex> {
    let query = filter.trim();
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, TERM_H, |frame, area| {
            render_command_palette(frame, app, area);
        })
    }

    #[test]
    fn closed_palette_draws_nothing() {
        let app = app_with_todos(&[]);
        assert_eq!(render(&app), "");
    }

    #[test]
    fn lists_commands_with_shortcuts_and_count() {
        let mut app = app_with_todos(&["a"]);
        app.commands.open();
        let output = render(&app);
        assert!(output.contains("> \u{258C}"));
        assert!(output.contains("New todo"));
        assert!(output.contains("Ctrl+N"));
        let total = app.commands.available(app.focus.state(), &app.repo).len();
        assert!(output.contains(&format!("{} of {} commands", total, total)));
    }

    #[test]
    fn filter_narrows_the_list() {
        let mut app = app_with_todos(&[]);
        app.commands.open();
        app.commands.set_filter("undo");
        let output = render(&app);
        assert!(output.contains("> undo"));
        assert!(output.contains("Undo"));
        assert!(!output.contains("New todo"));
    }

    #[test]
    fn empty_result_message() {
        let mut app = app_with_todos(&[]);
        app.commands.open();
        app.commands.set_filter("zzzz");
        let output = render(&app);
        assert!(output.contains("No matching commands"));
        assert!(output.contains("0 of"));
    }

    #[test]
    fn match_regex_is_literal_and_case_insensitive() {
        let re = match_regex("A+").expect("regex");
        assert!(re.is_match("a+b"));
        assert!(!re.is_match("aab"));
        assert!(match_regex("  ").is_none());
    }
}
