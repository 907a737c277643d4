use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::{centered_rect_fixed, wrap_text};

/// Render an informational popup (title plus body lines)
pub fn render_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(popup) = &app.popup else {
        return;
    };

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let bg = app.theme.background;
    let highlight = app.theme.highlight;
    let header_style = Style::default()
        .fg(highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let hint_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut styled_lines: Vec<(String, Style)> = Vec::new();
    styled_lines.push((format!(" {}", popup.title), header_style));
    styled_lines.push((String::new(), text_style));
    for line in &popup.lines {
        for s in wrap_text(" ", line, inner_w) {
            styled_lines.push((s, text_style));
        }
    }
    styled_lines.push((String::new(), text_style));
    styled_lines.push((" Press any key to close".into(), hint_style));

    draw_box(frame, app, area, popup_w, styled_lines);
}

/// Render the yes/no confirmation dialog
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(confirm) = &app.confirm else {
        return;
    };

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let hint_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut styled_lines: Vec<(String, Style)> = Vec::new();
    for s in wrap_text(" ", &confirm.message, inner_w) {
        styled_lines.push((s, text_style));
    }
    styled_lines.push((String::new(), text_style));

    let hint = Line::from(vec![
        Span::styled(" y", key_style),
        Span::styled(" confirm  ", hint_style),
        Span::styled("n", key_style),
        Span::styled(" cancel", hint_style),
    ]);

    let mut lines: Vec<Line> = styled_lines
        .into_iter()
        .map(|(text, style)| Line::from(Span::styled(text, style)))
        .collect();
    lines.push(hint);

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );
}

fn draw_box(frame: &mut Frame, app: &App, area: Rect, popup_w: u16, styled_lines: Vec<(String, Style)>) {
    let bg = app.theme.background;
    let popup_h = ((styled_lines.len() as u16) + 2).min(area.height.saturating_sub(2));

    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let lines: Vec<Line> = styled_lines
        .into_iter()
        .map(|(text, style)| Line::from(Span::styled(text, style)))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::{ConfirmAction, ConfirmState, Popup};
    use crate::tui::render::test_helpers::*;

    #[test]
    fn popup_shows_title_and_lines() {
        let mut app = app_with_todos(&[]);
        app.popup = Some(Popup {
            title: "Statistics".into(),
            lines: vec!["Total: 3".into(), "Done: 1".into()],
        });
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_popup(frame, &app, area);
        });
        assert!(output.contains("Statistics"));
        assert!(output.contains("Total: 3"));
        assert!(output.contains("Done: 1"));
        assert!(output.contains("Press any key to close"));
    }

    #[test]
    fn confirm_shows_message_and_keys() {
        let mut app = app_with_todos(&[]);
        app.confirm = Some(ConfirmState {
            message: "Clear 2 done todos?".into(),
            action: ConfirmAction::ClearDone,
        });
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_confirm(frame, &app, area);
        });
        assert!(output.contains("Clear 2 done todos?"));
        assert!(output.contains("y confirm  n cancel"));
    }

    #[test]
    fn nothing_pending_draws_nothing() {
        let app = app_with_todos(&[]);
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_popup(frame, &app, area);
            render_confirm(frame, &app, area);
        });
        assert_eq!(output, "");
    }
}
