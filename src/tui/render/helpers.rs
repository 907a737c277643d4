use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::model::TodoStatus;
use crate::util::unicode;

/// Checkbox symbol for each status
pub(super) fn status_symbol(status: TodoStatus) -> String {
    format!("[{}]", status.checkbox_char())
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Cut spans so their combined display width fits in `max_width`
pub(super) fn truncate_spans(spans: &mut Vec<Span<'_>>, max_width: usize) {
    let mut total = 0usize;
    let mut truncate_at = spans.len();

    for (i, span) in spans.iter().enumerate() {
        let span_width = unicode::display_width(&span.content);
        if total + span_width > max_width {
            truncate_at = i;
            let remaining = max_width.saturating_sub(total);
            if remaining > 0 {
                let truncated = unicode::truncate_to_width(&span.content, remaining);
                spans[i] = Span::styled(truncated, span.style);
                truncate_at = i + 1;
            }
            break;
        }
        total += span_width;
    }

    spans.truncate(truncate_at);
}

/// Word-wrap `text` into lines of at most `max_width` cells.
/// Every line (including the first) is prefixed with `indent`.
pub(super) fn wrap_text(indent: &str, text: &str, max_width: usize) -> Vec<String> {
    let indent_w = unicode::display_width(indent);
    let mut lines = Vec::new();
    let mut current = indent.to_string();
    let mut current_w = indent_w;

    for word in text.split_whitespace() {
        let word_w = unicode::display_width(word);
        let space = usize::from(current_w > indent_w);
        if current_w + space + word_w > max_width && current_w > indent_w {
            lines.push(std::mem::replace(&mut current, indent.to_string()));
            current_w = indent_w;
        }
        if current_w > indent_w {
            current.push(' ');
            current_w += 1;
        }
        current.push_str(word);
        current_w += word_w;
    }
    if current_w > indent_w || lines.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
