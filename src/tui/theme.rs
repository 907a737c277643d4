use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::{TodoStatus, UiConfig};

/// Tags that get a color out of the box
const DEFAULT_TAG_COLORS: &[(&str, Color)] = &[
    ("home", Color::Rgb(0x44, 0xFF, 0x88)),
    ("work", Color::Rgb(0x44, 0x88, 0xFF)),
    ("urgent", Color::Rgb(0xFF, 0x44, 0x44)),
    ("errand", Color::Rgb(0x44, 0xDD, 0xFF)),
    ("idea", Color::Rgb(0xCC, 0x66, 0xFF)),
    ("waiting", Color::Rgb(0xFF, 0xD7, 0x00)),
];

/// Colors used by the todo list, overlays and status row
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// DOING todo, palette selector, focused row bar
    pub highlight: Color,
    pub dim: Color,
    /// Important marker, error toasts and the confirm dialog border
    pub red: Color,
    /// Success toasts
    pub green: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub selection_id: Color,
    pub match_bg: Color,
    pub match_fg: Color,
    pub tag_colors: HashMap<String, Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            selection_id: Color::Rgb(0xDA, 0xB8, 0xF0),
            match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            match_fg: Color::Rgb(0x0C, 0x00, 0x1B),
            tag_colors: DEFAULT_TAG_COLORS
                .iter()
                .map(|(tag, color)| (tag.to_string(), *color))
                .collect(),
        }
    }
}

/// `#RRGGBB` to an RGB color. Anything but exactly six hex digits is
/// rejected.
fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl Theme {
    /// Defaults with the `[ui.colors]` and `[ui.tag_colors]` overrides
    /// applied. Unknown names and unparsable values are skipped.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (name, value) in &ui.colors {
            match (theme.slot_mut(name), parse_hex_color(value)) {
                (Some(slot), Some(color)) => *slot = color,
                (None, _) => tracing::warn!(name = %name, "unknown theme color"),
                (_, None) => tracing::warn!(name = %name, value = %value, "invalid theme color"),
            }
        }
        for (tag, value) in &ui.tag_colors {
            if let Some(color) = parse_hex_color(value) {
                theme.tag_colors.insert(tag.clone(), color);
            }
        }

        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        let slot = match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "highlight" => &mut self.highlight,
            "dim" => &mut self.dim,
            "red" => &mut self.red,
            "green" => &mut self.green,
            "selection_bg" => &mut self.selection_bg,
            "selection_border" => &mut self.selection_border,
            "selection_id" => &mut self.selection_id,
            "match_bg" => &mut self.match_bg,
            "match_fg" => &mut self.match_fg,
            _ => return None,
        };
        Some(slot)
    }

    /// Color for `#tag`, plain text when the tag has none
    pub fn tag_color(&self, tag: &str) -> Color {
        self.tag_colors.get(tag).copied().unwrap_or(self.text)
    }

    pub fn status_color(&self, status: TodoStatus) -> Color {
        match status {
            TodoStatus::Todo => self.text,
            TodoStatus::Doing => self.highlight,
            TodoStatus::Done => self.dim,
        }
    }
}
