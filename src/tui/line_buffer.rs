use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode;

/// A single-line text buffer with a byte-offset cursor that always sits on a
/// grapheme boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

/// What a key did to a [`LineBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    Submit,
    Cancel,
    Changed,
    Moved,
    Ignored,
}

impl LineBuffer {
    /// A buffer holding `text`, cursor at the end
    pub fn with_text(text: &str) -> Self {
        LineBuffer {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in terminal cells from the start of the line
    pub fn cursor_col(&self) -> usize {
        unicode::byte_offset_to_display_col(&self.text, self.cursor)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let clean: String = s.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        self.text.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) -> bool {
        match unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            Some(prev) => {
                self.text.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self) -> bool {
        match unicode::next_grapheme_boundary(&self.text, self.cursor) {
            Some(next) => {
                self.text.drain(self.cursor..next);
                true
            }
            None => false,
        }
    }

    pub fn delete_word_back(&mut self) -> bool {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        if start == self.cursor {
            return false;
        }
        self.text.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Kill from the start of the line to the cursor
    pub fn kill_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.text.drain(..self.cursor);
        self.cursor = 0;
        true
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Apply a key using readline-style bindings
    pub fn handle_key(&mut self, key: KeyEvent) -> LineEdit {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Enter => LineEdit::Submit,
            KeyCode::Esc => LineEdit::Cancel,
            KeyCode::Char('a') if ctrl => {
                self.move_home();
                LineEdit::Moved
            }
            KeyCode::Char('e') if ctrl => {
                self.move_end();
                LineEdit::Moved
            }
            KeyCode::Char('u') if ctrl => changed(self.kill_to_start()),
            KeyCode::Char('w') if ctrl => changed(self.delete_word_back()),
            KeyCode::Backspace if ctrl || alt => changed(self.delete_word_back()),
            KeyCode::Backspace => changed(self.backspace()),
            KeyCode::Delete => changed(self.delete()),
            KeyCode::Left if alt || ctrl => {
                self.cursor = unicode::word_boundary_left(&self.text, self.cursor);
                LineEdit::Moved
            }
            KeyCode::Right if alt || ctrl => {
                self.cursor = unicode::word_boundary_right(&self.text, self.cursor);
                LineEdit::Moved
            }
            KeyCode::Left => {
                self.move_left();
                LineEdit::Moved
            }
            KeyCode::Right => {
                self.move_right();
                LineEdit::Moved
            }
            KeyCode::Home => {
                self.move_home();
                LineEdit::Moved
            }
            KeyCode::End => {
                self.move_end();
                LineEdit::Moved
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                self.insert_char(c);
                LineEdit::Changed
            }
            _ => LineEdit::Ignored,
        }
    }
}

fn changed(did: bool) -> LineEdit {
    if did { LineEdit::Changed } else { LineEdit::Ignored }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(buf: &mut LineBuffer, s: &str) {
        for c in s.chars() {
            buf.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut buf = LineBuffer::default();
        type_str(&mut buf, "milk");
        assert_eq!(buf.text(), "milk");
        assert_eq!(buf.handle_key(key(KeyCode::Backspace)), LineEdit::Changed);
        assert_eq!(buf.text(), "mil");
        buf.clear();
        assert_eq!(buf.handle_key(key(KeyCode::Backspace)), LineEdit::Ignored);
    }

    #[test]
    fn cursor_moves_by_grapheme() {
        let mut buf = LineBuffer::with_text("a你b");
        buf.handle_key(key(KeyCode::Left));
        buf.handle_key(key(KeyCode::Left));
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.cursor_col(), 1);
        buf.handle_key(key(KeyCode::Right));
        assert_eq!(buf.cursor_col(), 3);
        buf.handle_key(key(KeyCode::Char('x')));
        assert_eq!(buf.text(), "a你xb");
    }

    #[test]
    fn delete_at_cursor() {
        let mut buf = LineBuffer::with_text("abc");
        buf.handle_key(key(KeyCode::Home));
        buf.handle_key(key(KeyCode::Delete));
        assert_eq!(buf.text(), "bc");
        buf.handle_key(key(KeyCode::End));
        assert_eq!(buf.handle_key(key(KeyCode::Delete)), LineEdit::Ignored);
    }

    #[test]
    fn readline_kills() {
        let mut buf = LineBuffer::with_text("buy oat milk");
        buf.handle_key(ctrl('w'));
        assert_eq!(buf.text(), "buy oat ");
        buf.handle_key(ctrl('u'));
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn enter_and_escape_are_reported() {
        let mut buf = LineBuffer::with_text("x");
        assert_eq!(buf.handle_key(key(KeyCode::Enter)), LineEdit::Submit);
        assert_eq!(buf.handle_key(key(KeyCode::Esc)), LineEdit::Cancel);
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn pasted_newlines_are_dropped() {
        let mut buf = LineBuffer::default();
        buf.insert_str("one\ntwo");
        assert_eq!(buf.text(), "onetwo");
        assert_eq!(buf.cursor(), 6);
    }
}
