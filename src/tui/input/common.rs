use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The symbol a US keyboard produces for `c` with Shift held
pub(super) fn shift_symbol(c: char) -> Option<char> {
    match c {
        '`' => Some('~'),
        '1' => Some('!'),
        '2' => Some('@'),
        '3' => Some('#'),
        '4' => Some('$'),
        '5' => Some('%'),
        '6' => Some('^'),
        '7' => Some('&'),
        '8' => Some('*'),
        '9' => Some('('),
        '0' => Some(')'),
        '-' => Some('_'),
        '=' => Some('+'),
        '[' => Some('{'),
        ']' => Some('}'),
        '\\' => Some('|'),
        ';' => Some(':'),
        '\'' => Some('"'),
        ',' => Some('<'),
        '.' => Some('>'),
        '/' => Some('?'),
        _ => None,
    }
}

/// Normalize key events from terminals using the kitty keyboard protocol,
/// which sends `Char(lowercase) + SHIFT` and `Char(base_symbol) + SHIFT`.
/// On traditional terminals this is a no-op.
pub(super) fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if let Some(shifted) = shift_symbol(c) {
            key.code = KeyCode::Char(shifted);
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}

/// The canonical shortcut string for a key, in the form commands are
/// registered with: `Ctrl+`/`Shift+` prefixes, upper-case letters, named
/// keys (`Space`, `Enter`, `ArrowUp`, ...). Plain letters map to their
/// upper-case form; a typed upper-case letter is `Shift+X`.
pub fn shortcut_for(key: KeyEvent) -> Option<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let mut shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) if c.is_alphabetic() => {
            if c.is_uppercase() {
                shift = true;
            }
            c.to_uppercase().collect()
        }
        KeyCode::Char(c) => {
            // Shift is already folded into the symbol
            shift = false;
            c.to_string()
        }
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Escape".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::BackTab => {
            shift = true;
            "Tab".into()
        }
        KeyCode::Up => "ArrowUp".into(),
        KeyCode::Down => "ArrowDown".into(),
        KeyCode::Left => "ArrowLeft".into(),
        KeyCode::Right => "ArrowRight".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        _ => return None,
    };
    let mut shortcut = String::new();
    if ctrl {
        shortcut.push_str("Ctrl+");
    }
    if shift {
        shortcut.push_str("Shift+");
    }
    shortcut.push_str(&name);
    Some(shortcut)
}
