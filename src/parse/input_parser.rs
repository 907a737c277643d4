use std::sync::LazyLock;

use regex::Regex;

use crate::model::todo::Priority;

/// `#word` tag token
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("tag pattern is a valid regex"));

/// Marker that flags a new todo as important
const IMPORTANT_MARKER: &str = " !";

/// What a submitted compose line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// `//N`: focus the N-th note (1-based) of the focused todo
    NoteSelect { index: usize },
    /// `/N`: focus the N-th visible todo (1-based)
    Select { index: usize },
    /// `/text`: run the first command matching `text`
    Command { text: String },
    /// Plain text while a todo is focused: add it as a note
    Note { content: String },
    /// Anything else: a new todo
    NewTodo(NewTodo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub content: String,
    pub priority: Priority,
    pub tags: Vec<String>,
}

/// Classify a compose line. `todo_focused` is whether a todo (or one of its
/// notes) currently has focus.
pub fn parse_input(input: &str, todo_focused: bool) -> ParsedInput {
    if let Some(rest) = input.strip_prefix("//") {
        let index = leading_number(rest).filter(|&n| n > 0).unwrap_or(1);
        return ParsedInput::NoteSelect { index };
    }

    if let Some(rest) = input.strip_prefix('/') {
        if !rest.is_empty()
            && rest.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = rest.parse()
        {
            return ParsedInput::Select { index };
        }
        return ParsedInput::Command {
            text: rest.to_string(),
        };
    }

    if todo_focused {
        return ParsedInput::Note {
            content: input.to_string(),
        };
    }

    ParsedInput::NewTodo(parse_new_todo(input))
}

/// Split a new-todo line into content, priority (` !`) and `#tags`
pub fn parse_new_todo(input: &str) -> NewTodo {
    let mut content = input.to_string();
    let mut priority = Priority::Default;

    if content.contains(IMPORTANT_MARKER) {
        priority = Priority::Important;
        content = content.replacen(IMPORTANT_MARKER, "", 1);
    }

    let mut tags: Vec<String> = Vec::new();
    for cap in TAG_RE.captures_iter(&content) {
        let tag = cap[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    content = TAG_RE.replace_all(&content, "").into_owned();
    let content = content.split_whitespace().collect::<Vec<_>>().join(" ");

    NewTodo {
        content,
        priority,
        tags,
    }
}

/// The run of ASCII digits at the start of `s`, parsed
fn leading_number(s: &str) -> Option<usize> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}
