use serde::{Deserialize, Serialize};

/// Todo workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TodoStatus {
    Todo,
    Doing,
    Done,
}

impl TodoStatus {
    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TodoStatus::Todo => ' ',
            TodoStatus::Doing => '>',
            TodoStatus::Done => 'x',
        }
    }

    /// Next status in the TODO → DOING → DONE → TODO cycle
    pub fn cycled(self) -> TodoStatus {
        match self {
            TodoStatus::Todo => TodoStatus::Doing,
            TodoStatus::Doing => TodoStatus::Done,
            TodoStatus::Done => TodoStatus::Todo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::Todo => "TODO",
            TodoStatus::Doing => "DOING",
            TodoStatus::Done => "DONE",
        }
    }

    /// Parse a status name, case-insensitively
    pub fn parse_status(s: &str) -> Option<TodoStatus> {
        match s.to_ascii_uppercase().as_str() {
            "TODO" => Some(TodoStatus::Todo),
            "DOING" => Some(TodoStatus::Doing),
            "DONE" => Some(TodoStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Default,
    Important,
}

impl Priority {
    pub fn toggled(self) -> Priority {
        match self {
            Priority::Default => Priority::Important,
            Priority::Important => Priority::Default,
        }
    }
}

/// A sub-note attached to exactly one todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub updated_at: i64,
}

impl Note {
    pub fn new(id: String, content: String, now: i64) -> Self {
        Note {
            id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A top-level work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Tags without the `#` prefix, in insertion order, no duplicates
    #[serde(default)]
    pub tags: Vec<String>,
    /// Notes in display order
    #[serde(default)]
    pub notes: Vec<Note>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Todo {
    /// Create a new TODO-status todo with no notes
    pub fn new(id: String, content: String, priority: Priority, tags: Vec<String>, now: i64) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !deduped.contains(&tag) {
                deduped.push(tag);
            }
        }
        Todo {
            id,
            content,
            status: TodoStatus::Todo,
            priority,
            tags: deduped,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TodoStatus::Done
    }

    pub fn is_important(&self) -> bool {
        self.priority == Priority::Important
    }

    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }

    pub fn note_index(&self, note_id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == note_id)
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self, now: i64) {
        self.updated_at = now;
    }
}
