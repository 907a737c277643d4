use serde::Serialize;

use crate::model::todo::{Priority, Todo, TodoStatus};
use crate::ops::todo_ops::TodoStats;
use crate::tui::command_registry::Command;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson {
    pub index: usize,
    pub id: String,
    pub content: String,
    pub status: TodoStatus,
    pub priority: Priority,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NoteJson>,
}

#[derive(Serialize)]
pub struct NoteJson {
    pub id: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

#[derive(Serialize)]
pub struct CommandJson {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

#[derive(Serialize)]
pub struct ClearedJson {
    pub removed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// `index` is the todo's 1-based list position
pub fn todo_to_json(todo: &Todo, index: usize) -> TodoJson {
    TodoJson {
        index,
        id: todo.id.clone(),
        content: todo.content.clone(),
        status: todo.status,
        priority: todo.priority,
        tags: todo.tags.clone(),
        notes: todo
            .notes
            .iter()
            .map(|n| NoteJson {
                id: n.id.clone(),
                content: n.content.clone(),
            })
            .collect(),
    }
}

pub fn stats_to_json(stats: &TodoStats) -> StatsJson {
    StatsJson {
        total: stats.total,
        todo: stats.todo,
        doing: stats.doing,
        done: stats.done,
    }
}

pub fn command_to_json(command: &Command) -> CommandJson {
    CommandJson {
        id: command.id.clone(),
        name: command.name.clone(),
        description: command.description.clone(),
        shortcut: command.shortcut.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One-line summary: `  2 [>] ! Write report #work (1 note)  id`
pub fn format_todo_line(todo: &Todo, index: usize) -> String {
    let mark = if todo.is_important() { "!" } else { " " };
    let tags_str = if todo.tags.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            todo.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    let notes_str = match todo.notes.len() {
        0 => String::new(),
        1 => " (1 note)".to_string(),
        n => format!(" ({} notes)", n),
    };
    format!(
        "{:>3} [{}] {} {}{}{}  {}",
        index,
        todo.status.checkbox_char(),
        mark,
        todo.content,
        tags_str,
        notes_str,
        todo.id
    )
}

pub fn format_stats(stats: &TodoStats) -> Vec<String> {
    vec![
        format!("Total  {}", stats.total),
        format!("Todo   {}", stats.todo),
        format!("Doing  {}", stats.doing),
        format!("Done   {}", stats.done),
    ]
}

/// Catalogue line: shortcut column, id, name
pub fn format_command_line(command: &Command) -> String {
    format!(
        "{:<14} {:<26} {}",
        command.shortcut.as_deref().unwrap_or("-"),
        command.id,
        command.name
    )
}
