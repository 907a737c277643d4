use std::fmt;

use thiserror::Error;

use crate::model::todo::{Note, Todo, TodoStatus};
use crate::ops::todo_ops::{TodoRepository, now_millis};
use crate::util::ids;
use crate::util::unicode::truncate_graphemes;

const UNDO_LOG_LIMIT: usize = 50;

/// Width of entity text quoted in action descriptions
const DESCRIPTION_GRAPHEMES: usize = 30;

/// Why an inverse (or its redo) could not be applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UndoError {
    #[error("todo {0} no longer exists")]
    TodoMissing(String),
    #[error("note {note_id} of todo {todo_id} no longer exists")]
    NoteMissing { todo_id: String, note_id: String },
    #[error("{0} is already present")]
    AlreadyPresent(String),
    #[error("cannot move {id} to position {index}")]
    IndexOutOfRange { id: String, index: usize },
    #[error("{0} action carries the wrong kind of snapshot")]
    SnapshotMismatch(UndoKind),
}

/// Coarse tag of an undoable action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    TodoCreate,
    TodoDelete,
    TodoUpdate,
    TodoStatus,
    NoteCreate,
    NoteDelete,
    NoteUpdate,
    Reorder,
}

impl fmt::Display for UndoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            UndoKind::TodoCreate => "todo:create",
            UndoKind::TodoDelete => "todo:delete",
            UndoKind::TodoUpdate => "todo:update",
            UndoKind::TodoStatus => "todo:status",
            UndoKind::NoteCreate => "note:create",
            UndoKind::NoteDelete => "note:delete",
            UndoKind::NoteUpdate => "note:update",
            UndoKind::Reorder => "reorder",
        };
        f.write_str(tag)
    }
}

/// Deep copy of the state an action needs to reverse itself.
///
/// Applying an action in either direction swaps the snapshot with the live
/// entity it displaces, so the same snapshot always holds "the other side".
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Todo {
        todo: Todo,
        index: usize,
    },
    Note {
        todo_id: String,
        note: Note,
        index: usize,
    },
    Order {
        todo_id: String,
        note_id: Option<String>,
        from: usize,
        to: usize,
    },
}

impl Snapshot {
    /// The todo this snapshot belongs to
    pub fn todo_id(&self) -> &str {
        match self {
            Snapshot::Todo { todo, .. } => &todo.id,
            Snapshot::Note { todo_id, .. } | Snapshot::Order { todo_id, .. } => todo_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoAction {
    pub id: String,
    pub kind: UndoKind,
    pub description: String,
    pub timestamp: i64,
    pub snapshot: Snapshot,
}

impl UndoAction {
    pub fn new(kind: UndoKind, description: impl Into<String>, snapshot: Snapshot) -> Self {
        UndoAction {
            id: ids::fresh_id(),
            kind,
            description: description.into(),
            timestamp: now_millis(),
            snapshot,
        }
    }

    pub fn todo_created(todo: &Todo, index: usize) -> Self {
        Self::new(
            UndoKind::TodoCreate,
            format!("Add todo \"{}\"", short(&todo.content)),
            todo_snapshot(todo, index),
        )
    }

    pub fn todo_deleted(todo: &Todo, index: usize) -> Self {
        Self::new(
            UndoKind::TodoDelete,
            format!("Delete todo \"{}\"", short(&todo.content)),
            todo_snapshot(todo, index),
        )
    }

    /// Content or priority change; `before` is the todo prior to the edit
    pub fn todo_updated(before: &Todo, index: usize, what: &str) -> Self {
        Self::new(
            UndoKind::TodoUpdate,
            format!("{} \"{}\"", what, short(&before.content)),
            todo_snapshot(before, index),
        )
    }

    pub fn status_changed(before: &Todo, index: usize, to: TodoStatus) -> Self {
        Self::new(
            UndoKind::TodoStatus,
            format!(
                "Status {} -> {} \"{}\"",
                before.status.as_str(),
                to.as_str(),
                short(&before.content)
            ),
            todo_snapshot(before, index),
        )
    }

    pub fn note_created(todo_id: &str, note: &Note, index: usize) -> Self {
        Self::new(
            UndoKind::NoteCreate,
            format!("Add note \"{}\"", short(&note.content)),
            note_snapshot(todo_id, note, index),
        )
    }

    pub fn note_deleted(todo_id: &str, note: &Note, index: usize) -> Self {
        Self::new(
            UndoKind::NoteDelete,
            format!("Delete note \"{}\"", short(&note.content)),
            note_snapshot(todo_id, note, index),
        )
    }

    pub fn note_updated(todo_id: &str, before: &Note, index: usize) -> Self {
        Self::new(
            UndoKind::NoteUpdate,
            format!("Edit note \"{}\"", short(&before.content)),
            note_snapshot(todo_id, before, index),
        )
    }

    pub fn todo_moved(todo: &Todo, from: usize, to: usize) -> Self {
        Self::new(
            UndoKind::Reorder,
            format!("Move todo \"{}\"", short(&todo.content)),
            Snapshot::Order {
                todo_id: todo.id.clone(),
                note_id: None,
                from,
                to,
            },
        )
    }

    pub fn note_moved(todo_id: &str, note: &Note, from: usize, to: usize) -> Self {
        Self::new(
            UndoKind::Reorder,
            format!("Move note \"{}\"", short(&note.content)),
            Snapshot::Order {
                todo_id: todo_id.to_string(),
                note_id: Some(note.id.clone()),
                from,
                to,
            },
        )
    }

    pub fn todo_id(&self) -> &str {
        self.snapshot.todo_id()
    }
}

fn short(text: &str) -> String {
    truncate_graphemes(text, DESCRIPTION_GRAPHEMES)
}

fn todo_snapshot(todo: &Todo, index: usize) -> Snapshot {
    Snapshot::Todo {
        todo: todo.clone(),
        index,
    }
}

fn note_snapshot(todo_id: &str, note: &Note, index: usize) -> Snapshot {
    Snapshot::Note {
        todo_id: todo_id.to_string(),
        note: note.clone(),
        index,
    }
}

/// The undo history and redo stack.
///
/// `history` is bounded and evicts its oldest entry first. Recording a new
/// action clears the redo stack.
#[derive(Debug, Default)]
pub struct UndoLog {
    history: Vec<UndoAction>,
    redo: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new action. Clears the redo stack.
    pub fn record(&mut self, action: UndoAction) {
        tracing::debug!(kind = %action.kind, description = %action.description, "undo recorded");
        self.history.push(action);
        if self.history.len() > UNDO_LOG_LIMIT {
            self.history.drain(..self.history.len() - UNDO_LOG_LIMIT);
        }
        self.redo.clear();
    }

    /// Reverse the most recent action. On failure the action goes back on
    /// the history unchanged and `false` is returned.
    pub fn undo(&mut self, repo: &mut TodoRepository) -> bool {
        let Some(mut action) = self.history.pop() else {
            return false;
        };
        match apply_inverse(&mut action, repo) {
            Ok(()) => {
                self.redo.push(action);
                true
            }
            Err(err) => {
                tracing::warn!(kind = %action.kind, error = %err, "undo failed");
                self.history.push(action);
                false
            }
        }
    }

    /// Re-apply the most recently undone action
    pub fn redo(&mut self, repo: &mut TodoRepository) -> bool {
        let Some(mut action) = self.redo.pop() else {
            return false;
        };
        match apply_forward(&mut action, repo) {
            Ok(()) => {
                self.history.push(action);
                true
            }
            Err(err) => {
                tracing::warn!(kind = %action.kind, error = %err, "redo failed");
                self.redo.push(action);
                false
            }
        }
    }

    /// Excise an action from whichever stack holds it
    pub fn remove(&mut self, id: &str) -> Option<UndoAction> {
        for stack in [&mut self.history, &mut self.redo] {
            if let Some(pos) = stack.iter().position(|a| a.id == id) {
                return Some(stack.remove(pos));
            }
        }
        None
    }

    /// Ids of every action (in either stack) whose snapshot belongs to `todo_id`
    pub fn actions_targeting(&self, todo_id: &str) -> Vec<String> {
        self.history
            .iter()
            .chain(self.redo.iter())
            .filter(|a| a.todo_id() == todo_id)
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// The action the next `undo` would reverse
    pub fn last_action(&self) -> Option<&UndoAction> {
        self.history.last()
    }

    /// The action the next `redo` would re-apply
    pub fn last_redo_action(&self) -> Option<&UndoAction> {
        self.redo.last()
    }

    pub fn history(&self) -> &[UndoAction] {
        &self.history
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

fn apply_inverse(action: &mut UndoAction, repo: &mut TodoRepository) -> Result<(), UndoError> {
    apply(action, repo, Direction::Undo)
}

fn apply_forward(action: &mut UndoAction, repo: &mut TodoRepository) -> Result<(), UndoError> {
    apply(action, repo, Direction::Redo)
}

fn apply(action: &mut UndoAction, repo: &mut TodoRepository, direction: Direction) -> Result<(), UndoError> {
    let kind = action.kind;
    let snapshot = &mut action.snapshot;
    match (kind, direction) {
        (UndoKind::TodoCreate, Direction::Undo) | (UndoKind::TodoDelete, Direction::Redo) => {
            take_todo(kind, snapshot, repo)
        }
        (UndoKind::TodoCreate, Direction::Redo) | (UndoKind::TodoDelete, Direction::Undo) => {
            restore_todo(kind, snapshot, repo)
        }
        (UndoKind::TodoUpdate | UndoKind::TodoStatus, _) => swap_todo(kind, snapshot, repo),
        (UndoKind::NoteCreate, Direction::Undo) | (UndoKind::NoteDelete, Direction::Redo) => {
            take_note(kind, snapshot, repo)
        }
        (UndoKind::NoteCreate, Direction::Redo) | (UndoKind::NoteDelete, Direction::Undo) => {
            restore_note(kind, snapshot, repo)
        }
        (UndoKind::NoteUpdate, _) => swap_note(kind, snapshot, repo),
        (UndoKind::Reorder, _) => move_back_or_forth(kind, snapshot, repo, direction),
    }
}

/// Remove the live todo, keeping its latest state for the way back
fn take_todo(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Todo { todo, index } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    let (at, live) = repo
        .remove(&todo.id)
        .ok_or_else(|| UndoError::TodoMissing(todo.id.clone()))?;
    *todo = live;
    *index = at;
    Ok(())
}

fn restore_todo(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Todo { todo, index } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    if repo.insert_at(*index, todo.clone()) {
        Ok(())
    } else {
        Err(UndoError::AlreadyPresent(todo.id.clone()))
    }
}

fn swap_todo(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Todo { todo, .. } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    let displaced = repo
        .replace(todo.clone())
        .ok_or_else(|| UndoError::TodoMissing(todo.id.clone()))?;
    *todo = displaced;
    Ok(())
}

fn take_note(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Note { todo_id, note, index } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    let (at, live) = repo
        .remove_note(todo_id, &note.id)
        .ok_or_else(|| missing_note(repo, todo_id, &note.id))?;
    *note = live;
    *index = at;
    Ok(())
}

fn restore_note(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Note { todo_id, note, index } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    if repo.get(todo_id).is_none() {
        return Err(UndoError::TodoMissing(todo_id.clone()));
    }
    if repo.insert_note_at(todo_id, *index, note.clone()) {
        Ok(())
    } else {
        Err(UndoError::AlreadyPresent(note.id.clone()))
    }
}

fn swap_note(kind: UndoKind, snapshot: &mut Snapshot, repo: &mut TodoRepository) -> Result<(), UndoError> {
    let Snapshot::Note { todo_id, note, .. } = snapshot else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    let displaced = repo
        .replace_note(todo_id, note.clone())
        .ok_or_else(|| missing_note(repo, todo_id, &note.id))?;
    *note = displaced;
    Ok(())
}

fn move_back_or_forth(
    kind: UndoKind,
    snapshot: &mut Snapshot,
    repo: &mut TodoRepository,
    direction: Direction,
) -> Result<(), UndoError> {
    let Snapshot::Order {
        todo_id,
        note_id,
        from,
        to,
    } = snapshot
    else {
        return Err(UndoError::SnapshotMismatch(kind));
    };
    let target = match direction {
        Direction::Undo => *from,
        Direction::Redo => *to,
    };
    let (id, in_place) = match note_id {
        Some(note_id) => {
            let Some(current) = repo.get(todo_id).and_then(|t| t.note_index(note_id)) else {
                return Err(missing_note(repo, todo_id, note_id));
            };
            let moved = repo.move_note(todo_id, note_id, target);
            (note_id.clone(), moved || current == target)
        }
        None => {
            let Some(current) = repo.index_of(todo_id) else {
                return Err(UndoError::TodoMissing(todo_id.clone()));
            };
            let moved = repo.reorder(todo_id, target);
            (todo_id.clone(), moved || current == target)
        }
    };
    if in_place {
        Ok(())
    } else {
        Err(UndoError::IndexOutOfRange { id, index: target })
    }
}

fn missing_note(repo: &TodoRepository, todo_id: &str, note_id: &str) -> UndoError {
    if repo.get(todo_id).is_none() {
        UndoError::TodoMissing(todo_id.to_string())
    } else {
        UndoError::NoteMissing {
            todo_id: todo_id.to_string(),
            note_id: note_id.to_string(),
        }
    }
}
