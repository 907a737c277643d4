/// What an in-place edit is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Todo,
    Note,
}

/// Coarse tag of a [`FocusState`], for display and predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusType {
    None,
    Todo,
    Note,
    Input,
}

/// Where the user's attention currently is.
///
/// Values are snapshots: they carry ids only, never borrowed or embedded
/// entity data, so a copy kept in navigation history stays valid in shape
/// no matter what later happens to the todo or note it names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    None,
    Todo {
        todo_id: String,
    },
    Note {
        todo_id: String,
        note_id: String,
    },
    Input {
        target: EditTarget,
        todo_id: Option<String>,
        note_id: Option<String>,
    },
}

impl FocusState {
    pub fn focus_type(&self) -> FocusType {
        match self {
            FocusState::None => FocusType::None,
            FocusState::Todo { .. } => FocusType::Todo,
            FocusState::Note { .. } => FocusType::Note,
            FocusState::Input { .. } => FocusType::Input,
        }
    }

    /// The todo id named by any variant that carries one
    pub fn todo_id(&self) -> Option<&str> {
        match self {
            FocusState::None => None,
            FocusState::Todo { todo_id } | FocusState::Note { todo_id, .. } => Some(todo_id),
            FocusState::Input { todo_id, .. } => todo_id.as_deref(),
        }
    }

    /// The note id named by any variant that carries one
    pub fn note_id(&self) -> Option<&str> {
        match self {
            FocusState::Note { note_id, .. } => Some(note_id),
            FocusState::Input { note_id, .. } => note_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FocusState::None)
    }

    pub fn is_todo(&self) -> bool {
        matches!(self, FocusState::Todo { .. })
    }

    pub fn is_note(&self) -> bool {
        matches!(self, FocusState::Note { .. })
    }

    pub fn is_input(&self) -> bool {
        matches!(self, FocusState::Input { .. })
    }

    /// The state one level up from an in-place edit: the edited note,
    /// else the edited todo, else nothing.
    pub fn edit_parent(target: EditTarget, todo_id: Option<&str>, note_id: Option<&str>) -> FocusState {
        match (target, todo_id, note_id) {
            (EditTarget::Note, Some(todo_id), Some(note_id)) => FocusState::Note {
                todo_id: todo_id.to_string(),
                note_id: note_id.to_string(),
            },
            (_, Some(todo_id), _) => FocusState::Todo {
                todo_id: todo_id.to_string(),
            },
            _ => FocusState::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_unify_across_variants() {
        let note = FocusState::Note {
            todo_id: "t".into(),
            note_id: "n".into(),
        };
        assert_eq!(note.todo_id(), Some("t"));
        assert_eq!(note.note_id(), Some("n"));

        let input = FocusState::Input {
            target: EditTarget::Todo,
            todo_id: Some("t".into()),
            note_id: None,
        };
        assert_eq!(input.todo_id(), Some("t"));
        assert_eq!(input.note_id(), None);
        assert_eq!(FocusState::None.todo_id(), None);
    }

    #[test]
    fn edit_parent_prefers_note_then_todo() {
        assert_eq!(
            FocusState::edit_parent(EditTarget::Note, Some("t"), Some("n")),
            FocusState::Note {
                todo_id: "t".into(),
                note_id: "n".into()
            }
        );
        // A note edit missing its note id falls back to the todo
        assert_eq!(
            FocusState::edit_parent(EditTarget::Note, Some("t"), None),
            FocusState::Todo { todo_id: "t".into() }
        );
        assert_eq!(FocusState::edit_parent(EditTarget::Todo, None, None), FocusState::None);
    }
}
