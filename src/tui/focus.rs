use std::collections::VecDeque;

use crate::model::focus::{EditTarget, FocusState, FocusType};
use crate::model::todo::{Note, Todo};
use crate::ops::todo_ops::TodoRepository;

/// Maximum number of prior focus states kept for "go back"
pub const HISTORY_LIMIT: usize = 10;

/// Every input the focus state machine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    FocusTodo(String),
    FocusNote { todo_id: String, note_id: String },
    StartEdit {
        target: EditTarget,
        todo_id: Option<String>,
        note_id: Option<String>,
    },
    GoBack,
    Enter,
    CommitEdit,
    ClearFocus,
    NextTodo,
    PrevTodo,
    NextNote,
    PrevNote,
    JumpToIndex(usize),
    JumpToFirst,
    JumpToLast,
}

/// Owns the current [`FocusState`] and the bounded history of prior states.
///
/// All transitions go through [`FocusController::apply`]; the named methods
/// are conveniences over it. Events that need to look at the data take the
/// repository by reference; the controller never mutates it.
#[derive(Debug, Clone, Default)]
pub struct FocusController {
    focus: FocusState,
    history: VecDeque<FocusState>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FocusState {
        &self.focus
    }

    /// Prior states, oldest first
    pub fn history(&self) -> &VecDeque<FocusState> {
        &self.history
    }

    /// Apply one event. Returns whether the event did anything.
    pub fn apply(&mut self, event: FocusEvent, repo: &TodoRepository) -> bool {
        match event {
            FocusEvent::FocusTodo(todo_id) => {
                self.transition(FocusState::Todo { todo_id });
                true
            }
            FocusEvent::FocusNote { todo_id, note_id } => {
                if repo.note(&todo_id, &note_id).is_none() {
                    return false;
                }
                self.transition(FocusState::Note { todo_id, note_id });
                true
            }
            FocusEvent::StartEdit {
                target,
                todo_id,
                note_id,
            } => {
                self.transition(FocusState::Input {
                    target,
                    todo_id,
                    note_id,
                });
                true
            }
            FocusEvent::GoBack => self.back(),
            FocusEvent::Enter => self.descend(repo),
            FocusEvent::CommitEdit => match &self.focus {
                FocusState::Input {
                    target,
                    todo_id,
                    note_id,
                } => {
                    self.focus = FocusState::edit_parent(*target, todo_id.as_deref(), note_id.as_deref());
                    true
                }
                _ => false,
            },
            FocusEvent::ClearFocus => {
                self.focus = FocusState::None;
                self.history.clear();
                true
            }
            FocusEvent::NextTodo => self.step_todo(repo, Step::Next),
            FocusEvent::PrevTodo => self.step_todo(repo, Step::Prev),
            FocusEvent::NextNote => self.step_note(repo, Step::Next),
            FocusEvent::PrevNote => self.step_note(repo, Step::Prev),
            FocusEvent::JumpToIndex(index) => self.jump(repo, index),
            FocusEvent::JumpToFirst => self.jump(repo, 0),
            FocusEvent::JumpToLast => match repo.visible_todos().len().checked_sub(1) {
                Some(last) => self.jump(repo, last),
                None => false,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Named transitions
    // -----------------------------------------------------------------------

    pub fn focus_todo(&mut self, todo_id: &str) {
        self.focus = self.pushed(FocusState::Todo {
            todo_id: todo_id.to_string(),
        });
    }

    pub fn focus_note(&mut self, repo: &TodoRepository, todo_id: &str, note_id: &str) -> bool {
        self.apply(
            FocusEvent::FocusNote {
                todo_id: todo_id.to_string(),
                note_id: note_id.to_string(),
            },
            repo,
        )
    }

    pub fn start_edit(&mut self, target: EditTarget, todo_id: Option<&str>, note_id: Option<&str>) {
        self.transition(FocusState::Input {
            target,
            todo_id: todo_id.map(str::to_string),
            note_id: note_id.map(str::to_string),
        });
    }

    pub fn go_back(&mut self) -> bool {
        self.back()
    }

    pub fn enter(&mut self, repo: &TodoRepository) -> bool {
        self.descend(repo)
    }

    pub fn commit_edit(&mut self, repo: &TodoRepository) -> bool {
        self.apply(FocusEvent::CommitEdit, repo)
    }

    pub fn clear_focus(&mut self) {
        self.focus = FocusState::None;
        self.history.clear();
    }

    pub fn move_to_next_todo(&mut self, repo: &TodoRepository) -> bool {
        self.step_todo(repo, Step::Next)
    }

    pub fn move_to_prev_todo(&mut self, repo: &TodoRepository) -> bool {
        self.step_todo(repo, Step::Prev)
    }

    pub fn move_to_next_note(&mut self, repo: &TodoRepository) -> bool {
        self.step_note(repo, Step::Next)
    }

    pub fn move_to_prev_note(&mut self, repo: &TodoRepository) -> bool {
        self.step_note(repo, Step::Prev)
    }

    pub fn jump_to_index(&mut self, repo: &TodoRepository, index: usize) -> bool {
        self.jump(repo, index)
    }

    pub fn jump_to_first(&mut self, repo: &TodoRepository) -> bool {
        self.apply(FocusEvent::JumpToFirst, repo)
    }

    pub fn jump_to_last(&mut self, repo: &TodoRepository) -> bool {
        self.apply(FocusEvent::JumpToLast, repo)
    }

    // -----------------------------------------------------------------------
    // Derived queries
    // -----------------------------------------------------------------------

    pub fn focus_type(&self) -> FocusType {
        self.focus.focus_type()
    }

    pub fn has_focus(&self) -> bool {
        !self.focus.is_none()
    }

    pub fn is_editing(&self) -> bool {
        self.focus.is_input()
    }

    pub fn focused_todo_id(&self) -> Option<&str> {
        self.focus.todo_id()
    }

    pub fn focused_note_id(&self) -> Option<&str> {
        self.focus.note_id()
    }

    /// The focused todo, if it still exists
    pub fn focused_todo<'a>(&self, repo: &'a TodoRepository) -> Option<&'a Todo> {
        repo.get(self.focused_todo_id()?)
    }

    /// The focused note, if both it and its todo still exist
    pub fn focused_note<'a>(&self, repo: &'a TodoRepository) -> Option<&'a Note> {
        self.focused_todo(repo)?.note(self.focused_note_id()?)
    }

    /// Position of the focused todo in the visible view
    pub fn focused_todo_index(&self, repo: &TodoRepository) -> Option<usize> {
        let todo_id = self.focused_todo_id()?;
        repo.visible_todos().iter().position(|t| t.id == todo_id)
    }

    pub fn focused_note_index(&self, repo: &TodoRepository) -> Option<usize> {
        self.focused_todo(repo)?.note_index(self.focused_note_id()?)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: FocusState) {
        self.focus = self.pushed(next);
    }

    /// Record the current state in history (unless it is `None`) and hand
    /// back `next` as the new state.
    fn pushed(&mut self, next: FocusState) -> FocusState {
        if !self.focus.is_none() {
            self.history.push_back(self.focus.clone());
            while self.history.len() > HISTORY_LIMIT {
                self.history.pop_front();
            }
        }
        next
    }

    fn back(&mut self) -> bool {
        if let Some(previous) = self.history.pop_back() {
            self.focus = previous;
            return true;
        }
        let next = match &self.focus {
            FocusState::Input {
                target,
                todo_id,
                note_id,
            } => FocusState::edit_parent(*target, todo_id.as_deref(), note_id.as_deref()),
            FocusState::Note { todo_id, .. } => FocusState::Todo {
                todo_id: todo_id.clone(),
            },
            FocusState::Todo { .. } => FocusState::None,
            FocusState::None => return false,
        };
        self.focus = next;
        true
    }

    fn descend(&mut self, repo: &TodoRepository) -> bool {
        match &self.focus {
            FocusState::Todo { todo_id } => {
                let Some(todo) = repo.get(todo_id) else {
                    return false;
                };
                if let Some(first) = todo.notes.first() {
                    let (todo_id, note_id) = (todo.id.clone(), first.id.clone());
                    self.transition(FocusState::Note { todo_id, note_id });
                    true
                } else if !todo.is_done() {
                    let todo_id = todo.id.clone();
                    self.transition(FocusState::Input {
                        target: EditTarget::Todo,
                        todo_id: Some(todo_id),
                        note_id: None,
                    });
                    true
                } else {
                    false
                }
            }
            FocusState::Note { todo_id, note_id } => {
                match repo.get(todo_id) {
                    Some(todo) if !todo.is_done() => {
                        let next = FocusState::Input {
                            target: EditTarget::Note,
                            todo_id: Some(todo_id.clone()),
                            note_id: Some(note_id.clone()),
                        };
                        self.transition(next);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn step_todo(&mut self, repo: &TodoRepository, step: Step) -> bool {
        let visible = repo.visible_todos();
        if visible.is_empty() {
            return false;
        }
        let target = match (self.focused_todo_index(repo), step) {
            (None, Step::Next) => 0,
            (None, Step::Prev) => visible.len() - 1,
            (Some(i), Step::Next) if i + 1 < visible.len() => i + 1,
            (Some(i), Step::Prev) if i > 0 => i - 1,
            _ => return false,
        };
        let todo_id = visible[target].id.clone();
        self.transition(FocusState::Todo { todo_id });
        true
    }

    fn step_note(&mut self, repo: &TodoRepository, step: Step) -> bool {
        let Some(todo) = self.focused_todo(repo) else {
            return false;
        };
        if todo.notes.is_empty() {
            return false;
        }
        let len = todo.notes.len();
        let target = match (self.focused_note_index(repo), step) {
            (None, Step::Next) => 0,
            (None, Step::Prev) => len - 1,
            (Some(i), Step::Next) if i + 1 < len => i + 1,
            (Some(i), Step::Prev) if i > 0 => i - 1,
            _ => return false,
        };
        let (todo_id, note_id) = (todo.id.clone(), todo.notes[target].id.clone());
        self.transition(FocusState::Note { todo_id, note_id });
        true
    }

    fn jump(&mut self, repo: &TodoRepository, index: usize) -> bool {
        let Some(todo_id) = repo.visible_todos().get(index).map(|t| t.id.clone()) else {
            return false;
        };
        self.transition(FocusState::Todo { todo_id });
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Prev,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::Priority;
    use pretty_assertions::assert_eq;

    fn repo_with(contents: &[&str]) -> (TodoRepository, Vec<String>) {
        let mut repo = TodoRepository::new();
        let ids = contents
            .iter()
            .map(|c| repo.add(c, Priority::Default, vec![]))
            .collect();
        (repo, ids)
    }

    fn todo_focus(id: &str) -> FocusState {
        FocusState::Todo {
            todo_id: id.to_string(),
        }
    }

    fn note_focus(todo_id: &str, note_id: &str) -> FocusState {
        FocusState::Note {
            todo_id: todo_id.to_string(),
            note_id: note_id.to_string(),
        }
    }

    #[test]
    fn starts_with_no_focus() {
        let fc = FocusController::new();
        assert_eq!(fc.state(), &FocusState::None);
        assert!(!fc.has_focus());
        assert!(fc.history().is_empty());
    }

    #[test]
    fn focus_todo_from_none_does_not_push_history() {
        let mut fc = FocusController::new();
        fc.focus_todo("a");
        assert!(fc.history().is_empty());
        fc.focus_todo("b");
        assert_eq!(fc.history().len(), 1);
        assert_eq!(fc.history()[0], todo_focus("a"));
    }

    #[test]
    fn focus_note_requires_existing_note() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        let note = repo.add_note(&ids[0], "n").unwrap();
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);

        assert!(!fc.focus_note(&repo, &ids[1], &note));
        assert_eq!(fc.state(), &todo_focus(&ids[0]));
        assert!(!fc.focus_note(&repo, &ids[0], "missing"));
        assert_eq!(fc.state(), &todo_focus(&ids[0]));

        assert!(fc.focus_note(&repo, &ids[0], &note));
        assert_eq!(fc.state(), &note_focus(&ids[0], &note));
    }

    #[test]
    fn history_never_exceeds_limit() {
        let mut fc = FocusController::new();
        for i in 0..25 {
            fc.focus_todo(&i.to_string());
            assert!(fc.history().len() <= HISTORY_LIMIT);
        }
        assert_eq!(fc.history().len(), HISTORY_LIMIT);
        // Oldest entries were evicted first
        assert_eq!(fc.history()[0], todo_focus("14"));
    }

    #[test]
    fn history_entries_are_snapshots() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);
        fc.focus_todo(&ids[1]);
        repo.update_content(&ids[0], "changed");
        repo.delete(&ids[0]);
        assert_eq!(fc.history()[0], todo_focus(&ids[0]));
    }

    #[test]
    fn enter_then_back_is_symmetric() {
        let (mut repo, ids) = repo_with(&["t"]);
        let note = repo.add_note(&ids[0], "n").unwrap();
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);

        assert!(fc.enter(&repo));
        assert_eq!(fc.state(), &note_focus(&ids[0], &note));
        assert!(fc.go_back());
        assert_eq!(fc.state(), &todo_focus(&ids[0]));
    }

    #[test]
    fn enter_on_todo_without_notes_starts_edit() {
        let (repo, ids) = repo_with(&["t"]);
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);
        assert!(fc.enter(&repo));
        assert_eq!(
            fc.state(),
            &FocusState::Input {
                target: EditTarget::Todo,
                todo_id: Some(ids[0].clone()),
                note_id: None
            }
        );
    }

    #[test]
    fn enter_refuses_done_todos() {
        let (mut repo, ids) = repo_with(&["t"]);
        repo.complete(&ids[0]);
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);
        assert!(!fc.enter(&repo));
        assert_eq!(fc.state(), &todo_focus(&ids[0]));
    }

    #[test]
    fn enter_on_note_edits_it_unless_parent_done() {
        let (mut repo, ids) = repo_with(&["t"]);
        let note = repo.add_note(&ids[0], "n").unwrap();
        let mut fc = FocusController::new();
        fc.focus_note(&repo, &ids[0], &note);
        assert!(fc.enter(&repo));
        assert!(fc.is_editing());
        assert_eq!(fc.focused_note_id(), Some(note.as_str()));

        let mut fc = FocusController::new();
        fc.focus_note(&repo, &ids[0], &note);
        repo.complete(&ids[0]);
        assert!(!fc.enter(&repo));
    }

    #[test]
    fn go_back_without_history_derives_parent() {
        let repo = TodoRepository::new();
        let mut fc = FocusController::new();

        // input(note) -> note
        fc.start_edit(EditTarget::Note, Some("t"), Some("n"));
        assert!(fc.go_back());
        assert_eq!(fc.state(), &note_focus("t", "n"));

        // note -> todo (history holds nothing because we started from None)
        let mut fc = FocusController::new();
        fc.start_edit(EditTarget::Note, Some("t"), Some("n"));
        fc.commit_edit(&repo);
        assert_eq!(fc.state(), &note_focus("t", "n"));
        assert!(fc.go_back());
        assert_eq!(fc.state(), &todo_focus("t"));

        // todo -> none, then nothing left
        assert!(fc.go_back());
        assert_eq!(fc.state(), &FocusState::None);
        assert!(!fc.go_back());
    }

    #[test]
    fn go_back_pops_history_regardless_of_current_state() {
        let mut fc = FocusController::new();
        fc.focus_todo("a");
        fc.start_edit(EditTarget::Todo, Some("b"), None);
        assert!(fc.go_back());
        assert_eq!(fc.state(), &todo_focus("a"));
    }

    #[test]
    fn input_without_todo_goes_back_to_none() {
        let mut fc = FocusController::new();
        fc.start_edit(EditTarget::Todo, None, None);
        assert!(fc.go_back());
        assert_eq!(fc.state(), &FocusState::None);
    }

    #[test]
    fn commit_edit_returns_one_level_up() {
        let repo = TodoRepository::new();
        let mut fc = FocusController::new();
        fc.focus_todo("t");
        fc.start_edit(EditTarget::Todo, Some("t"), None);
        let history_before = fc.history().len();
        assert!(fc.commit_edit(&repo));
        assert_eq!(fc.state(), &todo_focus("t"));
        assert_eq!(fc.history().len(), history_before);
        assert!(!fc.commit_edit(&repo));
    }

    #[test]
    fn clear_focus_drops_history() {
        let mut fc = FocusController::new();
        fc.focus_todo("a");
        fc.focus_todo("b");
        fc.clear_focus();
        assert_eq!(fc.state(), &FocusState::None);
        assert!(fc.history().is_empty());
    }

    #[test]
    fn todo_navigation_walks_visible_view_and_stops_at_ends() {
        let (repo, ids) = repo_with(&["a", "b", "c"]);
        let mut fc = FocusController::new();
        assert!(fc.move_to_next_todo(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[0].as_str()));
        assert!(!fc.move_to_prev_todo(&repo));
        assert!(fc.move_to_next_todo(&repo));
        assert!(fc.move_to_next_todo(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[2].as_str()));
        assert!(!fc.move_to_next_todo(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[2].as_str()));
    }

    #[test]
    fn prev_todo_without_focus_goes_to_last() {
        let (repo, ids) = repo_with(&["a", "b"]);
        let mut fc = FocusController::new();
        assert!(fc.move_to_prev_todo(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn navigation_on_empty_list_fails() {
        let repo = TodoRepository::new();
        let mut fc = FocusController::new();
        assert!(!fc.move_to_next_todo(&repo));
        assert!(!fc.jump_to_first(&repo));
        assert!(!fc.jump_to_last(&repo));
        assert_eq!(fc.state(), &FocusState::None);
    }

    #[test]
    fn navigation_follows_focus_mode() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        repo.start(&ids[1]);
        let mut fc = FocusController::new();
        assert!(fc.jump_to_first(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[1].as_str()));
        assert!(!fc.jump_to_index(&repo, 1));
        assert!(!fc.move_to_next_todo(&repo));
    }

    #[test]
    fn jumps_index_into_visible_view() {
        let (repo, ids) = repo_with(&["a", "b", "c"]);
        let mut fc = FocusController::new();
        assert!(fc.jump_to_last(&repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[2].as_str()));
        assert!(fc.jump_to_index(&repo, 1));
        assert_eq!(fc.focused_todo_id(), Some(ids[1].as_str()));
        assert!(!fc.jump_to_index(&repo, 3));
        assert_eq!(fc.focused_todo_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn note_navigation_within_focused_todo() {
        let (mut repo, ids) = repo_with(&["t"]);
        let n1 = repo.add_note(&ids[0], "1").unwrap();
        let n2 = repo.add_note(&ids[0], "2").unwrap();
        let mut fc = FocusController::new();
        assert!(!fc.move_to_next_note(&repo));

        fc.focus_todo(&ids[0]);
        assert!(fc.move_to_next_note(&repo));
        assert_eq!(fc.focused_note_id(), Some(n1.as_str()));
        assert!(fc.move_to_next_note(&repo));
        assert_eq!(fc.focused_note_id(), Some(n2.as_str()));
        assert!(!fc.move_to_next_note(&repo));
        assert!(fc.move_to_prev_note(&repo));
        assert_eq!(fc.focused_note_id(), Some(n1.as_str()));
        assert!(!fc.move_to_prev_note(&repo));
    }

    #[test]
    fn stale_focus_is_not_auto_corrected() {
        let (mut repo, ids) = repo_with(&["a"]);
        let mut fc = FocusController::new();
        fc.focus_todo(&ids[0]);
        repo.delete(&ids[0]);
        assert_eq!(fc.focused_todo_id(), Some(ids[0].as_str()));
        assert!(fc.focused_todo(&repo).is_none());
        assert!(fc.focused_note(&repo).is_none());
        assert_eq!(fc.focused_todo_index(&repo), None);
    }

    #[test]
    fn apply_is_the_single_entry_point() {
        let (repo, ids) = repo_with(&["a", "b"]);
        let mut fc = FocusController::new();
        assert!(fc.apply(FocusEvent::JumpToLast, &repo));
        assert!(fc.apply(FocusEvent::PrevTodo, &repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[0].as_str()));
        assert!(fc.apply(FocusEvent::GoBack, &repo));
        assert_eq!(fc.focused_todo_id(), Some(ids[1].as_str()));
        assert!(fc.apply(FocusEvent::ClearFocus, &repo));
        assert_eq!(fc.focus_type(), FocusType::None);
    }
}
