use chrono::Utc;

use crate::model::todo::{Note, Priority, Todo, TodoStatus};
use crate::util::ids;

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Todos partitioned by status, each bucket in list order
#[derive(Debug, Default)]
pub struct StatusBuckets<'a> {
    pub todo: Vec<&'a Todo>,
    pub doing: Vec<&'a Todo>,
    pub done: Vec<&'a Todo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoStats {
    pub total: usize,
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

/// The canonical, ordered list of todos and their notes.
///
/// Mutators never fail: an id or index that doesn't resolve turns the call
/// into a no-op, reported through a `false`/`None` return. Every change bumps
/// `revision`, which the persistence layer compares to decide when to save.
#[derive(Debug, Clone, Default)]
pub struct TodoRepository {
    todos: Vec<Todo>,
    revision: u64,
}

impl TodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from previously stored todos
    pub fn from_todos(todos: Vec<Todo>) -> Self {
        for todo in &todos {
            ids::observe_id(&todo.id);
            for note in &todo.notes {
                ids::observe_id(&note.id);
            }
        }
        TodoRepository { todos, revision: 0 }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    /// Todo at a position in the full list
    pub fn todo_by_index(&self, index: usize) -> Option<&Todo> {
        self.todos.get(index)
    }

    pub fn note(&self, todo_id: &str, note_id: &str) -> Option<&Note> {
        self.get(todo_id)?.note(note_id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    fn changed(&mut self) {
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub fn by_status(&self) -> StatusBuckets<'_> {
        let mut buckets = StatusBuckets::default();
        for todo in &self.todos {
            match todo.status {
                TodoStatus::Todo => buckets.todo.push(todo),
                TodoStatus::Doing => buckets.doing.push(todo),
                TodoStatus::Done => buckets.done.push(todo),
            }
        }
        buckets
    }

    pub fn doing_todo(&self) -> Option<&Todo> {
        self.todos.iter().find(|t| t.status == TodoStatus::Doing)
    }

    /// True while some todo is DOING; the visible view narrows to it
    pub fn is_focus_mode(&self) -> bool {
        self.doing_todo().is_some()
    }

    /// The list navigation walks: just the DOING todo if there is one,
    /// otherwise everything.
    pub fn visible_todos(&self) -> Vec<&Todo> {
        match self.doing_todo() {
            Some(doing) => vec![doing],
            None => self.todos.iter().collect(),
        }
    }

    pub fn stats(&self) -> TodoStats {
        let buckets = self.by_status();
        TodoStats {
            total: self.todos.len(),
            todo: buckets.todo.len(),
            doing: buckets.doing.len(),
            done: buckets.done.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Todo mutators
    // -----------------------------------------------------------------------

    /// Append a new TODO-status todo. Returns its id.
    pub fn add(&mut self, content: &str, priority: Priority, tags: Vec<String>) -> String {
        let id = ids::fresh_id();
        let todo = Todo::new(id.clone(), content.to_string(), priority, tags, now_millis());
        self.todos.push(todo);
        self.changed();
        id
    }

    /// Set a todo's status. Setting DOING first demotes whichever other todo
    /// is DOING, so at most one ever is. A missing id changes nothing.
    pub fn set_status(&mut self, id: &str, status: TodoStatus) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        let now = now_millis();
        if status == TodoStatus::Doing {
            self.demote_doing_except(id, now);
        }
        if let Some(todo) = self.get_mut(id) {
            todo.status = status;
            todo.touch(now);
        }
        self.changed();
        true
    }

    fn demote_doing_except(&mut self, id: &str, now: i64) {
        for other in self.todos.iter_mut() {
            if other.id != id && other.status == TodoStatus::Doing {
                other.status = TodoStatus::Todo;
                other.touch(now);
            }
        }
    }

    pub fn start(&mut self, id: &str) -> bool {
        self.set_status(id, TodoStatus::Doing)
    }

    pub fn complete(&mut self, id: &str) -> bool {
        self.set_status(id, TodoStatus::Done)
    }

    pub fn reset(&mut self, id: &str) -> bool {
        self.set_status(id, TodoStatus::Todo)
    }

    /// TODO → DOING → DONE → TODO
    pub fn cycle_status(&mut self, id: &str) -> bool {
        match self.get(id).map(|t| t.status.cycled()) {
            Some(next) => self.set_status(id, next),
            None => false,
        }
    }

    /// Remove a todo and all its notes. Focus is the caller's problem.
    pub fn delete(&mut self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    pub fn toggle_priority(&mut self, id: &str) -> bool {
        self.update_with(id, |todo| todo.priority = todo.priority.toggled())
    }

    pub fn update_content(&mut self, id: &str, content: &str) -> bool {
        self.update_with(id, |todo| todo.content = content.to_string())
    }

    /// Add a tag if not already present
    pub fn add_tag(&mut self, id: &str, tag: &str) -> bool {
        let already_tagged = match self.get(id) {
            Some(todo) => todo.tags.iter().any(|t| t == tag),
            None => return false,
        };
        if already_tagged {
            return false;
        }
        self.update_with(id, |todo| todo.tags.push(tag.to_string()))
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str) -> bool {
        self.update_with(id, |todo| todo.tags.retain(|t| t != tag))
    }

    fn update_with(&mut self, id: &str, f: impl FnOnce(&mut Todo)) -> bool {
        let now = now_millis();
        let Some(todo) = self.get_mut(id) else {
            return false;
        };
        f(todo);
        todo.touch(now);
        self.changed();
        true
    }

    /// Move the todo at `from` to `to` (splice semantics). Out-of-range
    /// indices and `from == to` are no-ops.
    pub fn reorder_by_index(&mut self, from: usize, to: usize) -> bool {
        let len = self.todos.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let moved = self.todos.remove(from);
        self.todos.insert(to, moved);
        self.changed();
        true
    }

    /// Move a todo, by id, to `to_index`
    pub fn reorder(&mut self, id: &str, to_index: usize) -> bool {
        match self.index_of(id) {
            Some(from) => self.reorder_by_index(from, to_index),
            None => false,
        }
    }

    /// Drop every DONE todo. Returns the removed ids.
    pub fn clear_done(&mut self) -> Vec<String> {
        let removed: Vec<String> = self
            .todos
            .iter()
            .filter(|t| t.is_done())
            .map(|t| t.id.clone())
            .collect();
        if !removed.is_empty() {
            self.todos.retain(|t| !t.is_done());
            self.changed();
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Note mutators
    // -----------------------------------------------------------------------

    /// Append a note to a todo. Returns the note id, or None if the todo is missing.
    pub fn add_note(&mut self, todo_id: &str, content: &str) -> Option<String> {
        let now = now_millis();
        let todo = self.get_mut(todo_id)?;
        let note_id = ids::fresh_id();
        todo.notes.push(Note::new(note_id.clone(), content.to_string(), now));
        todo.touch(now);
        self.changed();
        Some(note_id)
    }

    pub fn update_note(&mut self, todo_id: &str, note_id: &str, content: &str) -> bool {
        let now = now_millis();
        let Some(todo) = self.get_mut(todo_id) else {
            return false;
        };
        let Some(note) = todo.notes.iter_mut().find(|n| n.id == note_id) else {
            return false;
        };
        note.content = content.to_string();
        note.updated_at = now;
        todo.touch(now);
        self.changed();
        true
    }

    pub fn delete_note(&mut self, todo_id: &str, note_id: &str) -> bool {
        self.remove_note(todo_id, note_id).is_some()
    }

    /// Move a note within its todo (splice semantics)
    pub fn reorder_notes(&mut self, todo_id: &str, from: usize, to: usize) -> bool {
        let now = now_millis();
        let Some(todo) = self.get_mut(todo_id) else {
            return false;
        };
        let len = todo.notes.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let moved = todo.notes.remove(from);
        todo.notes.insert(to, moved);
        todo.touch(now);
        self.changed();
        true
    }

    pub fn move_note(&mut self, todo_id: &str, note_id: &str, to_index: usize) -> bool {
        match self.get(todo_id).and_then(|t| t.note_index(note_id)) {
            Some(from) => self.reorder_notes(todo_id, from, to_index),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Whole-entity primitives (used to restore snapshots)
    // -----------------------------------------------------------------------

    /// Insert a todo at `index` (clamped to the list length). Rejects a
    /// todo whose id is already present. A DOING todo demotes the others.
    pub fn insert_at(&mut self, index: usize, todo: Todo) -> bool {
        if self.index_of(&todo.id).is_some() {
            return false;
        }
        if todo.status == TodoStatus::Doing {
            self.demote_doing_except(&todo.id, now_millis());
        }
        let idx = index.min(self.todos.len());
        self.todos.insert(idx, todo);
        self.changed();
        true
    }

    /// Remove a todo, returning where it was and what it was
    pub fn remove(&mut self, id: &str) -> Option<(usize, Todo)> {
        let idx = self.index_of(id)?;
        let todo = self.todos.remove(idx);
        self.changed();
        Some((idx, todo))
    }

    /// Swap in a whole todo with the same id, returning the one it replaced
    pub fn replace(&mut self, todo: Todo) -> Option<Todo> {
        let idx = self.index_of(&todo.id)?;
        if todo.status == TodoStatus::Doing {
            self.demote_doing_except(&todo.id, now_millis());
        }
        let old = std::mem::replace(&mut self.todos[idx], todo);
        self.changed();
        Some(old)
    }

    pub fn insert_note_at(&mut self, todo_id: &str, index: usize, note: Note) -> bool {
        let Some(todo) = self.get_mut(todo_id) else {
            return false;
        };
        if todo.note_index(&note.id).is_some() {
            return false;
        }
        let idx = index.min(todo.notes.len());
        todo.notes.insert(idx, note);
        self.changed();
        true
    }

    pub fn remove_note(&mut self, todo_id: &str, note_id: &str) -> Option<(usize, Note)> {
        let now = now_millis();
        let todo = self.get_mut(todo_id)?;
        let idx = todo.note_index(note_id)?;
        let note = todo.notes.remove(idx);
        todo.touch(now);
        self.changed();
        Some((idx, note))
    }

    pub fn replace_note(&mut self, todo_id: &str, note: Note) -> Option<Note> {
        let todo = self.get_mut(todo_id)?;
        let idx = todo.note_index(&note.id)?;
        let old = std::mem::replace(&mut todo.notes[idx], note);
        self.changed();
        Some(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repo_with(contents: &[&str]) -> (TodoRepository, Vec<String>) {
        let mut repo = TodoRepository::new();
        let ids = contents
            .iter()
            .map(|c| repo.add(c, Priority::Default, vec![]))
            .collect();
        (repo, ids)
    }

    fn contents(repo: &TodoRepository) -> Vec<&str> {
        repo.todos().iter().map(|t| t.content.as_str()).collect()
    }

    fn doing_count(repo: &TodoRepository) -> usize {
        repo.todos()
            .iter()
            .filter(|t| t.status == TodoStatus::Doing)
            .count()
    }

    #[test]
    fn add_appends_todo_status_todo() {
        let (repo, ids) = repo_with(&["a", "b"]);
        assert_eq!(contents(&repo), vec!["a", "b"]);
        let a = repo.get(&ids[0]).unwrap();
        assert_eq!(a.status, TodoStatus::Todo);
        assert_eq!(a.created_at, a.updated_at);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn add_keeps_priority_and_tags() {
        let mut repo = TodoRepository::new();
        let id = repo.add("x", Priority::Important, vec!["work".into()]);
        let todo = repo.get(&id).unwrap();
        assert!(todo.is_important());
        assert_eq!(todo.tags, vec!["work"]);
    }

    #[test]
    fn single_doing_invariant_holds_across_status_changes() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        let sequence = [
            (0, TodoStatus::Doing),
            (1, TodoStatus::Doing),
            (2, TodoStatus::Done),
            (2, TodoStatus::Doing),
            (0, TodoStatus::Doing),
            (0, TodoStatus::Todo),
            (1, TodoStatus::Doing),
        ];
        for (idx, status) in sequence {
            repo.set_status(&ids[idx], status);
            assert!(doing_count(&repo) <= 1);
        }
        assert_eq!(repo.doing_todo().unwrap().id, ids[1]);
    }

    #[test]
    fn set_status_demotes_previous_doing_to_todo() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        repo.start(&ids[0]);
        repo.start(&ids[1]);
        assert_eq!(repo.get(&ids[0]).unwrap().status, TodoStatus::Todo);
        assert_eq!(repo.get(&ids[1]).unwrap().status, TodoStatus::Doing);
    }

    #[test]
    fn set_status_on_missing_id_keeps_current_doing() {
        let mut repo = TodoRepository::from_todos(vec![Todo::new(
            "1".into(),
            "a".into(),
            Priority::Default,
            vec![],
            0,
        )]);
        assert!(repo.set_status("1", TodoStatus::Doing));
        assert!(!repo.set_status("2", TodoStatus::Doing));
        assert_eq!(repo.get("1").unwrap().status, TodoStatus::Doing);
        assert!(!repo.reorder_by_index(0, 0));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn set_status_refreshes_updated_at() {
        let mut repo = TodoRepository::from_todos(vec![Todo::new(
            "1".into(),
            "a".into(),
            Priority::Default,
            vec![],
            0,
        )]);
        repo.complete("1");
        assert!(repo.get("1").unwrap().updated_at > 0);
    }

    #[test]
    fn cycle_status_walks_the_cycle() {
        let (mut repo, ids) = repo_with(&["a"]);
        repo.cycle_status(&ids[0]);
        assert_eq!(repo.get(&ids[0]).unwrap().status, TodoStatus::Doing);
        repo.cycle_status(&ids[0]);
        assert_eq!(repo.get(&ids[0]).unwrap().status, TodoStatus::Done);
        repo.cycle_status(&ids[0]);
        assert_eq!(repo.get(&ids[0]).unwrap().status, TodoStatus::Todo);
        assert!(!repo.cycle_status("missing"));
    }

    #[test]
    fn delete_removes_todo_and_notes() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        repo.add_note(&ids[0], "n1").unwrap();
        assert!(repo.delete(&ids[0]));
        assert_eq!(contents(&repo), vec!["b"]);
        assert!(!repo.delete(&ids[0]));
    }

    #[test]
    fn field_mutators_and_missing_ids() {
        let (mut repo, ids) = repo_with(&["a"]);
        assert!(repo.toggle_priority(&ids[0]));
        assert!(repo.get(&ids[0]).unwrap().is_important());
        assert!(repo.toggle_priority(&ids[0]));
        assert!(!repo.get(&ids[0]).unwrap().is_important());
        assert!(repo.update_content(&ids[0], "renamed"));
        assert_eq!(repo.get(&ids[0]).unwrap().content, "renamed");

        let before = repo.revision();
        assert!(!repo.toggle_priority("nope"));
        assert!(!repo.update_content("nope", "x"));
        assert_eq!(repo.revision(), before);
    }

    #[test]
    fn tags_are_a_set_in_insertion_order() {
        let (mut repo, ids) = repo_with(&["a"]);
        assert!(repo.add_tag(&ids[0], "x"));
        assert!(repo.add_tag(&ids[0], "y"));
        assert!(!repo.add_tag(&ids[0], "x"));
        assert_eq!(repo.get(&ids[0]).unwrap().tags, vec!["x", "y"]);
        repo.remove_tag(&ids[0], "x");
        assert_eq!(repo.get(&ids[0]).unwrap().tags, vec!["y"]);
    }

    #[test]
    fn notes_crud() {
        let (mut repo, ids) = repo_with(&["a"]);
        let n1 = repo.add_note(&ids[0], "first").unwrap();
        let n2 = repo.add_note(&ids[0], "second").unwrap();
        assert!(repo.update_note(&ids[0], &n1, "edited"));
        assert_eq!(repo.note(&ids[0], &n1).unwrap().content, "edited");
        assert!(repo.delete_note(&ids[0], &n2));
        assert_eq!(repo.get(&ids[0]).unwrap().notes.len(), 1);
        assert!(repo.add_note("missing", "x").is_none());
        assert!(!repo.update_note(&ids[0], "missing", "x"));
    }

    #[test]
    fn reorder_moves_by_splice() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        assert!(repo.reorder(&ids[0], 2));
        assert_eq!(contents(&repo), vec!["b", "c", "a"]);
        assert!(repo.reorder(&ids[0], 0));
        assert_eq!(contents(&repo), vec!["a", "b", "c"]);
    }

    #[test]
    fn reorder_rejects_out_of_range_and_self_move() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        let before = repo.revision();
        assert!(!repo.reorder(&ids[0], 5));
        assert!(!repo.reorder(&ids[1], 1));
        assert!(!repo.reorder("missing", 0));
        assert_eq!(contents(&repo), vec!["a", "b"]);
        assert_eq!(repo.revision(), before);
    }

    #[test]
    fn reorder_notes_moves_within_parent() {
        let (mut repo, ids) = repo_with(&["a"]);
        let n1 = repo.add_note(&ids[0], "1").unwrap();
        repo.add_note(&ids[0], "2").unwrap();
        repo.add_note(&ids[0], "3").unwrap();
        assert!(repo.move_note(&ids[0], &n1, 2));
        let order: Vec<&str> = repo.get(&ids[0]).unwrap().notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(order, vec!["2", "3", "1"]);
        assert!(!repo.reorder_notes(&ids[0], 1, 1));
        assert!(!repo.reorder_notes(&ids[0], 0, 3));
    }

    #[test]
    fn visible_view_narrows_to_doing() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        assert_eq!(repo.visible_todos().len(), 3);
        assert!(!repo.is_focus_mode());
        repo.start(&ids[1]);
        let visible = repo.visible_todos();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, ids[1]);
        assert!(repo.is_focus_mode());
    }

    #[test]
    fn by_status_and_stats() {
        let (mut repo, ids) = repo_with(&["a", "b", "c", "d"]);
        repo.start(&ids[0]);
        repo.complete(&ids[1]);
        repo.complete(&ids[2]);
        let buckets = repo.by_status();
        assert_eq!(buckets.todo.len(), 1);
        assert_eq!(buckets.doing.len(), 1);
        assert_eq!(buckets.done.len(), 2);
        assert_eq!(
            repo.stats(),
            TodoStats {
                total: 4,
                todo: 1,
                doing: 1,
                done: 2
            }
        );
    }

    #[test]
    fn clear_done_returns_removed_ids() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        repo.complete(&ids[0]);
        repo.complete(&ids[2]);
        let removed = repo.clear_done();
        assert_eq!(removed, vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(contents(&repo), vec!["b"]);
        assert!(repo.clear_done().is_empty());
    }

    #[test]
    fn insert_at_rejects_duplicates_and_clamps() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        let (idx, todo) = repo.remove(&ids[0]).unwrap();
        assert_eq!(idx, 0);
        assert!(repo.insert_at(99, todo.clone()));
        assert_eq!(contents(&repo), vec!["b", "a"]);
        assert!(!repo.insert_at(0, todo));
    }

    #[test]
    fn replace_restores_doing_without_breaking_invariant() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        repo.start(&ids[0]);
        let snapshot = repo.get(&ids[0]).unwrap().clone();
        repo.start(&ids[1]);
        let replaced = repo.replace(snapshot).unwrap();
        assert_eq!(replaced.status, TodoStatus::Todo);
        assert_eq!(doing_count(&repo), 1);
        assert_eq!(repo.doing_todo().unwrap().id, ids[0]);
    }

    #[test]
    fn note_primitives_round_trip() {
        let (mut repo, ids) = repo_with(&["a"]);
        repo.add_note(&ids[0], "1").unwrap();
        let n2 = repo.add_note(&ids[0], "2").unwrap();
        let (idx, note) = repo.remove_note(&ids[0], &n2).unwrap();
        assert_eq!(idx, 1);
        assert!(repo.insert_note_at(&ids[0], idx, note.clone()));
        assert!(!repo.insert_note_at(&ids[0], 0, note));
        let mut edited = repo.note(&ids[0], &n2).unwrap().clone();
        edited.content = "two".into();
        let old = repo.replace_note(&ids[0], edited).unwrap();
        assert_eq!(old.content, "2");
        assert_eq!(repo.note(&ids[0], &n2).unwrap().content, "two");
    }
}
