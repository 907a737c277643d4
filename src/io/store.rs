use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::model::todo::Todo;

/// Key holding the todo list
pub const TODOS_KEY: &str = "homeshell-todos";
/// Key holding the most-recently-executed command ids
pub const COMMANDS_KEY: &str = "homeshell-commands";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored data is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable get/set-by-key storage for serialized state
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        atomic_write(&path, value.as_bytes()).map_err(|source| StoreError::Io { path, source })
    }
}

/// Write via a temp file in the same directory, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory store, for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct TodosDocument {
    #[serde(default)]
    todos: Vec<Todo>,
}

#[derive(Serialize)]
struct TodosDocumentRef<'a> {
    todos: &'a [Todo],
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandsDocument {
    #[serde(default)]
    recent_command_ids: Vec<String>,
}

/// Load the stored todo list. A missing key is an empty list.
pub fn load_todos(store: &dyn KeyValueStore) -> Result<Vec<Todo>, StoreError> {
    match store.get(TODOS_KEY)? {
        Some(raw) => Ok(serde_json::from_str::<TodosDocument>(&raw)?.todos),
        None => Ok(Vec::new()),
    }
}

pub fn save_todos(store: &mut dyn KeyValueStore, todos: &[Todo]) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(&TodosDocumentRef { todos })?;
    store.set(TODOS_KEY, &raw)
}

/// Load the MRU command ids. A missing key is an empty list.
pub fn load_recent(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    match store.get(COMMANDS_KEY)? {
        Some(raw) => Ok(serde_json::from_str::<CommandsDocument>(&raw)?.recent_command_ids),
        None => Ok(Vec::new()),
    }
}

pub fn save_recent(store: &mut dyn KeyValueStore, ids: &[String]) -> Result<(), StoreError> {
    let doc = CommandsDocument {
        recent_command_ids: ids.to_vec(),
    };
    store.set(COMMANDS_KEY, &serde_json::to_string(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::{Note, Priority, TodoStatus};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_todo() -> Todo {
        let mut todo = Todo::new(
            "1700000000000".into(),
            "buy milk".into(),
            Priority::Important,
            vec!["home".into()],
            1_700_000_000_000,
        );
        todo.status = TodoStatus::Doing;
        todo.notes.push(Note::new(
            "1700000000001".into(),
            "2 litres".into(),
            1_700_000_000_001,
        ));
        todo
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.get("nothing").unwrap().is_none());
    }

    #[test]
    fn file_store_creates_directory_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("nested"));
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert!(tmp.path().join("nested").join("k.json").exists());
    }

    #[test]
    fn todos_round_trip_through_file_store() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path());
        let todos = vec![sample_todo()];
        save_todos(&mut store, &todos).unwrap();
        assert_eq!(load_todos(&store).unwrap(), todos);
    }

    #[test]
    fn stored_format_uses_camel_case_and_wire_enums() {
        let mut store = MemoryStore::new();
        save_todos(&mut store, &[sample_todo()]).unwrap();
        let raw = store.get(TODOS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let todo = &value["todos"][0];
        assert_eq!(todo["status"], "DOING");
        assert_eq!(todo["priority"], "important");
        assert_eq!(todo["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(todo["notes"][0]["content"], "2 litres");
    }

    #[test]
    fn loads_documents_written_by_hand() {
        let mut store = MemoryStore::new();
        store
            .set(
                TODOS_KEY,
                r#"{"todos":[{"id":"5","content":"x","status":"DONE","createdAt":1,"updatedAt":2}]}"#,
            )
            .unwrap();
        let todos = load_todos(&store).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].status, TodoStatus::Done);
        assert_eq!(todos[0].priority, Priority::Default);
        assert!(todos[0].notes.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(TODOS_KEY, "not json {{{").unwrap();
        assert!(matches!(load_todos(&store), Err(StoreError::Json(_))));
    }

    #[test]
    fn recent_ids_round_trip() {
        let mut store = MemoryStore::new();
        assert!(load_recent(&store).unwrap().is_empty());
        let ids = vec!["global:undo".to_string(), "todo:start".to_string()];
        save_recent(&mut store, &ids).unwrap();
        assert_eq!(
            store.get(COMMANDS_KEY).unwrap().unwrap(),
            r#"{"recentCommandIds":["global:undo","todo:start"]}"#
        );
        assert_eq!(load_recent(&store).unwrap(), ids);
    }
}
