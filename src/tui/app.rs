use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::store::{self, FileStore, KeyValueStore, StoreError};
use crate::model::{Config, EditTarget, FocusState, TodoStatus};
use crate::ops::todo_ops::TodoRepository;
use crate::parse::{ParsedInput, parse_input};

use super::command_actions;
use super::command_registry::{Command, CommandRegistry};
use super::focus::FocusController;
use super::input;
use super::line_buffer::LineBuffer;
use super::render;
use super::theme::Theme;
use super::undo::{UndoAction, UndoLog};

/// Which layer owns the next key, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Confirm,
    Popup,
    Help,
    Command,
    Edit,
    Compose,
    Navigate,
}

/// A destructive action waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTodo { todo_id: String },
    DeleteNote { todo_id: String, note_id: String },
    ClearDone,
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub message: String,
    pub action: ConfirmAction,
}

/// Read-only text shown in a centered box until any key
#[derive(Debug, Clone)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

/// The buffer behind an in-place edit (focus is `Input`)
#[derive(Debug, Clone)]
pub struct EditSession {
    pub target: EditTarget,
    pub todo_id: String,
    pub note_id: Option<String>,
    pub buffer: LineBuffer,
    /// The note was created empty by "add note" and disappears if left empty
    pub fresh_note: bool,
}

/// Main application state
pub struct App {
    pub repo: TodoRepository,
    pub focus: FocusController,
    pub commands: CommandRegistry,
    pub undo: UndoLog,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    pub confirm: Option<ConfirmState>,
    pub popup: Option<Popup>,
    /// The compose line, when open
    pub compose: Option<LineBuffer>,
    pub edit: Option<EditSession>,
    /// Toast shown in the status row until the next key
    pub status_message: Option<String>,
    pub status_is_error: bool,
    store: Option<Box<dyn KeyValueStore>>,
    saved_revision: u64,
    saved_recent: Vec<String>,
}

impl App {
    pub fn new(repo: TodoRepository, config: &Config) -> Self {
        let mut commands = CommandRegistry::new();
        command_actions::register_builtin(&mut commands);
        App {
            saved_revision: repo.revision(),
            repo,
            focus: FocusController::new(),
            commands,
            undo: UndoLog::new(),
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            should_quit: false,
            show_help: false,
            confirm: None,
            popup: None,
            compose: None,
            edit: None,
            status_message: None,
            status_is_error: false,
            store: None,
            saved_recent: Vec::new(),
        }
    }

    /// Attach a store; later changes are written to it after each event
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self.saved_revision = self.repo.revision();
        self.saved_recent = self.commands.recent_ids().to_vec();
        self
    }

    /// Rehydrate todos and the recent-command list from `store`
    pub fn load(store: Box<dyn KeyValueStore>, config: &Config) -> Result<Self, StoreError> {
        let todos = store::load_todos(&*store)?;
        let recent = store::load_recent(&*store)?;
        tracing::info!(todos = todos.len(), recent = recent.len(), "loaded stored state");
        let mut app = App::new(TodoRepository::from_todos(todos), config);
        app.commands.set_recent_ids(recent);
        Ok(app.with_store(store))
    }

    pub fn mode(&self) -> Mode {
        if self.confirm.is_some() {
            Mode::Confirm
        } else if self.popup.is_some() {
            Mode::Popup
        } else if self.show_help {
            Mode::Help
        } else if self.commands.is_open() {
            Mode::Command
        } else if self.focus.is_editing() {
            Mode::Edit
        } else if self.compose.is_some() {
            Mode::Compose
        } else {
            Mode::Navigate
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = false;
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
    }

    /// Owned copy of the focused todo id, for use across mutations
    pub fn focused_todo_id(&self) -> Option<String> {
        self.focus.focused_todo_id().map(str::to_string)
    }

    // -----------------------------------------------------------------------
    // Command execution
    // -----------------------------------------------------------------------

    /// Record in the MRU list, close the palette, then run the action
    pub fn execute_command(&mut self, command: Command) {
        tracing::debug!(id = %command.id, "executing command");
        self.commands.mark_executed(&command.id);
        (command.action)(self);
    }

    pub fn execute_by_id(&mut self, id: &str) -> bool {
        let found = self
            .commands
            .find_by_id(self.focus.state(), &self.repo, id)
            .cloned();
        self.run_found(found)
    }

    pub fn execute_by_shortcut(&mut self, shortcut: &str) -> bool {
        let found = self
            .commands
            .find_by_shortcut(self.focus.state(), &self.repo, shortcut)
            .cloned();
        self.run_found(found)
    }

    /// Run the palette's highlighted entry
    pub fn execute_selected(&mut self) -> bool {
        let found = self
            .commands
            .selected_command(self.focus.state(), &self.repo)
            .cloned();
        self.run_found(found)
    }

    fn run_found(&mut self, command: Option<Command>) -> bool {
        match command {
            Some(command) => {
                self.execute_command(command);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Undoable mutations shared by commands, edits and the compose line
    // -----------------------------------------------------------------------

    /// Set a todo's status, recording the change for undo
    pub fn change_status(&mut self, todo_id: &str, status: TodoStatus) -> bool {
        let Some(index) = self.repo.index_of(todo_id) else {
            return false;
        };
        let Some(before) = self.repo.get(todo_id).cloned() else {
            return false;
        };
        if before.status == status {
            return false;
        }
        self.repo.set_status(todo_id, status);
        self.undo
            .record(UndoAction::status_changed(&before, index, status));
        true
    }

    /// Move a todo to `to`, recording the move for undo
    pub fn move_todo(&mut self, todo_id: &str, to: usize) -> bool {
        let Some(from) = self.repo.index_of(todo_id) else {
            return false;
        };
        let Some(todo) = self.repo.get(todo_id).cloned() else {
            return false;
        };
        if !self.repo.reorder(todo_id, to) {
            return false;
        }
        self.undo.record(UndoAction::todo_moved(&todo, from, to));
        true
    }

    /// Move a note within its todo, recording the move for undo
    pub fn move_note(&mut self, todo_id: &str, note_id: &str, to: usize) -> bool {
        let Some(todo) = self.repo.get(todo_id) else {
            return false;
        };
        let (Some(from), Some(note)) = (todo.note_index(note_id), todo.note(note_id).cloned()) else {
            return false;
        };
        if !self.repo.move_note(todo_id, note_id, to) {
            return false;
        }
        self.undo
            .record(UndoAction::note_moved(todo_id, &note, from, to));
        true
    }

    // -----------------------------------------------------------------------
    // In-place edit
    // -----------------------------------------------------------------------

    /// Enter edit mode on a todo or one of its notes
    pub fn begin_edit(&mut self, target: EditTarget, todo_id: &str, note_id: Option<&str>, fresh_note: bool) {
        self.focus.start_edit(target, Some(todo_id), note_id);
        self.edit = self.session_for(target, todo_id, note_id, fresh_note);
    }

    fn session_for(
        &self,
        target: EditTarget,
        todo_id: &str,
        note_id: Option<&str>,
        fresh_note: bool,
    ) -> Option<EditSession> {
        let content = match (target, note_id) {
            (EditTarget::Note, Some(note_id)) => &self.repo.note(todo_id, note_id)?.content,
            _ => &self.repo.get(todo_id)?.content,
        };
        Some(EditSession {
            target,
            todo_id: todo_id.to_string(),
            note_id: note_id.map(str::to_string),
            buffer: LineBuffer::with_text(content),
            fresh_note,
        })
    }

    /// Write the edit buffer back. An empty buffer is treated as a cancel.
    pub fn commit_edit(&mut self) {
        let Some(session) = self.edit.take() else {
            self.focus.commit_edit(&self.repo);
            return;
        };
        let text = session.buffer.text().trim().to_string();
        if text.is_empty() {
            self.discard_session(session);
            self.focus.go_back();
            return;
        }
        match (session.target, session.note_id.as_deref()) {
            (EditTarget::Note, Some(note_id)) => {
                let todo_id = session.todo_id.as_str();
                let Some(todo) = self.repo.get(todo_id) else {
                    self.focus.go_back();
                    return;
                };
                let (Some(index), Some(before)) = (todo.note_index(note_id), todo.note(note_id).cloned()) else {
                    self.focus.go_back();
                    return;
                };
                self.repo.update_note(todo_id, note_id, &text);
                if session.fresh_note {
                    if let Some(after) = self.repo.note(todo_id, note_id).cloned() {
                        self.undo
                            .record(UndoAction::note_created(todo_id, &after, index));
                    }
                } else if before.content != text {
                    self.undo
                        .record(UndoAction::note_updated(todo_id, &before, index));
                }
            }
            _ => {
                let todo_id = session.todo_id.as_str();
                if let (Some(index), Some(before)) =
                    (self.repo.index_of(todo_id), self.repo.get(todo_id).cloned())
                    && before.content != text
                {
                    self.repo.update_content(todo_id, &text);
                    self.undo
                        .record(UndoAction::todo_updated(&before, index, "Edit todo"));
                }
            }
        }
        self.focus.commit_edit(&self.repo);
    }

    /// Abandon the edit and step back out of it
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.edit.take() {
            self.discard_session(session);
        }
        self.focus.go_back();
    }

    /// A fresh note that never got content is removed again
    fn discard_session(&mut self, session: EditSession) {
        if session.fresh_note
            && let Some(note_id) = session.note_id.as_deref()
        {
            self.repo.remove_note(&session.todo_id, note_id);
        }
    }

    /// Keep the edit session in step with focus: entering `Input` through
    /// plain navigation opens a session, leaving it by any route closes it.
    fn sync_edit_session(&mut self) {
        match self.focus.state().clone() {
            FocusState::Input {
                target,
                todo_id: Some(todo_id),
                note_id,
            } => {
                let current = self.edit.as_ref().is_some_and(|s| {
                    s.target == target && s.todo_id == todo_id && s.note_id == note_id
                });
                if !current {
                    self.edit = self.session_for(target, &todo_id, note_id.as_deref(), false);
                    if self.edit.is_none() {
                        self.focus.go_back();
                    }
                }
            }
            FocusState::Input { .. } => {
                self.edit = None;
                self.focus.go_back();
            }
            _ => {
                if let Some(session) = self.edit.take() {
                    self.discard_session(session);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Compose line
    // -----------------------------------------------------------------------

    pub fn open_compose(&mut self, prefill: &str) {
        self.compose = Some(LineBuffer::with_text(prefill));
    }

    pub fn close_compose(&mut self) {
        self.compose = None;
    }

    /// Act on the compose line's text. New todos keep the line open for the
    /// next entry; everything else closes it.
    pub fn submit_compose(&mut self) {
        let Some(text) = self.compose.as_ref().map(|b| b.text().to_string()) else {
            return;
        };
        let focused = self.focused_todo_id();
        match parse_input(&text, focused.is_some()) {
            ParsedInput::NoteSelect { index } => {
                self.close_compose();
                let target = focused
                    .as_deref()
                    .and_then(|id| self.repo.get(id))
                    .and_then(|todo| Some((todo.id.clone(), todo.notes.get(index.checked_sub(1)?)?.id.clone())));
                match target {
                    Some((todo_id, note_id)) => {
                        self.focus.focus_note(&self.repo, &todo_id, &note_id);
                    }
                    None => self.notify_error(format!("No note {}", index)),
                }
            }
            ParsedInput::Select { index } => {
                self.close_compose();
                if index == 0 || !self.focus.jump_to_index(&self.repo, index - 1) {
                    self.notify_error(format!("No todo {}", index));
                }
            }
            ParsedInput::Command { text } if text.trim().is_empty() => {
                self.close_compose();
                self.commands.open();
            }
            ParsedInput::Command { text } => {
                self.close_compose();
                self.commands.set_filter(&text);
                let first = self
                    .commands
                    .filtered(self.focus.state(), &self.repo)
                    .first()
                    .map(|c| (*c).clone());
                self.commands.set_filter("");
                match first {
                    Some(command) => self.execute_command(command),
                    None => self.notify_error(format!("No command matches \"{}\"", text)),
                }
            }
            ParsedInput::Note { content } => {
                self.close_compose();
                if let Some(todo_id) = focused {
                    self.add_note_with_undo(&todo_id, &content);
                }
            }
            ParsedInput::NewTodo(new) => {
                if new.content.is_empty() {
                    return;
                }
                let id = self.repo.add(&new.content, new.priority, new.tags);
                if let (Some(index), Some(todo)) = (self.repo.index_of(&id), self.repo.get(&id)) {
                    let action = UndoAction::todo_created(todo, index);
                    self.undo.record(action);
                }
                if let Some(buffer) = &mut self.compose {
                    buffer.clear();
                }
            }
        }
    }

    fn add_note_with_undo(&mut self, todo_id: &str, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        let Some(note_id) = self.repo.add_note(todo_id, content) else {
            return;
        };
        if let Some(todo) = self.repo.get(todo_id)
            && let (Some(index), Some(note)) = (todo.note_index(&note_id), todo.note(&note_id))
        {
            let action = UndoAction::note_created(todo_id, note, index);
            self.undo.record(action);
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Bookkeeping after each handled event
    pub fn after_event(&mut self) {
        self.sync_edit_session();
        self.persist();
    }

    /// Write todos and the MRU list if either changed since the last save
    pub fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let mut failure = None;
        if self.repo.revision() != self.saved_revision {
            match store::save_todos(&mut **store, self.repo.todos()) {
                Ok(()) => self.saved_revision = self.repo.revision(),
                Err(e) => failure = Some(e),
            }
        }
        if self.commands.recent_ids() != self.saved_recent.as_slice() {
            match store::save_recent(&mut **store, self.commands.recent_ids()) {
                Ok(()) => self.saved_recent = self.commands.recent_ids().to_vec(),
                Err(e) => failure = Some(e),
            }
        }
        if let Some(e) = failure {
            tracing::error!(error = %e, "failed to save");
            self.notify_error(format!("Save failed: {}", e));
        }
    }
}

/// Run the TUI application against the store in `data_dir`
pub fn run(data_dir: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(data_dir);
    let mut app = App::load(Box::new(store), config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                    app.after_event();
                }
                Event::Paste(text) => {
                    input::handle_paste(app, &text);
                    app.after_event();
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
