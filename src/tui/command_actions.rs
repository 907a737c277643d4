use crate::model::{EditTarget, FocusState, TodoStatus};
use crate::ops::todo_ops::TodoRepository;
use crate::tui::app::{App, ConfirmAction, ConfirmState, Popup};
use crate::tui::command_registry::{Command, CommandRegistry};
use crate::tui::undo::UndoAction;
use crate::util::unicode::truncate_graphemes;

const CONFIRM_PREVIEW_GRAPHEMES: usize = 40;

// ---------------------------------------------------------------------------
// Availability predicates
// ---------------------------------------------------------------------------

fn todo_or_note(focus: &FocusState, _repo: &TodoRepository) -> bool {
    focus.is_todo() || focus.is_note()
}

fn todo_focus(focus: &FocusState, _repo: &TodoRepository) -> bool {
    focus.is_todo()
}

fn note_focus(focus: &FocusState, _repo: &TodoRepository) -> bool {
    focus.is_note()
}

fn not_editing(focus: &FocusState, _repo: &TodoRepository) -> bool {
    !focus.is_input()
}

fn parent_open(focus: &FocusState, repo: &TodoRepository) -> bool {
    focus
        .todo_id()
        .and_then(|id| repo.get(id))
        .is_some_and(|todo| !todo.is_done())
}

fn todo_or_note_open(focus: &FocusState, repo: &TodoRepository) -> bool {
    todo_or_note(focus, repo) && parent_open(focus, repo)
}

fn todo_focus_open(focus: &FocusState, repo: &TodoRepository) -> bool {
    focus.is_todo() && parent_open(focus, repo)
}

fn note_focus_open(focus: &FocusState, repo: &TodoRepository) -> bool {
    focus.is_note() && parent_open(focus, repo)
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Register every built-in command. Commands sharing a shortcut are told
/// apart by their focus gates; the first available one in catalogue order
/// wins.
pub fn register_builtin(registry: &mut CommandRegistry) {
    registry.register_all(builtin_commands());
}

pub fn builtin_commands() -> Vec<Command> {
    vec![
        // -- Todo --
        Command::new("todo:start", "Start", "Mark the todo as doing", |app| {
            set_status(app, TodoStatus::Doing)
        })
        .with_shortcut("S")
        .when(todo_or_note),
        Command::new("todo:complete", "Complete", "Mark the todo as done", |app| {
            set_status(app, TodoStatus::Done)
        })
        .with_shortcut("D")
        .when(todo_or_note),
        Command::new("todo:reset", "Reset", "Put the todo back to todo", |app| {
            set_status(app, TodoStatus::Todo)
        })
        .with_shortcut("R")
        .when(todo_or_note),
        Command::new(
            "todo:cycle-status",
            "Cycle status",
            "Todo, doing, done and around again",
            cycle_status,
        )
        .with_shortcut("Space")
        .when(todo_or_note),
        Command::new("todo:edit", "Edit todo", "Edit the todo's text in place", |app| {
            if let Some(id) = app.focused_todo_id() {
                app.begin_edit(EditTarget::Todo, &id, None, false);
            }
        })
        .with_shortcut("E")
        .when(todo_focus_open),
        Command::new("todo:add-note", "Add note", "Attach a new note to the todo", add_note)
            .with_shortcut("N")
            .when(todo_or_note_open),
        Command::new(
            "todo:toggle-priority",
            "Toggle priority",
            "Mark or unmark the todo as important",
            toggle_priority,
        )
        .with_shortcut("P")
        .when(todo_or_note_open),
        Command::new("todo:delete", "Delete todo", "Remove the todo and its notes", |app| {
            let Some(todo) = app.focused_todo_id().and_then(|id| app.repo.get(&id).cloned()) else {
                return;
            };
            app.confirm = Some(ConfirmState {
                message: format!(
                    "Delete \"{}\"?",
                    truncate_graphemes(&todo.content, CONFIRM_PREVIEW_GRAPHEMES)
                ),
                action: ConfirmAction::DeleteTodo { todo_id: todo.id },
            });
        })
        .with_shortcut("Delete")
        .when(todo_focus),
        Command::new("todo:move-top", "Move to top", "Move the todo to the top of the list", |app| {
            if let Some(id) = app.focused_todo_id() {
                app.move_todo(&id, 0);
            }
        })
        .when(todo_or_note),
        Command::new(
            "todo:move-bottom",
            "Move to bottom",
            "Move the todo to the bottom of the list",
            |app| {
                if let Some(id) = app.focused_todo_id() {
                    let last = app.repo.len().saturating_sub(1);
                    app.move_todo(&id, last);
                }
            },
        )
        .when(todo_or_note),
        Command::new("todo:move-up", "Move up", "Move the todo up one place", |app| {
            step_todo(app, Direction::Up)
        })
        .with_shortcut("Shift+K")
        .when(todo_focus),
        Command::new("todo:move-down", "Move down", "Move the todo down one place", |app| {
            step_todo(app, Direction::Down)
        })
        .with_shortcut("Shift+J")
        .when(todo_focus),
        // -- Note --
        Command::new("note:edit", "Edit note", "Edit the note's text in place", |app| {
            let focus = app.focus.state().clone();
            if let FocusState::Note { todo_id, note_id } = focus {
                app.begin_edit(EditTarget::Note, &todo_id, Some(&note_id), false);
            }
        })
        .with_shortcut("E")
        .when(note_focus_open),
        Command::new("note:delete", "Delete note", "Remove the note", |app| {
            let FocusState::Note { todo_id, note_id } = app.focus.state().clone() else {
                return;
            };
            let Some(note) = app.repo.note(&todo_id, &note_id) else {
                return;
            };
            app.confirm = Some(ConfirmState {
                message: format!(
                    "Delete note \"{}\"?",
                    truncate_graphemes(&note.content, CONFIRM_PREVIEW_GRAPHEMES)
                ),
                action: ConfirmAction::DeleteNote { todo_id, note_id },
            });
        })
        .with_shortcut("Delete")
        .when(note_focus),
        Command::new("note:move-up", "Move note up", "Move the note up one place", |app| {
            step_note(app, Direction::Up)
        })
        .with_shortcut("Shift+K")
        .when(note_focus),
        Command::new("note:move-down", "Move note down", "Move the note down one place", |app| {
            step_note(app, Direction::Down)
        })
        .with_shortcut("Shift+J")
        .when(note_focus),
        Command::new("note:back-to-todo", "Back to todo", "Leave the note for its todo", |app| {
            if let Some(id) = app.focused_todo_id() {
                app.focus.focus_todo(&id);
            }
        })
        .with_shortcut("H")
        .when(note_focus),
        // -- Global --
        Command::new("global:new-todo", "New todo", "Open the compose line", |app| {
            app.focus.clear_focus();
            app.open_compose("");
        })
        .with_shortcut("Ctrl+N"),
        Command::new(
            "global:command-palette",
            "Command palette",
            "Search and run any command",
            |app| app.commands.open(),
        )
        .with_shortcut("Ctrl+K"),
        Command::new("global:undo", "Undo", "Undo the last change", undo).with_shortcut("Ctrl+Z"),
        Command::new("global:redo", "Redo", "Redo the last undone change", redo)
            .with_shortcut("Ctrl+Shift+Z"),
        Command::new(
            "global:clear-done",
            "Clear done",
            "Remove every finished todo",
            |app| {
                let done = app.repo.stats().done;
                if done == 0 {
                    app.notify("Nothing to clear");
                    return;
                }
                app.confirm = Some(ConfirmState {
                    message: format!("Remove {} done todo{}?", done, plural(done)),
                    action: ConfirmAction::ClearDone,
                });
            },
        ),
        Command::new("global:stats", "Statistics", "Show todo counts", show_stats),
        Command::new("global:help", "Help", "List commands and their keys", |app| {
            app.show_help = true;
        })
        .with_shortcut("?"),
        Command::new("global:quit", "Quit", "Leave homeshell", |app| {
            app.should_quit = true;
        })
        .with_shortcut("Q")
        .when(not_editing),
        // -- Navigation --
        Command::new("nav:next", "Next", "Focus the next todo or note", |app| {
            if app.focus.state().is_note() {
                if !app.focus.move_to_next_note(&app.repo) {
                    app.focus.go_back();
                }
            } else {
                app.focus.move_to_next_todo(&app.repo);
            }
        })
        .with_shortcut("J")
        .when(not_editing),
        Command::new("nav:prev", "Previous", "Focus the previous todo or note", |app| {
            if app.focus.state().is_note() {
                app.focus.move_to_prev_note(&app.repo);
            } else {
                app.focus.move_to_prev_todo(&app.repo);
            }
        })
        .with_shortcut("K")
        .when(not_editing),
        Command::new("nav:enter", "Enter", "Open notes, or edit", |app| {
            if app.focus.has_focus() {
                app.focus.enter(&app.repo);
            } else {
                app.focus.move_to_next_todo(&app.repo);
            }
        })
        .with_shortcut("L")
        .when(not_editing),
        Command::new("nav:back", "Back", "Return to where you were", |app| {
            app.focus.go_back();
        })
        .with_shortcut("H")
        .when(not_editing),
        Command::new("nav:first", "First todo", "Focus the first todo", |app| {
            app.focus.jump_to_first(&app.repo);
        })
        .with_shortcut("G")
        .when(not_editing),
        Command::new("nav:last", "Last todo", "Focus the last todo", |app| {
            app.focus.jump_to_last(&app.repo);
        })
        .with_shortcut("Shift+G")
        .when(not_editing),
    ]
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

fn set_status(app: &mut App, status: TodoStatus) {
    if let Some(id) = app.focused_todo_id() {
        app.change_status(&id, status);
    }
}

fn cycle_status(app: &mut App) {
    let Some(id) = app.focused_todo_id() else {
        return;
    };
    if let Some(next) = app.repo.get(&id).map(|t| t.status.cycled()) {
        app.change_status(&id, next);
    }
}

fn add_note(app: &mut App) {
    let Some(id) = app.focused_todo_id() else {
        return;
    };
    if let Some(note_id) = app.repo.add_note(&id, "") {
        app.begin_edit(EditTarget::Note, &id, Some(&note_id), true);
    }
}

fn toggle_priority(app: &mut App) {
    let Some(id) = app.focused_todo_id() else {
        return;
    };
    let (Some(index), Some(before)) = (app.repo.index_of(&id), app.repo.get(&id).cloned()) else {
        return;
    };
    if app.repo.toggle_priority(&id) {
        app.undo
            .record(UndoAction::todo_updated(&before, index, "Toggle priority"));
    }
}

fn step_todo(app: &mut App, direction: Direction) {
    let Some(id) = app.focused_todo_id() else {
        return;
    };
    let Some(index) = app.repo.index_of(&id) else {
        return;
    };
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1),
    };
    if let Some(to) = target {
        app.move_todo(&id, to);
    }
}

fn step_note(app: &mut App, direction: Direction) {
    let FocusState::Note { todo_id, note_id } = app.focus.state().clone() else {
        return;
    };
    let Some(index) = app.repo.get(&todo_id).and_then(|t| t.note_index(&note_id)) else {
        return;
    };
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1),
    };
    if let Some(to) = target {
        app.move_note(&todo_id, &note_id, to);
    }
}

fn undo(app: &mut App) {
    let Some(description) = app.undo.last_action().map(|a| a.description.clone()) else {
        app.notify("Nothing to undo");
        return;
    };
    if app.undo.undo(&mut app.repo) {
        settle_focus(app);
        app.notify(format!("Undone: {}", description));
    } else {
        app.notify_error(format!("Could not undo: {}", description));
    }
}

fn redo(app: &mut App) {
    let Some(description) = app.undo.last_redo_action().map(|a| a.description.clone()) else {
        app.notify("Nothing to redo");
        return;
    };
    if app.undo.redo(&mut app.repo) {
        settle_focus(app);
        app.notify(format!("Redone: {}", description));
    } else {
        app.notify_error(format!("Could not redo: {}", description));
    }
}

/// Undo and redo can remove the focused todo or note. Step up to the parent
/// when it survives, otherwise drop focus.
fn settle_focus(app: &mut App) {
    let Some(todo_id) = app.focus.focused_todo_id().map(str::to_string) else {
        return;
    };
    let note_gone =
        app.focus.focused_note_id().is_some() && app.focus.focused_note(&app.repo).is_none();
    let todo_gone = app.repo.get(&todo_id).is_none();
    if !note_gone && !todo_gone {
        return;
    }
    app.edit = None;
    if todo_gone {
        app.focus.clear_focus();
    } else {
        app.focus.focus_todo(&todo_id);
    }
}

fn show_stats(app: &mut App) {
    let stats = app.repo.stats();
    let mut lines = vec![
        format!("Total  {}", stats.total),
        format!("Todo   {}", stats.todo),
        format!("Doing  {}", stats.doing),
        format!("Done   {}", stats.done),
    ];
    if let Some(doing) = app.repo.doing_todo() {
        lines.push(String::new());
        lines.push(format!("Working on: {}", doing.content));
    }
    app.popup = Some(Popup {
        title: "Statistics".into(),
        lines,
    });
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Carry out a destructive action the user just confirmed. Each one pairs
/// the repository change with the matching focus change.
pub fn run_confirmed(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::DeleteTodo { todo_id } => {
            if let Some((index, todo)) = app.repo.remove(&todo_id) {
                app.undo.record(UndoAction::todo_deleted(&todo, index));
                app.focus.clear_focus();
                app.notify(format!(
                    "Deleted \"{}\"",
                    truncate_graphemes(&todo.content, CONFIRM_PREVIEW_GRAPHEMES)
                ));
            }
        }
        ConfirmAction::DeleteNote { todo_id, note_id } => {
            if let Some((index, note)) = app.repo.remove_note(&todo_id, &note_id) {
                app.undo
                    .record(UndoAction::note_deleted(&todo_id, &note, index));
                app.focus.focus_todo(&todo_id);
            }
        }
        ConfirmAction::ClearDone => {
            let removed = app.repo.clear_done();
            for todo_id in &removed {
                for action_id in app.undo.actions_targeting(todo_id) {
                    app.undo.remove(&action_id);
                }
            }
            if app
                .focus
                .focused_todo_id()
                .is_some_and(|id| removed.iter().any(|r| r == id))
            {
                app.focus.clear_focus();
            }
            app.notify(format!(
                "Cleared {} done todo{}",
                removed.len(),
                plural(removed.len())
            ));
        }
    }
}
