mod init;
pub use init::cmd_init;

use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::store::{self, FileStore};
use crate::model::todo::{Todo, TodoStatus};
use crate::ops::todo_ops::TodoRepository;
use crate::parse::parse_new_todo;
use crate::tui::command_actions;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run a one-shot subcommand against the store in `data_dir`
pub fn dispatch(command: Commands, data_dir: &Path, json: bool) -> CmdResult {
    tracing::debug!(data_dir = %data_dir.display(), "cli command");
    match command {
        Commands::Init(args) => cmd_init(args, data_dir),

        // Read commands
        Commands::List(args) => cmd_list(args, data_dir, json),
        Commands::Stats => cmd_stats(data_dir, json),
        Commands::Catalogue => cmd_commands(json),

        // Write commands
        Commands::Add(args) => cmd_add(args, data_dir),
        Commands::Start(args) => cmd_status(args, data_dir, TodoStatus::Doing),
        Commands::Done(args) => cmd_status(args, data_dir, TodoStatus::Done),
        Commands::Reset(args) => cmd_status(args, data_dir, TodoStatus::Todo),
        Commands::Delete(args) => cmd_delete(args, data_dir),
        Commands::Note(args) => cmd_note(args, data_dir),
        Commands::Tag(args) => cmd_tag(args, data_dir),
        Commands::ClearDone => cmd_clear_done(data_dir, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_repo(data_dir: &Path) -> Result<(FileStore, TodoRepository), Box<dyn std::error::Error>> {
    let store = FileStore::new(data_dir);
    let todos = store::load_todos(&store)?;
    Ok((store, TodoRepository::from_todos(todos)))
}

fn save_repo(store: &mut FileStore, repo: &TodoRepository) -> CmdResult {
    store::save_todos(store, repo.todos())?;
    Ok(())
}

/// Resolve a `<TODO>` argument: an exact id wins, otherwise a 1-based
/// position in the list.
fn resolve_todo(repo: &TodoRepository, arg: &str) -> Result<String, String> {
    if repo.get(arg).is_some() {
        return Ok(arg.to_string());
    }
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| repo.todo_by_index(i))
        .map(|todo| todo.id.clone())
        .ok_or_else(|| format!("todo not found: {}", arg))
}

fn status_word(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Todo => "todo",
        TodoStatus::Doing => "doing",
        TodoStatus::Done => "done",
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, data_dir: &Path, json: bool) -> CmdResult {
    let (_, repo) = load_repo(data_dir)?;
    let status_filter = args
        .status
        .as_deref()
        .map(|s| TodoStatus::parse_status(s).ok_or_else(|| format!("unknown status: {}", s)))
        .transpose()?;
    let tag_filter = args.tag.as_deref().map(|t| t.trim_start_matches('#'));

    // Indexes stay the todo's position in the full list
    let todos: Vec<(usize, &Todo)> = repo
        .todos()
        .iter()
        .enumerate()
        .map(|(i, t)| (i + 1, t))
        .filter(|(_, t)| status_filter.is_none_or(|s| t.status == s))
        .filter(|(_, t)| tag_filter.is_none_or(|tag| t.tags.iter().any(|x| x == tag)))
        .collect();

    if json {
        let list: Vec<TodoJson> = todos.iter().map(|(i, t)| todo_to_json(t, *i)).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    if todos.is_empty() {
        println!("No todos");
        return Ok(());
    }
    for (i, todo) in todos {
        println!("{}", format_todo_line(todo, i));
    }
    Ok(())
}

fn cmd_stats(data_dir: &Path, json: bool) -> CmdResult {
    let (_, repo) = load_repo(data_dir)?;
    let stats = repo.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(&stats))?);
    } else {
        for line in format_stats(&stats) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_commands(json: bool) -> CmdResult {
    let commands = command_actions::builtin_commands();
    if json {
        let list: Vec<CommandJson> = commands.iter().map(command_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for command in &commands {
            println!("{}", format_command_line(command));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, data_dir: &Path) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let parsed = parse_new_todo(&args.text.join(" "));
    if parsed.content.is_empty() {
        return Err("nothing to add".into());
    }
    let id = repo.add(&parsed.content, parsed.priority, parsed.tags);
    save_repo(&mut store, &repo)?;
    tracing::info!(id = %id, "todo added");
    println!("{}", id);
    Ok(())
}

fn cmd_status(args: TodoArg, data_dir: &Path, status: TodoStatus) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let id = resolve_todo(&repo, &args.todo)?;
    repo.set_status(&id, status);
    save_repo(&mut store, &repo)?;
    println!("{} {}", id, status_word(status));
    Ok(())
}

fn cmd_delete(args: TodoArg, data_dir: &Path) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let id = resolve_todo(&repo, &args.todo)?;
    repo.delete(&id);
    save_repo(&mut store, &repo)?;
    println!("deleted {}", id);
    Ok(())
}

fn cmd_note(args: NoteArgs, data_dir: &Path) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let id = resolve_todo(&repo, &args.todo)?;
    let text = args.text.join(" ");
    let text = text.trim();
    if text.is_empty() {
        return Err("note text is empty".into());
    }
    let note_id = repo
        .add_note(&id, text)
        .ok_or_else(|| format!("todo not found: {}", id))?;
    save_repo(&mut store, &repo)?;
    println!("{}", note_id);
    Ok(())
}

fn cmd_tag(args: TagArgs, data_dir: &Path) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let id = resolve_todo(&repo, &args.todo)?;
    let tag = args.tag.trim_start_matches('#');
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return Err(format!("invalid tag: '{}'", args.tag).into());
    }

    let has_tag = repo.get(&id).is_some_and(|t| t.tags.iter().any(|x| x == tag));
    if args.remove {
        if !has_tag {
            return Err(format!("{} has no tag #{}", id, tag).into());
        }
        repo.remove_tag(&id, tag);
    } else if !repo.add_tag(&id, tag) {
        println!("{} already tagged #{}", id, tag);
        return Ok(());
    }

    save_repo(&mut store, &repo)?;
    let action = if args.remove { "rm" } else { "add" };
    println!("{} tag {} {}", id, action, tag);
    Ok(())
}

fn cmd_clear_done(data_dir: &Path, json: bool) -> CmdResult {
    let (mut store, mut repo) = load_repo(data_dir)?;
    let removed = repo.clear_done();
    if !removed.is_empty() {
        save_repo(&mut store, &repo)?;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&ClearedJson { removed })?);
    } else if removed.is_empty() {
        println!("Nothing to clear");
    } else {
        println!(
            "Cleared {} done todo{}",
            removed.len(),
            if removed.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::Priority;

    #[test]
    fn resolve_prefers_ids_then_positions() {
        let mut repo = TodoRepository::new();
        let a = repo.add("a", Priority::Default, vec![]);
        let b = repo.add("b", Priority::Default, vec![]);
        assert_eq!(resolve_todo(&repo, &b), Ok(b.clone()));
        assert_eq!(resolve_todo(&repo, "1"), Ok(a));
        assert_eq!(resolve_todo(&repo, "2"), Ok(b));
        assert!(resolve_todo(&repo, "0").is_err());
        assert!(resolve_todo(&repo, "3").is_err());
        assert!(resolve_todo(&repo, "nope").is_err());
    }
}
