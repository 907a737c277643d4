use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hs", about = concat!("[>] homeshell v", env!("CARGO_PKG_VERSION"), " - a keyboard-first todo list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $HOMESHELL_DIR or ~/.homeshell)
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a commented config.toml
    Init(InitArgs),
    /// List todos
    List(ListArgs),
    /// Add a todo (" !" marks it important, #word adds a tag)
    Add(AddArgs),
    /// Mark a todo as doing
    Start(TodoArg),
    /// Mark a todo as done
    Done(TodoArg),
    /// Put a todo back to todo
    Reset(TodoArg),
    /// Delete a todo and its notes
    Delete(TodoArg),
    /// Attach a note to a todo
    Note(NoteArgs),
    /// Add or remove a tag
    Tag(TagArgs),
    /// Show todo counts
    Stats,
    /// Remove every done todo
    ClearDone,
    /// List the interactive commands and their shortcuts
    #[command(name = "commands")]
    Catalogue,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status (todo, doing, done)
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Todo text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct TodoArg {
    /// Todo id, or its 1-based position in the list
    pub todo: String,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Todo id, or its 1-based position in the list
    pub todo: String,
    /// Note text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct TagArgs {
    /// Todo id, or its 1-based position in the list
    pub todo: String,
    /// Tag name (a leading # is ignored)
    pub tag: String,
    /// Remove the tag instead of adding it
    #[arg(long)]
    pub remove: bool,
}
