use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::model::focus::FocusState;
use crate::ops::todo_ops::TodoRepository;
use crate::tui::app::App;

/// Maximum length of the most-recently-executed list
pub const RECENT_LIMIT: usize = 5;

pub type CommandAction = Rc<dyn Fn(&mut App)>;
pub type CommandPredicate = Rc<dyn Fn(&FocusState, &TodoRepository) -> bool>;

/// A named, conditionally available operation
#[derive(Clone)]
pub struct Command {
    pub id: String,
    pub name: String,
    pub description: String,
    pub shortcut: Option<String>,
    /// Availability gate; `None` means always available
    pub when: Option<CommandPredicate>,
    pub action: CommandAction,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("shortcut", &self.shortcut)
            .field("gated", &self.when.is_some())
            .finish()
    }
}

impl Command {
    pub fn new(id: &str, name: &str, description: &str, action: impl Fn(&mut App) + 'static) -> Self {
        Command {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            shortcut: None,
            when: None,
            action: Rc::new(action),
        }
    }

    pub fn with_shortcut(mut self, shortcut: &str) -> Self {
        self.shortcut = Some(shortcut.to_string());
        self
    }

    pub fn when(mut self, predicate: impl Fn(&FocusState, &TodoRepository) -> bool + 'static) -> Self {
        self.when = Some(Rc::new(predicate));
        self
    }

    pub fn is_available(&self, focus: &FocusState, repo: &TodoRepository) -> bool {
        self.when.as_ref().is_none_or(|when| when(focus, repo))
    }

    fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self.id.to_lowercase().contains(query)
            || transliterate(&self.name).to_lowercase().contains(query)
    }
}

/// The command catalogue plus palette state and the MRU list.
///
/// The catalogue keeps insertion order; registering an existing id replaces
/// it in place. Running a command's action needs the whole [`App`], so the
/// registry only does the bookkeeping half of execution
/// ([`CommandRegistry::mark_executed`]) and the app invokes the action.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, Command>,
    filter: String,
    selected: usize,
    open: bool,
    recent: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Catalogue
    // -----------------------------------------------------------------------

    pub fn register(&mut self, command: Command) {
        // IndexMap::insert keeps the original slot for an existing key
        self.commands.insert(command.id.clone(), command);
    }

    pub fn register_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.register(command);
        }
    }

    pub fn unregister(&mut self, id: &str) -> Option<Command> {
        self.commands.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.commands.get(id)
    }

    /// Every registered command, in catalogue order
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Commands whose gate accepts the live focus
    pub fn available<'a>(&'a self, focus: &FocusState, repo: &TodoRepository) -> Vec<&'a Command> {
        self.commands
            .values()
            .filter(|c| c.is_available(focus, repo))
            .collect()
    }

    /// What the palette lists. Empty filter: recent commands first, then the
    /// rest of the available ones. Otherwise every available command whose
    /// name, description or id contains the filter, in catalogue order.
    pub fn filtered<'a>(&'a self, focus: &FocusState, repo: &TodoRepository) -> Vec<&'a Command> {
        let available = self.available(focus, repo);
        let query = self.filter.trim().to_lowercase();
        if query.is_empty() {
            let recent = self
                .recent
                .iter()
                .filter_map(|id| available.iter().find(|c| &c.id == id).copied());
            let others = available
                .iter()
                .filter(|c| !self.recent.contains(&c.id))
                .copied();
            return recent.chain(others).collect();
        }
        available
            .into_iter()
            .filter(|c| c.matches_query(&query))
            .collect()
    }

    pub fn selected_command<'a>(&'a self, focus: &FocusState, repo: &TodoRepository) -> Option<&'a Command> {
        self.filtered(focus, repo).get(self.selected).copied()
    }

    /// Look up an available command by id
    pub fn find_by_id<'a>(&'a self, focus: &FocusState, repo: &TodoRepository, id: &str) -> Option<&'a Command> {
        self.commands
            .get(id)
            .filter(|c| c.is_available(focus, repo))
    }

    /// First available command bound to `shortcut` (case-insensitive)
    pub fn find_by_shortcut<'a>(
        &'a self,
        focus: &FocusState,
        repo: &TodoRepository,
        shortcut: &str,
    ) -> Option<&'a Command> {
        self.commands.values().find(|c| {
            c.shortcut
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(shortcut))
                && c.is_available(focus, repo)
        })
    }

    // -----------------------------------------------------------------------
    // Execution bookkeeping
    // -----------------------------------------------------------------------

    /// Record `id` as most recent, then close the palette (clearing the
    /// filter). Called before the action runs so an action that reopens the
    /// palette keeps it open.
    pub fn mark_executed(&mut self, id: &str) {
        self.push_recent(id);
        self.close();
    }

    fn push_recent(&mut self, id: &str) {
        self.recent.retain(|r| r != id);
        self.recent.insert(0, id.to_string());
        self.recent.truncate(RECENT_LIMIT);
    }

    /// Most recently executed ids, newest first
    pub fn recent_ids(&self) -> &[String] {
        &self.recent
    }

    /// Rehydrate the MRU list. Ids that don't name a command are kept and
    /// simply skipped when listing.
    pub fn set_recent_ids(&mut self, ids: Vec<String>) {
        self.recent = ids;
        self.recent.truncate(RECENT_LIMIT);
    }

    // -----------------------------------------------------------------------
    // Palette state
    // -----------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        self.filter.clear();
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.filter.clear();
        self.selected = 0;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.selected = 0;
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self, focus: &FocusState, repo: &TodoRepository) {
        let len = self.filtered(focus, repo).len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Replace each known CJK character of a command name with the initial of
/// its pinyin reading. Unknown characters pass through, so the result has
/// as many characters as the input.
pub fn transliterate(text: &str) -> String {
    text.chars().map(initial_for).collect()
}

fn initial_for(c: char) -> char {
    match c {
        '开' => 'k',
        '始' | '删' | '搜' | '索' | '示' => 's',
        '完' | '务' => 'w',
        '成' | '除' | '重' => 'c',
        '编' | '便' | '部' | '帮' => 'b',
        '辑' | '加' | '建' | '级' | '计' => 'j',
        '添' | '统' => 't',
        '签' | '切' | '清' => 'q',
        '新' | '先' | '显' => 'x',
        '任' => 'r',
        '置' | '终' | '助' => 'z',
        '换' | '回' => 'h',
        '优' | '已' | '移' => 'y',
        '端' | '动' | '顶' | '底' => 'd',
        '返' => 'f',
        other => other,
    }
}
