// LogTrail - core/query.rs
//
// Query engine over the normalised event collection: source-set filter,
// command-style search, level selector, total ordering and pagination.
// Core layer: pure logic, never mutates events. Views are index lists into
// the caller's event slice.

use crate::core::model::{Level, LogEvent};
use crate::util::constants;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::OnceLock;

// =============================================================================
// Search command
// =============================================================================

/// Typed search directive parsed from the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `ID:<digits>`: identifier contains the digits.
    Id,
    /// `MSG:<text>`: case-insensitive message substring.
    Msg,
    /// `NIVEL:<word>` / `LEVEL:<word>`: exact level equality.
    Level,
}

impl CommandKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CommandKind::Id => "ID",
            CommandKind::Msg => "MSG",
            CommandKind::Level => "NIVEL",
        }
    }
}

/// A parsed search input. `kind == None` is a plain substring search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCommand {
    pub kind: Option<CommandKind>,
    pub value: String,
}

fn command_rules() -> &'static [(CommandKind, Regex)] {
    static RULES: OnceLock<Vec<(CommandKind, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (CommandKind::Id, r"(?i)^ID:\s*(\d+)"),
            (CommandKind::Msg, r"(?i)^MSG:\s*(.+)"),
            (CommandKind::Level, r"(?i)^(?:NIVEL|LEVEL):\s*(\w+)"),
        ]
        .into_iter()
        .map(|(kind, pat)| (kind, Regex::new(pat).expect("query: invalid regex")))
        .collect()
    })
}

impl SearchCommand {
    /// Parse raw search input. Input that does not start with a recognised
    /// prefix (or whose prefix is not followed by a valid value) is taken
    /// verbatim, trimmed, as a plain search.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        for (kind, re) in command_rules() {
            if let Some(value) = re.captures(trimmed).and_then(|c| c.get(1)) {
                let value = match kind {
                    CommandKind::Id => value.as_str().to_string(),
                    CommandKind::Msg => value.as_str().trim().to_string(),
                    CommandKind::Level => value.as_str().to_lowercase(),
                };
                return Self {
                    kind: Some(*kind),
                    value,
                };
            }
        }
        Self {
            kind: None,
            value: trimmed.to_string(),
        }
    }

    /// An empty command filters nothing.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Description for the export document: `ID:7036`, the plain text, or
    /// the `none` sentinel.
    pub fn describe(&self) -> String {
        match self.kind {
            Some(kind) => format!("{}:{}", kind.prefix(), self.value),
            None if self.value.is_empty() => constants::NONE_SENTINEL.to_string(),
            None => self.value.clone(),
        }
    }

    fn matches(&self, event: &LogEvent) -> bool {
        if self.is_empty() {
            return true;
        }
        match self.kind {
            Some(CommandKind::Id) => event
                .event_id
                .as_deref()
                .is_some_and(|id| id.contains(self.value.as_str())),
            Some(CommandKind::Level) => match Level::from_alias(&self.value) {
                Some(target) => event.level == Some(target),
                None => false,
            },
            Some(CommandKind::Msg) | None => event
                .message
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
        }
    }
}

// =============================================================================
// Level selector
// =============================================================================

/// Discrete level filter, independent of the search command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelSelector {
    #[default]
    All,
    Critical,
    Error,
    Warning,
    Info,
    /// Detailed events and events with no level at all.
    Detailed,
}

impl LevelSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelSelector::All => constants::ALL_SENTINEL,
            LevelSelector::Critical => "critical",
            LevelSelector::Error => "error",
            LevelSelector::Warning => "warning",
            LevelSelector::Info => "info",
            LevelSelector::Detailed => "detailed",
        }
    }

    pub fn matches(&self, level: Option<Level>) -> bool {
        match self {
            LevelSelector::All => true,
            LevelSelector::Critical => level == Some(Level::Critical),
            LevelSelector::Error => level == Some(Level::Error),
            LevelSelector::Warning => level == Some(Level::Warning),
            LevelSelector::Info => level == Some(Level::Info),
            LevelSelector::Detailed => matches!(level, Some(Level::Detailed) | None),
        }
    }
}

impl FromStr for LevelSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "tod" | "todos" => Ok(LevelSelector::All),
            "critical" | "cri" => Ok(LevelSelector::Critical),
            "error" | "err" => Ok(LevelSelector::Error),
            "warning" | "adv" => Ok(LevelSelector::Warning),
            "info" | "inf" => Ok(LevelSelector::Info),
            "detailed" | "det" => Ok(LevelSelector::Detailed),
            other => Err(format!(
                "unknown level '{other}'; expected all, critical, error, warning, info or detailed"
            )),
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Date ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'; expected asc or desc")),
        }
    }
}

/// Identifier ordering. When active it fully replaces date ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdSort {
    #[default]
    Off,
    Asc,
    Desc,
}

impl IdSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSort::Off => constants::NONE_SENTINEL,
            IdSort::Asc => "asc",
            IdSort::Desc => "desc",
        }
    }
}

impl FromStr for IdSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "off" => Ok(IdSort::Off),
            "asc" => Ok(IdSort::Asc),
            "desc" => Ok(IdSort::Desc),
            other => Err(format!(
                "unknown id sort '{other}'; expected none, asc or desc"
            )),
        }
    }
}

/// Compare two optional keys: present values in `descending` or ascending
/// order, absent values after every present value.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// File registry
// =============================================================================

/// Ordered, duplicate-free set of loaded file names plus the selected subset.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    loaded: Vec<String>,
    selected: Vec<String>,
}

impl FileRegistry {
    /// Register and select `name`. Returns false when it was already loaded.
    pub fn register(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.loaded.push(name.to_string());
        self.selected.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaded.iter().any(|n| n == name)
    }

    /// Select a loaded file. Unknown names are ignored.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.contains(name) || self.is_selected(name) {
            return false;
        }
        self.selected.push(name.to_string());
        true
    }

    pub fn deselect(&mut self, name: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|n| n != name);
        self.selected.len() != before
    }

    pub fn select_all(&mut self) {
        self.selected = self.loaded.clone();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    /// True when every loaded file is selected.
    pub fn all_selected(&self) -> bool {
        self.loaded.iter().all(|n| self.is_selected(n))
    }

    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
        self.selected.clear();
    }

    /// Source-set rule: with files loaded, only selected sources pass.
    fn admits(&self, source: &str) -> bool {
        self.loaded.is_empty() || self.is_selected(source)
    }
}

// =============================================================================
// Query state
// =============================================================================

/// Everything that shapes the current view.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub search: SearchCommand,
    pub level: LevelSelector,
    pub sort: SortOrder,
    pub id_sort: IdSort,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_page_size(constants::DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search: SearchCommand::default(),
            level: LevelSelector::default(),
            sort: SortOrder::default(),
            id_sort: IdSort::default(),
            page: 1,
            page_size: page_size.max(constants::MIN_PAGE_SIZE),
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Indices of the events that pass every filter, in collection order.
pub fn filter(events: &[LogEvent], registry: &FileRegistry, query: &QueryState) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            registry.admits(&e.source) && query.search.matches(e) && query.level.matches(e.level)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Stable sort of `indices` by identifier (when active) or by timestamp.
pub fn sort(indices: &mut [usize], events: &[LogEvent], sort: SortOrder, id_sort: IdSort) {
    match id_sort {
        IdSort::Off => {
            let desc = sort == SortOrder::Desc;
            indices.sort_by(|&a, &b| missing_last(events[a].timestamp, events[b].timestamp, desc));
        }
        IdSort::Asc | IdSort::Desc => {
            let desc = id_sort == IdSort::Desc;
            indices.sort_by(|&a, &b| {
                missing_last(events[a].numeric_id(), events[b].numeric_id(), desc)
            });
        }
    }
}

/// Number of pages for `total` matches; never less than one.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    total.div_ceil(size).max(1)
}

/// Clamp a requested 1-based page into `[1, total_pages]`.
pub fn clamp_page(requested: usize, total: usize, page_size: usize) -> usize {
    requested.clamp(1, total_pages(total, page_size))
}

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// Indices into the event collection for this page.
    pub indices: Vec<usize>,
    /// The page actually served, after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Number of events matching the query across all pages.
    pub total_matches: usize,
}

/// Slice page `requested` out of `ordered`, clamping out-of-range requests.
pub fn paginate(ordered: &[usize], requested: usize, page_size: usize) -> PageView {
    let size = page_size.max(1);
    let total = ordered.len();
    let page = clamp_page(requested, total, size);
    let start = ((page - 1) * size).min(total);
    let end = (start + size).min(total);
    PageView {
        indices: ordered[start..end].to_vec(),
        page,
        total_pages: total_pages(total, size),
        total_matches: total,
    }
}
