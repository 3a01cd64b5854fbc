// LogTrail - app/state.rs
//
// Session store: exclusive owner of the event collection, the loaded-file
// registry and the query state for one session.
//
// Every mutating operation recomputes the ordered view (filter then sort)
// before returning, so readers never see a stale or out-of-range page.

use crate::core::export::ExportDocument;
use crate::core::extract::{self, ParseConfig};
use crate::core::model::{FormatHint, LogEvent};
use crate::core::query::{
    self, FileRegistry, IdSort, LevelSelector, PageView, QueryState, SearchCommand, SortOrder,
};
use crate::util::error::IngestError;
use chrono::{DateTime, Utc};

/// Per-file result of a load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Extracted and appended this many events.
    Loaded { events: usize },
    /// Registered but produced no events.
    Empty,
    /// A file with the same name is already loaded; nothing was done.
    Duplicate,
    /// Extraction failed; the file was not registered.
    Failed(IngestError),
}

/// One input to a batch load. `content` carries the read result so a file
/// that could not be read still yields a per-file outcome.
#[derive(Debug)]
pub struct SourceInput {
    pub source: String,
    pub hint: FormatHint,
    pub content: Result<Vec<u8>, IngestError>,
}

/// Outcome of one file within a batch.
#[derive(Debug)]
pub struct FileReport {
    pub source: String,
    pub outcome: LoadOutcome,
}

/// Aggregate counts for the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub files: usize,
    pub events: usize,
    pub visible: usize,
    /// Earliest timestamp among visible events.
    pub earliest: Option<DateTime<Utc>>,
    /// Latest timestamp among visible events.
    pub latest: Option<DateTime<Utc>>,
}

/// Session-scoped owner of all loaded state.
#[derive(Debug)]
pub struct SessionStore {
    events: Vec<LogEvent>,
    registry: FileRegistry,
    query: QueryState,
    parse_config: ParseConfig,
    /// Filtered and sorted indices into `events`.
    ordered: Vec<usize>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(ParseConfig::default(), crate::util::constants::DEFAULT_PAGE_SIZE)
    }
}

impl SessionStore {
    pub fn new(parse_config: ParseConfig, page_size: usize) -> Self {
        Self {
            events: Vec::new(),
            registry: FileRegistry::default(),
            query: QueryState::with_page_size(page_size),
            parse_config,
            ordered: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Extract one buffer and append its events.
    ///
    /// The new file is selected. Failures leave the store untouched.
    pub fn load_buffer(&mut self, source: &str, bytes: &[u8], hint: FormatHint) -> LoadOutcome {
        let outcome = if self.is_duplicate(source) {
            LoadOutcome::Duplicate
        } else {
            self.ingest_one(source, bytes, hint)
        };
        self.refresh();
        outcome
    }

    /// Load a batch strictly in order: each input is fully extracted before
    /// the next one is pulled from the iterator. A failure in one file never
    /// stops the rest. The search command and page are reset first.
    pub fn load_batch<I>(&mut self, inputs: I) -> Vec<FileReport>
    where
        I: IntoIterator<Item = SourceInput>,
    {
        self.query.search = SearchCommand::default();
        self.query.page = 1;

        let mut reports = Vec::new();
        for input in inputs {
            let outcome = if self.is_duplicate(&input.source) {
                LoadOutcome::Duplicate
            } else {
                match input.content {
                    Ok(bytes) => self.ingest_one(&input.source, &bytes, input.hint),
                    Err(e) => {
                        tracing::error!(source = %input.source, error = %e, "File could not be read");
                        LoadOutcome::Failed(e)
                    }
                }
            };
            reports.push(FileReport {
                source: input.source,
                outcome,
            });
        }

        self.refresh();
        tracing::info!(
            files = reports.len(),
            events = self.events.len(),
            "Batch load complete"
        );
        reports
    }

    fn is_duplicate(&self, source: &str) -> bool {
        let duplicate = self.registry.contains(source);
        if duplicate {
            tracing::warn!(source, "File already loaded; skipping");
        }
        duplicate
    }

    fn ingest_one(&mut self, source: &str, bytes: &[u8], hint: FormatHint) -> LoadOutcome {
        match extract::ingest(bytes, hint, source, &self.parse_config) {
            Ok(events) => {
                let count = events.len();
                self.registry.register(source);
                self.events.extend(events);
                if count == 0 {
                    tracing::warn!(source, "No events with a valid date found");
                    LoadOutcome::Empty
                } else {
                    tracing::info!(source, events = count, format = %hint, "File loaded");
                    LoadOutcome::Loaded { events: count }
                }
            }
            Err(e) => {
                tracing::error!(source, error = %e, "File could not be loaded");
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Drop every event, file and filter.
    pub fn clear(&mut self) {
        let page_size = self.query.page_size;
        self.events.clear();
        self.registry.clear();
        self.query = QueryState::with_page_size(page_size);
        self.ordered.clear();
        tracing::info!("Session cleared");
    }

    // -------------------------------------------------------------------------
    // Query state
    // -------------------------------------------------------------------------

    pub fn set_search(&mut self, input: &str) {
        self.query.search = SearchCommand::parse(input);
        tracing::debug!(
            command = ?self.query.search.kind,
            value = crate::util::logging::preview(&self.query.search.value),
            "Search updated"
        );
        self.reset_page_and_refresh();
    }

    pub fn set_level(&mut self, level: LevelSelector) {
        self.query.level = level;
        self.reset_page_and_refresh();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
        self.reset_page_and_refresh();
    }

    pub fn set_id_sort(&mut self, id_sort: IdSort) {
        self.query.id_sort = id_sort;
        self.reset_page_and_refresh();
    }

    /// Move to a 1-based page, clamped into range. Returns the page served.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.query.page = query::clamp_page(page, self.ordered.len(), self.query.page_size);
        self.query.page
    }

    pub fn select_file(&mut self, name: &str) -> bool {
        let changed = self.registry.select(name);
        self.reset_page_and_refresh();
        changed
    }

    pub fn deselect_file(&mut self, name: &str) -> bool {
        let changed = self.registry.deselect(name);
        self.reset_page_and_refresh();
        changed
    }

    pub fn select_all_files(&mut self) {
        self.registry.select_all();
        self.reset_page_and_refresh();
    }

    pub fn deselect_all_files(&mut self) {
        self.registry.deselect_all();
        self.reset_page_and_refresh();
    }

    fn reset_page_and_refresh(&mut self) {
        self.query.page = 1;
        self.refresh();
    }

    /// Recompute the ordered view and keep the page in range.
    fn refresh(&mut self) {
        let mut ordered = query::filter(&self.events, &self.registry, &self.query);
        query::sort(&mut ordered, &self.events, self.query.sort, self.query.id_sort);
        self.ordered = ordered;
        self.query.page = query::clamp_page(self.query.page, self.ordered.len(), self.query.page_size);
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Every visible event, in display order.
    pub fn filtered(&self) -> impl Iterator<Item = &LogEvent> + '_ {
        self.ordered.iter().map(|&idx| &self.events[idx])
    }

    /// The current page of the ordered view.
    pub fn current_page(&self) -> PageView {
        query::paginate(&self.ordered, self.query.page, self.query.page_size)
    }

    /// Events per loaded file, in registry order.
    pub fn file_counts(&self) -> Vec<(&str, usize)> {
        self.registry
            .loaded()
            .iter()
            .map(|name| {
                let count = self.events.iter().filter(|e| &e.source == name).count();
                (name.as_str(), count)
            })
            .collect()
    }

    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats {
            files: self.registry.loaded().len(),
            events: self.events.len(),
            visible: self.ordered.len(),
            earliest: None,
            latest: None,
        };
        for ts in self.filtered().filter_map(|e| e.timestamp) {
            stats.earliest = Some(stats.earliest.map_or(ts, |cur| cur.min(ts)));
            stats.latest = Some(stats.latest.map_or(ts, |cur| cur.max(ts)));
        }
        stats
    }

    /// Export document for the full ordered view (not just the current page).
    pub fn export_document(&self, exported_at: DateTime<Utc>) -> ExportDocument {
        ExportDocument::build(
            &self.events,
            &self.ordered,
            &self.registry,
            &self.query,
            exported_at,
        )
    }

    /// Ordered indices backing the current view.
    pub fn ordered_indices(&self) -> &[usize] {
        &self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Level;

    const LINES_A: &[u8] = b"HEADER\n\
        Error\t2024-01-15 10:30:00\tdisk failure\n\
        Information\t2024-01-15 09:00:00\tService Control Manager\t7036\tstarted\n\
        Warning\t2024-01-15 11:00:00\tlow memory\n";

    const JSON_B: &[u8] = br#"[
        {"time": "2024-01-15 08:00:00", "message": "boot", "eventId": 12},
        {"time": "2024-01-15 12:00:00", "message": "Critical: overheating"}
    ]"#;

    fn loaded_store() -> SessionStore {
        let mut store = SessionStore::default();
        let reports = store.load_batch(vec![
            SourceInput {
                source: "a.log".to_string(),
                hint: FormatHint::LineOriented,
                content: Ok(LINES_A.to_vec()),
            },
            SourceInput {
                source: "b.json".to_string(),
                hint: FormatHint::Hierarchical,
                content: Ok(JSON_B.to_vec()),
            },
        ]);
        assert!(reports
            .iter()
            .all(|r| matches!(r.outcome, LoadOutcome::Loaded { .. })));
        store
    }

    fn messages(store: &SessionStore) -> Vec<&str> {
        store.filtered().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_batch_load_orders_by_date_ascending() {
        let store = loaded_store();
        assert_eq!(
            messages(&store),
            vec![
                "boot",
                "Service Control Manager\t7036\tstarted",
                "disk failure",
                "low memory",
                "Critical: overheating"
            ]
        );
        let stats = store.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.events, 5);
        assert_eq!(stats.visible, 5);
        assert_eq!(
            stats.earliest.map(|t| t.to_rfc3339()),
            Some("2024-01-15T08:00:00+00:00".to_string())
        );
        assert_eq!(
            stats.latest.map(|t| t.to_rfc3339()),
            Some("2024-01-15T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_failures_are_per_file() {
        let mut store = SessionStore::default();
        let reports = store.load_batch(vec![
            SourceInput {
                source: "bad.log".to_string(),
                hint: FormatHint::LineOriented,
                content: Ok(b"HEADER\n\xFF\xFF".to_vec()),
            },
            SourceInput {
                source: "gone.log".to_string(),
                hint: FormatHint::LineOriented,
                content: Err(IngestError::Io {
                    source_name: "gone.log".to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            },
            SourceInput {
                source: "a.log".to_string(),
                hint: FormatHint::LineOriented,
                content: Ok(LINES_A.to_vec()),
            },
            SourceInput {
                source: "empty.log".to_string(),
                hint: FormatHint::LineOriented,
                content: Ok(b"HEADER\nnothing here\n".to_vec()),
            },
        ]);
        assert!(matches!(reports[0].outcome, LoadOutcome::Failed(_)));
        assert!(matches!(reports[1].outcome, LoadOutcome::Failed(IngestError::Io { .. })));
        assert!(matches!(reports[2].outcome, LoadOutcome::Loaded { events: 3 }));
        assert!(matches!(reports[3].outcome, LoadOutcome::Empty));
        assert_eq!(
            store.registry().loaded(),
            &["a.log".to_string(), "empty.log".to_string()]
        );
    }

    #[test]
    fn test_duplicate_file_is_skipped() {
        let mut store = loaded_store();
        let outcome = store.load_buffer("a.log", LINES_A, FormatHint::LineOriented);
        assert!(matches!(outcome, LoadOutcome::Duplicate));
        assert_eq!(store.stats().events, 5);
    }

    #[test]
    fn test_batch_load_resets_search_and_page() {
        let mut store = loaded_store();
        store.set_search("disk");
        assert_eq!(store.stats().visible, 1);

        store.load_batch(vec![SourceInput {
            source: "c.log".to_string(),
            hint: FormatHint::LineOriented,
            content: Ok(b"HEADER\nError\t2024-01-16 10:00:00\tlater\n".to_vec()),
        }]);
        assert!(store.query().search.is_empty());
        assert_eq!(store.stats().visible, 6);
    }

    #[test]
    fn test_filters_and_sort_modes() {
        let mut store = loaded_store();

        store.set_level(LevelSelector::Critical);
        assert_eq!(messages(&store), vec!["Critical: overheating"]);

        store.set_level(LevelSelector::All);
        store.set_search("NIVEL:error");
        assert_eq!(messages(&store), vec!["disk failure"]);

        store.set_search("");
        store.set_id_sort(IdSort::Asc);
        let ids: Vec<Option<&str>> = store.filtered().map(|e| e.event_id.as_deref()).collect();
        assert_eq!(&ids[..2], &[Some("12"), Some("7036")]);
        assert!(ids[2..].iter().all(Option::is_none));

        store.set_id_sort(IdSort::Off);
        store.set_sort(SortOrder::Desc);
        assert_eq!(messages(&store)[0], "Critical: overheating");
    }

    #[test]
    fn test_file_selection() {
        let mut store = loaded_store();
        store.deselect_all_files();
        assert_eq!(store.stats().visible, 0);
        assert!(store.current_page().indices.is_empty());

        assert!(store.select_file("b.json"));
        assert_eq!(messages(&store), vec!["boot", "Critical: overheating"]);

        assert!(store.deselect_file("b.json"));
        store.select_all_files();
        assert_eq!(store.stats().visible, 5);
        assert_eq!(store.file_counts(), vec![("a.log", 3), ("b.json", 2)]);
    }

    #[test]
    fn test_paging_clamps_and_resets() {
        let mut store = SessionStore::new(ParseConfig::default(), 2);
        store.load_buffer("a.log", LINES_A, FormatHint::LineOriented);
        store.load_buffer("b.json", JSON_B, FormatHint::Hierarchical);

        assert_eq!(store.go_to_page(99), 3);
        let page = store.current_page();
        assert_eq!(page.page, 3);
        assert_eq!(page.indices.len(), 1);

        store.set_sort(SortOrder::Desc);
        assert_eq!(store.query().page, 1);
        assert_eq!(store.go_to_page(0), 1);
    }

    #[test]
    fn test_export_covers_all_pages() {
        let mut store = SessionStore::new(ParseConfig::default(), 2);
        store.load_buffer("a.log", LINES_A, FormatHint::LineOriented);
        store.set_level(LevelSelector::Info);
        let doc = store.export_document(Utc::now());
        assert_eq!(doc.total_events, 1);
        assert_eq!(doc.events[0].level, Level::Info.as_str());
        assert_eq!(doc.events[0].event_id, "7036");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = loaded_store();
        store.set_search("boot");
        store.set_id_sort(IdSort::Desc);
        store.clear();
        assert_eq!(store.stats(), SessionStats::default());
        assert!(store.registry().is_empty());
        assert!(store.query().search.is_empty());
        assert_eq!(store.query().id_sort, IdSort::Off);
        assert_eq!(store.query().page_size, crate::util::constants::DEFAULT_PAGE_SIZE);
    }
}
