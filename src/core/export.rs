// LogTrail - core/export.rs
//
// Export of the filtered, ordered event list as a JSON document or CSV.
// Core layer: builds the document from in-memory state and writes to any
// `Write` implementation; the caller owns file creation.
//
// The JSON field names are a compatibility surface for external tooling.

use crate::core::model::{format_display_date, Level, LogEvent};
use crate::core::query::{FileRegistry, QueryState};
use crate::util::constants;
use crate::util::error::ExportError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Top-level export document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: String,
    pub total_events: usize,
    pub level_counts: LevelCounts,
    pub filters: ExportFilters,
    pub source_files: Vec<String>,
    pub events: Vec<ExportEvent>,
}

/// Active filter and sort configuration at export time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    pub search_command: String,
    pub selected_files: FileSelection,
    pub level: String,
    pub sort_order: String,
    pub sort_id: String,
}

/// Either the `all` sentinel or the explicit list of selected files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileSelection {
    All(String),
    Subset(Vec<String>),
}

/// Exported events per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub detailed: usize,
    pub no_level: usize,
}

impl LevelCounts {
    fn add(&mut self, level: Option<Level>) {
        match level {
            Some(Level::Critical) => self.critical += 1,
            Some(Level::Error) => self.error += 1,
            Some(Level::Warning) => self.warning += 1,
            Some(Level::Info) => self.info += 1,
            Some(Level::Detailed) => self.detailed += 1,
            None => self.no_level += 1,
        }
    }
}

/// One exported event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEvent {
    pub date: Option<String>,
    pub date_formatted: String,
    pub message: String,
    pub source: String,
    pub level: String,
    pub event_id: String,
}

impl From<&LogEvent> for ExportEvent {
    fn from(event: &LogEvent) -> Self {
        Self {
            date: event.timestamp.map(iso_date),
            date_formatted: format_display_date(event.timestamp),
            message: event.message.clone(),
            source: event.source.clone(),
            level: level_or_sentinel(event.level).to_string(),
            event_id: event
                .event_id
                .clone()
                .unwrap_or_else(|| constants::NO_ID_SENTINEL.to_string()),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
fn iso_date(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn level_or_sentinel(level: Option<Level>) -> &'static str {
    level.map_or(constants::NO_LEVEL_SENTINEL, |l| l.as_str())
}

impl ExportDocument {
    /// Build the document for `ordered` (indices into `events`, already
    /// filtered and sorted) under the given registry and query state.
    pub fn build(
        events: &[LogEvent],
        ordered: &[usize],
        registry: &FileRegistry,
        query: &QueryState,
        exported_at: DateTime<Utc>,
    ) -> Self {
        let mut level_counts = LevelCounts::default();
        let exported: Vec<ExportEvent> = ordered
            .iter()
            .map(|&idx| {
                let event = &events[idx];
                level_counts.add(event.level);
                ExportEvent::from(event)
            })
            .collect();

        let selected_files = if registry.all_selected() {
            FileSelection::All(constants::ALL_SENTINEL.to_string())
        } else {
            FileSelection::Subset(registry.selected().to_vec())
        };

        Self {
            export_date: iso_date(exported_at),
            total_events: exported.len(),
            level_counts,
            filters: ExportFilters {
                search_command: query.search.describe(),
                selected_files,
                level: query.level.as_str().to_string(),
                sort_order: query.sort.as_str().to_string(),
                sort_id: query.id_sort.as_str().to_string(),
            },
            source_files: registry.loaded().to_vec(),
            events: exported,
        }
    }
}

/// Write the document as pretty-printed JSON. Returns the event count.
pub fn export_json<W: Write>(
    document: &ExportDocument,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, document).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    // Buffered writers only surface disk-full and similar errors on flush.
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(document.total_events)
}

/// Export events to CSV.
///
/// Writes: date, level, event_id, source, message
pub fn export_csv<W: Write>(
    events: &[LogEvent],
    ordered: &[usize],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["date", "level", "event_id", "source", "message"])
        .map_err(csv_err)?;

    let mut count = 0;
    for &idx in ordered {
        let event = &events[idx];
        let date = event.timestamp.map(iso_date).unwrap_or_default();
        csv_writer
            .write_record([
                date.as_str(),
                level_or_sentinel(event.level),
                event.event_id.as_deref().unwrap_or(constants::NO_ID_SENTINEL),
                event.source.as_str(),
                event.message.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
