// LogTrail - app/loader.rs
//
// Bridges file paths to the session store: expands directories, reads each
// file from disk and feeds it to `SessionStore::load_batch`.
//
// Reading is lazy, so only one file's bytes are held at a time and each file
// is fully extracted before the next is read. Per-file read errors become
// per-file outcomes; discovery problems come back as warnings.

use crate::app::state::{FileReport, SessionStore, SourceInput};
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::model::FormatHint;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::IngestError;
use std::path::{Path, PathBuf};

/// Options for a load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Overrides the extension-derived hint for every file.
    pub format_override: Option<FormatHint>,
    pub discovery: DiscoveryConfig,
    /// Files above this size are rejected without being read.
    pub max_file_size: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format_override: None,
            discovery: DiscoveryConfig::default(),
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Result of loading a set of paths.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub reports: Vec<FileReport>,
    pub warnings: Vec<String>,
}

/// Expand `inputs` and load every resulting file into `store`.
pub fn load_paths(store: &mut SessionStore, inputs: &[PathBuf], options: &LoadOptions) -> LoadSummary {
    let discovered = discovery::expand_inputs(inputs, &options.discovery);
    for warning in &discovered.warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    tracing::info!(files = discovered.files.len(), "Loading files");

    let batch = discovered
        .files
        .iter()
        .map(|path| read_input(path, options));
    let reports = store.load_batch(batch);

    LoadSummary {
        reports,
        warnings: discovered.warnings,
    }
}

/// Read one file into a batch input, resolving its name and format hint.
pub fn read_input(path: &Path, options: &LoadOptions) -> SourceInput {
    let source = fs::source_name(path);
    let hint = options
        .format_override
        .unwrap_or_else(|| FormatHint::from_path(path));
    let content = read_limited(path, &source, options.max_file_size);
    SourceInput {
        source,
        hint,
        content,
    }
}

fn read_limited(path: &Path, source: &str, max_size: u64) -> Result<Vec<u8>, IngestError> {
    let io_err = |e: std::io::Error| IngestError::Io {
        source_name: source.to_string(),
        source: e,
    };

    let size = fs::file_size(path).map_err(io_err)?;
    if size > max_size {
        return Err(IngestError::FileTooLarge {
            source_name: source.to_string(),
            size,
            max_size,
        });
    }
    fs::read_bytes(path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::LoadOutcome;

    fn options() -> LoadOptions {
        LoadOptions::default()
    }

    #[test]
    fn test_hint_from_extension_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.xml");
        std::fs::write(&path, "<Event>2024-01-15 10:00:00 x</Event>").unwrap();

        let input = read_input(&path, &options());
        assert_eq!(input.source, "events.xml");
        assert_eq!(input.hint, FormatHint::BlockTagged);

        let forced = LoadOptions {
            format_override: Some(FormatHint::LineOriented),
            ..options()
        };
        assert_eq!(read_input(&path, &forced).hint, FormatHint::LineOriented);
    }

    #[test]
    fn test_oversized_file_rejected_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();
        let small = LoadOptions {
            max_file_size: 1024,
            ..options()
        };
        let input = read_input(&path, &small);
        assert!(matches!(
            input.content,
            Err(IngestError::FileTooLarge { size: 2048, .. })
        ));
    }

    #[test]
    fn test_missing_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.log");
        std::fs::write(&good, "HEADER\nError\t2024-01-15 10:30:00\tdisk failure\n").unwrap();

        let mut store = SessionStore::default();
        let summary = load_paths(
            &mut store,
            &[dir.path().join("missing.log"), good],
            &options(),
        );
        assert_eq!(summary.reports.len(), 2);
        assert!(matches!(
            summary.reports[0].outcome,
            LoadOutcome::Failed(IngestError::Io { .. })
        ));
        assert!(matches!(
            summary.reports[1].outcome,
            LoadOutcome::Loaded { events: 1 }
        ));
    }
}
