// LogTrail - core/discovery.rs
//
// Expansion of command-line inputs into an ordered list of files to load.
//
// Files named explicitly are passed through untouched (even when they do not
// match the include patterns). Directories are walked with `walkdir` up to a
// bounded depth and their files filtered by filename glob. Only metadata is
// read here; file contents are owned by the app layer.
//
// Per-entry I/O errors are non-fatal and collected as warnings.

use crate::util::constants;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// Configuration for directory expansion.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth (clamped to `ABSOLUTE_MAX_DEPTH`).
    pub max_depth: usize,

    /// Filename glob patterns a file found under a directory MUST match.
    /// An empty list includes every file.
    pub include_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Result of expanding a set of inputs.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    /// Files to load, in load order.
    pub files: Vec<PathBuf>,
    /// Human-readable warnings for entries that could not be visited.
    pub warnings: Vec<String>,
}

/// Expand `inputs` into files.
///
/// Inputs keep their given order; the files found under one directory are
/// sorted by path so repeated runs load them identically.
pub fn expand_inputs(inputs: &[PathBuf], config: &DiscoveryConfig) -> Discovered {
    let include = compile_patterns(&config.include_patterns);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);
    let mut out = Discovered::default();

    for input in inputs {
        if input.is_dir() {
            let before = out.files.len();
            walk_directory(input, max_depth, &include, &mut out);
            tracing::debug!(
                root = %input.display(),
                max_depth,
                found = out.files.len() - before,
                "Directory expanded"
            );
        } else {
            out.files.push(input.clone());
        }
    }

    tracing::debug!(
        files = out.files.len(),
        warnings = out.warnings.len(),
        "Discovery complete"
    );
    out
}

fn walk_directory(root: &Path, max_depth: usize, include: &[Pattern], out: &mut Discovered) {
    let mut found = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                out.warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            out.warnings
                .push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
            continue;
        };

        if !is_included(file_name, include) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        found.push(path.to_path_buf());
    }

    found.sort();
    out.files.extend(found);
}

/// Compile glob strings, logging and skipping any that fail.
fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Case-insensitive filename match; an empty pattern list includes all.
fn is_included(file_name: &str, include: &[Pattern]) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    include.is_empty() || include.iter().any(|p| p.matches_with(file_name, options))
}
