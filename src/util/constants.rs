// LogTrail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTrail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogTrail";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Temporal sanity window
// =============================================================================

/// Resolved years must be strictly greater than this value.
///
/// Numeric fragments inside log messages (counters, sizes, ports) frequently
/// look like dates; anything outside the window is treated as noise.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1970;

/// Resolved years must be strictly less than this value.
pub const MAX_PLAUSIBLE_YEAR: i32 = 2050;

/// Digit count of a Unix epoch value expressed in seconds.
pub const EPOCH_SECONDS_DIGITS: usize = 10;

/// Digit count of a Unix epoch value expressed in milliseconds.
pub const EPOCH_MILLIS_DIGITS: usize = 13;

// =============================================================================
// Parsing limits
// =============================================================================

/// Maximum size of a single event message in bytes. Messages that grow past
/// this through continuation lines are truncated.
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 64 * 1024; // 64 KB

/// Minimum user-configurable entry size.
pub const MIN_MAX_ENTRY_SIZE: usize = 1024;

/// Maximum user-configurable entry size.
pub const ABSOLUTE_MAX_ENTRY_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Maximum size of one input buffer. Larger files are rejected before decoding.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 512 * 1024 * 1024; // 512 MB

/// Minimum user-configurable input buffer size.
pub const MIN_MAX_FILE_SIZE: u64 = 1024;

/// Marker appended to messages cut at `max_entry_size`.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

// =============================================================================
// Query defaults
// =============================================================================

/// Default number of events per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Minimum user-configurable page size.
pub const MIN_PAGE_SIZE: usize = 1;

/// Maximum user-configurable page size.
pub const MAX_PAGE_SIZE: usize = 10_000;

// =============================================================================
// Discovery
// =============================================================================

/// Maximum directory recursion depth when a directory is given as input.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns for directory inputs.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.txt", "*.log", "*.xml", "*.json"];

// =============================================================================
// Rendering sentinels
// =============================================================================

/// Rendered in place of an absent level.
pub const NO_LEVEL_SENTINEL: &str = "no level";

/// Rendered in place of an absent event identifier.
pub const NO_ID_SENTINEL: &str = "no id";

/// Rendered in place of an absent or unparseable timestamp.
pub const UNKNOWN_DATE_SENTINEL: &str = "Unknown date";

/// Rendered in place of an empty message (display only, never stored).
pub const EMPTY_MESSAGE_SENTINEL: &str = "(no message)";

/// Export filter description when no search/sort-id is active.
pub const NONE_SENTINEL: &str = "none";

/// Export filter description when every file or every level is included.
pub const ALL_SENTINEL: &str = "all";

/// Display format for `dateFormatted` and the CLI listing.
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y, %H:%M:%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
