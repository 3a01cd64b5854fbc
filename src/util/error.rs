// LogTrail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogTrail operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogTrailError {
    /// A buffer could not be turned into events.
    Ingest(IngestError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogTrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(e) => write!(f, "Ingestion error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogTrailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ingest(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Errors raised while turning one input buffer into events.
///
/// Always scoped to a single source; a batch load converts these into a
/// per-file outcome instead of aborting.
#[derive(Debug)]
pub enum IngestError {
    /// The buffer is not a well-formed document of the requested format.
    Structure {
        source_name: String,
        format: &'static str,
        reason: String,
    },

    /// The buffer is not valid UTF-8.
    InvalidEncoding {
        source_name: String,
        source: std::str::Utf8Error,
    },

    /// The buffer exceeds the configured maximum file size.
    FileTooLarge {
        source_name: String,
        size: u64,
        max_size: u64,
    },

    /// The file could not be read from disk.
    Io {
        source_name: String,
        source: io::Error,
    },

    /// The structured strategy failed and the line-oriented retry failed too.
    Fallback {
        source_name: String,
        primary: Box<IngestError>,
        fallback: Box<IngestError>,
    },
}

impl IngestError {
    /// Name of the source the error belongs to.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Structure { source_name, .. }
            | Self::InvalidEncoding { source_name, .. }
            | Self::FileTooLarge { source_name, .. }
            | Self::Io { source_name, .. }
            | Self::Fallback { source_name, .. } => source_name,
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure {
                source_name,
                format,
                reason,
            } => write!(f, "'{source_name}' is not valid {format} input: {reason}"),
            Self::InvalidEncoding {
                source_name,
                source,
            } => write!(f, "'{source_name}': invalid UTF-8 encoding: {source}"),
            Self::FileTooLarge {
                source_name,
                size,
                max_size,
            } => write!(
                f,
                "'{source_name}' is {size} bytes, exceeds maximum of {max_size} bytes"
            ),
            Self::Io {
                source_name,
                source,
            } => write!(f, "'{source_name}': I/O error: {source}"),
            Self::Fallback {
                source_name,
                primary,
                fallback,
            } => write!(
                f,
                "'{source_name}': structured parse failed ({primary}); \
                 plain-text retry failed ({fallback})"
            ),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEncoding { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Fallback { fallback, .. } => Some(fallback.as_ref()),
            _ => None,
        }
    }
}

impl From<IngestError> for LogTrailError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogTrailError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogTrailError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogTrail results.
pub type Result<T> = std::result::Result<T, LogTrailError>;
