// LogTrail - platform/config.rs
//
// Platform config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogTrail configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtrail/ or %APPDATA%\LogTrail\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file works with an
/// older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub query: QuerySection,
    pub parsing: ParsingSection,
    pub discovery: DiscoverySection,
    pub logging: LoggingSection,
}

/// `[query]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct QuerySection {
    /// Events per page.
    pub page_size: Option<usize>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Maximum single message size in bytes.
    pub max_entry_size_bytes: Option<usize>,
    /// Files above this size are rejected.
    pub max_file_size_bytes: Option<u64>,
    /// Read 10/13-digit numbers in JSON date fields as Unix epochs.
    pub epoch_timestamps: Option<bool>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub page_size: usize,
    pub max_entry_size: usize,
    pub max_file_size: u64,
    pub epoch_timestamps: bool,
    pub max_depth: usize,
    pub include_patterns: Vec<String>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: constants::DEFAULT_PAGE_SIZE,
            max_entry_size: constants::DEFAULT_MAX_ENTRY_SIZE,
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
            epoch_timestamps: true,
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            log_level: None,
        }
    }
}

/// Read and deserialise config.toml. `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> Result<Option<RawConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source: e,
        })
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Validate every field against the named constants, accumulating all
/// problems rather than stopping at the first.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut problems = Vec::new();

    if let Some(size) = raw.query.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            problems.push(out_of_range(
                "query.page_size",
                size,
                format!("{}-{}", constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE),
            ));
        }
    }

    if let Some(size) = raw.parsing.max_entry_size_bytes {
        if (constants::MIN_MAX_ENTRY_SIZE..=constants::ABSOLUTE_MAX_ENTRY_SIZE).contains(&size) {
            config.max_entry_size = size;
        } else {
            problems.push(out_of_range(
                "parsing.max_entry_size_bytes",
                size,
                format!(
                    "{}-{}",
                    constants::MIN_MAX_ENTRY_SIZE,
                    constants::ABSOLUTE_MAX_ENTRY_SIZE
                ),
            ));
        }
    }

    if let Some(size) = raw.parsing.max_file_size_bytes {
        if size >= constants::MIN_MAX_FILE_SIZE {
            config.max_file_size = size;
        } else {
            problems.push(out_of_range(
                "parsing.max_file_size_bytes",
                size,
                format!("at least {}", constants::MIN_MAX_FILE_SIZE),
            ));
        }
    }

    if let Some(epoch) = raw.parsing.epoch_timestamps {
        config.epoch_timestamps = epoch;
    }

    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            problems.push(out_of_range(
                "discovery.max_depth",
                depth,
                format!("1-{}", constants::ABSOLUTE_MAX_DEPTH),
            ));
        }
    }

    if let Some(patterns) = raw.discovery.include_patterns {
        match patterns.iter().find(|p| glob::Pattern::new(p).is_err()) {
            Some(bad) => problems.push(out_of_range(
                "discovery.include_patterns",
                bad,
                "valid glob patterns such as \"*.log\"".to_string(),
            )),
            None => config.include_patterns = patterns,
        }
    }

    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            problems.push(out_of_range(
                "logging.level",
                level,
                valid.join(", "),
            ));
        }
    }

    (config, problems)
}

/// Load and validate config.toml at `path`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings (first run); an unreadable or
/// unparseable file yields defaults with one warning.
pub fn load_config(path: &Path) -> (AppConfig, Vec<String>) {
    let raw = match read_config(path) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
            return (AppConfig::default(), Vec::new());
        }
        Err(e) => return (AppConfig::default(), vec![format!("{e}. Using defaults.")]),
    };

    let (config, problems) = validate(raw);
    let warnings: Vec<String> = problems
        .iter()
        .map(|p| format!("{p}. Using default."))
        .collect();

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> RawConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert!(config.epoch_timestamps);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, problems) = validate(parse(
            r#"
            [query]
            page_size = 25

            [parsing]
            max_entry_size_bytes = 2048
            epoch_timestamps = false

            [discovery]
            max_depth = 2
            include_patterns = ["*.evt.txt"]

            [logging]
            level = "debug"

            [future_section]
            anything = 1
            "#,
        ));
        assert!(problems.is_empty());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_entry_size, 2048);
        assert!(!config.epoch_timestamps);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.include_patterns, vec!["*.evt.txt".to_string()]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let (config, problems) = validate(parse(
            r#"
            [query]
            page_size = 0
            [discovery]
            max_depth = 500
            include_patterns = ["[unclosed"]
            [logging]
            level = "loud"
            "#,
        ));
        assert_eq!(problems.len(), 4);
        assert!(problems
            .iter()
            .all(|p| matches!(p, ConfigError::ValueOutOfRange { .. })));
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(config.include_patterns.len(), 4);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[query\npage_size = ").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
    }
}
