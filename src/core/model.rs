// LogTrail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// Log Event (normalised output of extraction)
// =============================================================================

/// A single normalised log event.
///
/// Every extraction strategy produces these regardless of the source
/// file's native structure. Events are immutable once appended to the
/// session store; the query layer only derives read-only views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    /// Resolved point in time. `None` covers both "no date present" and
    /// "date present but not convertible"; downstream treats them alike.
    pub timestamp: Option<DateTime<Utc>>,

    /// Message text. Continuation lines are joined with `\n` in the
    /// order they were read.
    pub message: String,

    /// Name of the originating file.
    pub source: String,

    /// Severity, or `None` when no classifier rule matched.
    pub level: Option<Level>,

    /// Numeric-as-text identifier recovered heuristically.
    pub event_id: Option<String>,
}

impl LogEvent {
    /// Identifier as an orderable number, used for identifier ordering.
    pub fn numeric_id(&self) -> Option<NumericId<'_>> {
        self.event_id.as_deref().and_then(NumericId::parse)
    }

    /// Message for display: an empty message renders as a sentinel.
    pub fn display_message(&self) -> &str {
        if self.message.trim().is_empty() {
            constants::EMPTY_MESSAGE_SENTINEL
        } else {
            &self.message
        }
    }

    /// Human-readable timestamp, or the unknown-date sentinel.
    pub fn formatted_date(&self) -> String {
        format_display_date(self.timestamp)
    }
}

/// A digit string compared by numeric value, with no width limit.
///
/// Leading zeros are ignored, so `"0042"` equals `"42"`; longer runs of
/// significant digits are larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericId<'a>(&'a str);

impl<'a> NumericId<'a> {
    /// `None` unless `digits` is a non-empty run of ASCII digits.
    pub fn parse(digits: &'a str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let significant = digits.trim_start_matches('0');
        Some(Self(if significant.is_empty() { "0" } else { significant }))
    }

    /// Significant digits, without leading zeros.
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Ord for NumericId<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(other.0))
    }
}

impl PartialOrd for NumericId<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Render an optional timestamp with `DISPLAY_DATE_FORMAT`.
pub fn format_display_date(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(constants::DISPLAY_DATE_FORMAT).to_string(),
        None => constants::UNKNOWN_DATE_SENTINEL.to_string(),
    }
}

// =============================================================================
// Level
// =============================================================================

/// Normalised severity levels, ordered from most to least severe.
///
/// "No level" is modelled as `Option::None`, never as a variant, so that
/// filters cannot accidentally conflate it with `Detailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Critical,
    Error,
    Warning,
    Info,
    Detailed,
}

impl Level {
    /// Canonical lowercase name, as used in the export document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Detailed => "detailed",
        }
    }

    /// Short label for compact display (e.g. listing columns).
    pub fn short_label(&self) -> &'static str {
        match self {
            Level::Critical => "CRIT",
            Level::Error => "ERR",
            Level::Warning => "WARN",
            Level::Info => "INFO",
            Level::Detailed => "DET",
        }
    }

    /// Map a bilingual level name (as typed after `NIVEL:`) to a level.
    ///
    /// Case-insensitive; accents are optional for the Spanish names.
    pub fn from_alias(alias: &str) -> Option<Level> {
        match alias.to_lowercase().as_str() {
            "critical" | "crítico" | "critico" => Some(Level::Critical),
            "error" => Some(Level::Error),
            "warning" | "advertencia" => Some(Level::Warning),
            "info" | "information" | "información" | "informacion" => Some(Level::Info),
            "detailed" | "detallado" => Some(Level::Detailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Format hint
// =============================================================================

/// Caller-supplied tag selecting the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatHint {
    /// Free text, one event per level+date line plus continuations.
    #[default]
    LineOriented,
    /// `<Event>...</Event>` blocks.
    BlockTagged,
    /// Nested objects/arrays (JSON).
    Hierarchical,
}

impl FormatHint {
    /// Derive the hint from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "json" => FormatHint::Hierarchical,
            "xml" => FormatHint::BlockTagged,
            _ => FormatHint::LineOriented,
        }
    }

    /// Derive the hint from a file name or path.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormatHint::LineOriented => "line-oriented",
            FormatHint::BlockTagged => "block-tagged",
            FormatHint::Hierarchical => "hierarchical",
        }
    }
}

impl std::fmt::Display for FormatHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FormatHint {
    type Err = String;

    /// Accepts the strategy names as well as the file extensions that map to them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line-oriented" | "line" | "text" | "txt" | "log" => Ok(FormatHint::LineOriented),
            "block-tagged" | "block" | "xml" => Ok(FormatHint::BlockTagged),
            "hierarchical" | "tree" | "json" => Ok(FormatHint::Hierarchical),
            other => Err(format!(
                "unknown format '{other}'; expected line-oriented, block-tagged or hierarchical"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: Option<&str>, message: &str) -> LogEvent {
        LogEvent {
            timestamp: None,
            message: message.to_string(),
            source: "a.log".to_string(),
            level: None,
            event_id: id.map(str::to_string),
        }
    }

    #[test]
    fn test_format_hint_from_extension() {
        assert_eq!(FormatHint::from_extension("JSON"), FormatHint::Hierarchical);
        assert_eq!(FormatHint::from_extension("xml"), FormatHint::BlockTagged);
        assert_eq!(FormatHint::from_extension("log"), FormatHint::LineOriented);
        assert_eq!(FormatHint::from_extension("evtx"), FormatHint::LineOriented);
        assert_eq!(
            FormatHint::from_path(Path::new("dir/app.json")),
            FormatHint::Hierarchical
        );
        assert_eq!(
            FormatHint::from_path(Path::new("README")),
            FormatHint::LineOriented
        );
    }

    #[test]
    fn test_format_hint_from_str() {
        assert_eq!("xml".parse::<FormatHint>(), Ok(FormatHint::BlockTagged));
        assert_eq!(
            "Hierarchical".parse::<FormatHint>(),
            Ok(FormatHint::Hierarchical)
        );
        assert!("yaml".parse::<FormatHint>().is_err());
    }

    #[test]
    fn test_level_aliases_are_bilingual() {
        assert_eq!(Level::from_alias("Advertencia"), Some(Level::Warning));
        assert_eq!(Level::from_alias("información"), Some(Level::Info));
        assert_eq!(Level::from_alias("CRITICO"), Some(Level::Critical));
        assert_eq!(Level::from_alias("detallado"), Some(Level::Detailed));
        assert_eq!(Level::from_alias("verbose"), None);
    }

    #[test]
    fn test_numeric_id_orders_by_value_beyond_u64() {
        fn id(digits: &str) -> NumericId<'_> {
            NumericId::parse(digits).unwrap()
        }
        assert!(id("900") > id("5"));
        assert!(id("1000") > id("999"));
        assert_eq!(id("0042"), id("42"));
        assert_eq!(id("000").as_str(), "0");
        // 25 digits: wider than u64, still the largest value.
        assert!(id("1234567890123456789012345") > id("18446744073709551615"));
        assert!(id("99999999999999999999999") < id("100000000000000000000000"));
    }

    #[test]
    fn test_numeric_id_and_display_helpers() {
        let e = event(Some("7036"), "x");
        assert_eq!(e.numeric_id().map(|id| id.as_str()), Some("7036"));
        assert_eq!(event(Some("abc"), "x").numeric_id(), None);
        assert_eq!(event(Some(""), "x").numeric_id(), None);
        assert_eq!(event(None, "x").numeric_id(), None);
        assert_eq!(
            event(None, "   ").display_message(),
            constants::EMPTY_MESSAGE_SENTINEL
        );
        assert_eq!(event(None, "").formatted_date(), constants::UNKNOWN_DATE_SENTINEL);

        let mut e = event(None, "x");
        e.timestamp = Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        assert_eq!(e.formatted_date(), "15 Jan 2024, 10:30:00");
    }
}
