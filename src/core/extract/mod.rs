// LogTrail - core/extract/mod.rs
//
// Extraction strategies and the ingestion dispatcher.
// Core layer: accepts byte buffers, never touches the filesystem directly.
//
// Every strategy turns one decoded buffer into events in discovery order,
// using the shared temporal resolver, level classifier and identifier
// extractor for each candidate record.

pub mod block;
pub mod line;
pub mod tree;

use crate::core::model::{FormatHint, LogEvent};
use crate::util::constants;
use crate::util::error::IngestError;

pub use block::BlockExtractor;
pub use line::LineExtractor;
pub use tree::TreeExtractor;

/// Configuration for extraction.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Messages longer than this many bytes are truncated.
    pub max_entry_size: usize,
    /// Buffers larger than this are rejected before decoding.
    pub max_file_size: u64,
    /// Let the hierarchical strategy read 10/13-digit numbers as Unix epochs.
    pub epoch_timestamps: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_entry_size: constants::DEFAULT_MAX_ENTRY_SIZE,
            max_file_size: constants::DEFAULT_MAX_FILE_SIZE,
            epoch_timestamps: true,
        }
    }
}

/// One extraction strategy.
pub trait Extractor {
    /// The format this strategy understands.
    fn format(&self) -> FormatHint;

    /// Extract events from a decoded buffer.
    ///
    /// Records without a resolvable date are dropped silently. An `Err` means
    /// the buffer as a whole is not a document of this format.
    fn extract(
        &self,
        content: &str,
        source: &str,
        config: &ParseConfig,
    ) -> Result<Vec<LogEvent>, IngestError>;
}

/// Strategy for a format hint.
pub fn extractor_for(hint: FormatHint) -> &'static dyn Extractor {
    match hint {
        FormatHint::LineOriented => &LineExtractor,
        FormatHint::BlockTagged => &BlockExtractor,
        FormatHint::Hierarchical => &TreeExtractor,
    }
}

/// Turn a raw buffer into events using the strategy named by `hint`.
///
/// When a structured strategy rejects the buffer, the same buffer is retried
/// once as line-oriented text. A failure of that retry (or any failure when
/// the hint was already line-oriented) is returned to the caller; it concerns
/// this source only.
pub fn ingest(
    bytes: &[u8],
    hint: FormatHint,
    source: &str,
    config: &ParseConfig,
) -> Result<Vec<LogEvent>, IngestError> {
    let size = bytes.len() as u64;
    if size > config.max_file_size {
        return Err(IngestError::FileTooLarge {
            source_name: source.to_string(),
            size,
            max_size: config.max_file_size,
        });
    }

    let content = decode(bytes, source)?;

    tracing::debug!(source, format = %hint, bytes = size, "Extraction started");

    let events = match extractor_for(hint).extract(content, source, config) {
        Ok(events) => events,
        Err(primary) if hint != FormatHint::LineOriented => {
            tracing::warn!(
                source,
                format = %hint,
                error = %primary,
                "Structured parse failed; retrying as line-oriented text"
            );
            LineExtractor
                .extract(content, source, config)
                .map_err(|fallback| IngestError::Fallback {
                    source_name: source.to_string(),
                    primary: Box::new(primary),
                    fallback: Box::new(fallback),
                })?
        }
        Err(e) => return Err(e),
    };

    tracing::debug!(source, events = events.len(), "Extraction complete");
    Ok(events)
}

/// Decode a buffer as UTF-8, dropping a leading byte-order mark.
fn decode<'a>(bytes: &'a [u8], source: &str) -> Result<&'a str, IngestError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| IngestError::InvalidEncoding {
        source_name: source.to_string(),
        source: e,
    })
}

/// Cap `message` at `max` bytes (on a char boundary), marking the cut.
///
/// Returns true when the message was truncated.
pub(crate) fn cap_message(message: &mut String, max: usize) -> bool {
    if message.len() <= max {
        return false;
    }
    let mut cut = max;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message.truncate(cut);
    message.push_str(constants::TRUNCATION_MARKER);
    true
}
