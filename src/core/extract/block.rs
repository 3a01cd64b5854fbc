// LogTrail - core/extract/block.rs
//
// Block-tagged extraction: every non-overlapping <Event ...>...</Event> span
// is one candidate record. Prologue, epilogue and anything between spans is
// ignored, so well-formedness of the surrounding document does not matter.

use super::{cap_message, Extractor, ParseConfig};
use crate::core::model::{FormatHint, LogEvent};
use crate::core::{event_id, level, timestamp};
use crate::util::error::IngestError;
use regex::Regex;
use std::sync::OnceLock;

fn event_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `\b` keeps <Events> and <EventData> from opening a span.
    RE.get_or_init(|| Regex::new(r"(?is)<Event\b[^>]*>.*?</Event>").expect("block: invalid regex"))
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("block: invalid regex"))
}

/// `<Event>` block strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockExtractor;

impl Extractor for BlockExtractor {
    fn format(&self) -> FormatHint {
        FormatHint::BlockTagged
    }

    fn extract(
        &self,
        content: &str,
        source: &str,
        config: &ParseConfig,
    ) -> Result<Vec<LogEvent>, IngestError> {
        let mut events = Vec::new();
        let mut undated = 0usize;

        for span in event_span().find_iter(content) {
            let block = span.as_str();
            let Some(date) = timestamp::find_date(block) else {
                undated += 1;
                continue;
            };

            let mut message = block_message(block, date.start, date.end);
            cap_message(&mut message, config.max_entry_size);

            // Level and identifier see the whole block, tags included, so
            // <Level>2</Level> and <EventID> count even though the message
            // has them stripped.
            events.push(LogEvent {
                timestamp: Some(date.timestamp),
                message,
                source: source.to_string(),
                level: level::classify(block),
                event_id: event_id::extract(block),
            });
        }

        tracing::debug!(
            source,
            events = events.len(),
            undated,
            "Block-tagged extraction complete"
        );
        Ok(events)
    }
}

/// Message text of a block: date removed, opening tag dropped, every other
/// tag replaced by a space, whitespace collapsed.
fn block_message(block: &str, date_start: usize, date_end: usize) -> String {
    let mut text = String::with_capacity(block.len());
    text.push_str(&block[..date_start]);
    text.push_str(&block[date_end..]);

    let body = match text.find('>') {
        Some(idx) => &text[idx + 1..],
        None => text.as_str(),
    };
    let untagged = any_tag().replace_all(body, " ");
    untagged.split_whitespace().collect::<Vec<_>>().join(" ")
}
