// LogTrail - core/extract/line.rs
//
// Line-oriented extraction for plain-text exports such as
// "Level<TAB>Date<TAB>Source<TAB>Event ID<TAB>Message".
//
// The first line is a header and is skipped. A line opens a new event only
// when it starts with a level word followed by a field delimiter AND carries
// a resolvable date. Every other non-blank line is a continuation of the
// open event (or is dropped while no event is open).

use super::{cap_message, Extractor, ParseConfig};
use crate::core::model::{FormatHint, LogEvent};
use crate::core::{event_id, level, timestamp};
use crate::util::error::IngestError;
use regex::Regex;
use std::sync::OnceLock;

/// Level word followed by a tab, comma or semicolon at the start of a line.
fn level_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(Información|Information|Advertencia|Warning|Error|Crítico|Critical|Detallado|Detailed)[\t,;]",
        )
        .expect("line: invalid regex")
    })
}

/// Plain-text strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineExtractor;

/// An event still collecting continuation lines.
struct OpenEvent {
    event: LogEvent,
    truncated: bool,
}

impl OpenEvent {
    fn finish(mut self) -> LogEvent {
        let trimmed = self.event.message.trim();
        if trimmed.len() != self.event.message.len() {
            self.event.message = trimmed.to_string();
        }
        self.event
    }
}

impl Extractor for LineExtractor {
    fn format(&self) -> FormatHint {
        FormatHint::LineOriented
    }

    fn extract(
        &self,
        content: &str,
        source: &str,
        config: &ParseConfig,
    ) -> Result<Vec<LogEvent>, IngestError> {
        let mut events = Vec::new();
        let mut open: Option<OpenEvent> = None;
        let mut dropped_lines = 0usize;

        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let level_word = level_prefix()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            let date = level_word.and_then(|_| timestamp::find_date(line));

            match (level_word, date) {
                (Some(word), Some(date)) => {
                    if let Some(done) = open.take() {
                        events.push(done.finish());
                    }
                    let mut message = line[date.end..]
                        .trim_start_matches(|c: char| c == ',' || c == ';')
                        .trim()
                        .to_string();
                    let truncated = cap_message(&mut message, config.max_entry_size);
                    open = Some(OpenEvent {
                        event: LogEvent {
                            timestamp: Some(date.timestamp),
                            message,
                            source: source.to_string(),
                            level: level::classify(word),
                            event_id: event_id::extract(line),
                        },
                        truncated,
                    });
                }
                _ => match open.as_mut() {
                    Some(current) if !current.truncated => {
                        current.event.message.push('\n');
                        current.event.message.push_str(line.trim());
                        current.truncated =
                            cap_message(&mut current.event.message, config.max_entry_size);
                    }
                    Some(_) => {}
                    None => dropped_lines += 1,
                },
            }
        }

        if let Some(done) = open.take() {
            events.push(done.finish());
        }

        tracing::debug!(
            source,
            events = events.len(),
            dropped_lines,
            "Line-oriented extraction complete"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Level;
    use chrono::{TimeZone, Utc};

    fn run(content: &str) -> Vec<LogEvent> {
        LineExtractor
            .extract(content, "test.txt", &ParseConfig::default())
            .unwrap()
    }

    #[test]
    fn test_header_line_is_skipped() {
        // The first line qualifies as an event but is treated as a header.
        let events = run("Error\t2024-01-15 10:30:00\theader\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_level_and_date_start_an_event() {
        let events = run("Level\tDate\tMessage\n\
                          Error\t2024-01-15 10:30:00\tdisk failure\n\
                          Information\t15/01/2024 11:00:00\tService Control Manager\t7036\tstarted\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Some(Level::Error));
        assert_eq!(events[0].message, "disk failure");
        assert_eq!(events[0].event_id, None);
        assert_eq!(events[1].level, Some(Level::Info));
        assert_eq!(events[1].message, "Service Control Manager\t7036\tstarted");
        assert_eq!(events[1].event_id.as_deref(), Some("7036"));
        assert_eq!(
            events[1].timestamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_lines_failing_joint_test_are_continuations() {
        let content = "HEADER\n\
                       Warning\t2024-01-15 10:30:00\tlow disk space\n\
                       \x20 volume C: 3% free\n\
                       Error without delimiter 2024-01-15 10:31:00\n\
                       Error\tno date on this line\n\
                       Critical\t2024-01-15 10:32:00\tpower lost\n";
        let events = run(content);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].message,
            "low disk space\nvolume C: 3% free\nError without delimiter 2024-01-15 10:31:00\nError\tno date on this line"
        );
        assert_eq!(events[1].level, Some(Level::Critical));
        assert_eq!(events[1].message, "power lost");
    }

    #[test]
    fn test_new_event_mid_stream_after_continuations() {
        let content = "HEADER\n\
                       Detailed\t2024-01-15 10:30:00\tstep 1\n\
                       more\n\
                       Advertencia;2024-01-15 10:30:05;paso 2\n";
        let events = run(content);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Some(Level::Detailed));
        assert_eq!(events[0].message, "step 1\nmore");
        assert_eq!(events[1].level, Some(Level::Warning));
        assert_eq!(events[1].message, "paso 2");
    }

    #[test]
    fn test_orphan_lines_before_first_event_are_dropped() {
        let content = "HEADER\nstray text\n\nError\t2024-01-15 10:30:00\tx\n";
        let events = run(content);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "x");
    }

    #[test]
    fn test_crlf_line_endings() {
        let events = run("HEADER\r\nError\t2024-01-15 10:30:00\tfirst\r\ntrace\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "first\ntrace");
    }

    #[test]
    fn test_continuations_stop_after_truncation() {
        let config = ParseConfig {
            max_entry_size: 20,
            ..ParseConfig::default()
        };
        let mut content = String::from("HEADER\nError\t2024-01-15 10:30:00\tstart\n");
        for _ in 0..50 {
            content.push_str("0123456789\n");
        }
        let events = LineExtractor
            .extract(&content, "big.txt", &config)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].message.ends_with(crate::util::constants::TRUNCATION_MARKER));
        assert!(events[0].message.len() < 40);
    }

    #[test]
    fn test_empty_message_is_kept() {
        let events = run("HEADER\nError\t2024-01-15 10:30:00\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "");
    }
}
