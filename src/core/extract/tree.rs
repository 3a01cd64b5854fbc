// LogTrail - core/extract/tree.rs
//
// Hierarchical extraction over an arbitrary JSON document.
//
// Every object node is tested independently: the first populated date field
// decides whether the node is an event. Recursion into children always
// continues afterwards, so a parent and a dated descendant both produce
// events. Nesting depth is unbounded: the parser grows its stack on demand
// and the walker keeps its own work stack, recording the deepest level only
// for diagnostics.

use super::{cap_message, Extractor, ParseConfig};
use crate::core::model::{FormatHint, LogEvent};
use crate::core::{event_id, level, timestamp};
use crate::util::error::IngestError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Date-bearing field names, in priority order.
pub const DATE_FIELDS: &[&str] = &["timestamp", "time", "date", "datetime", "created", "occurred"];

/// Message field names, in priority order.
pub const MESSAGE_FIELDS: &[&str] = &["message", "msg", "description", "text"];

/// Explicit identifier field names, consulted before the text heuristics.
pub const ID_FIELDS: &[&str] = &["eventId", "event_id", "eventID", "EventID", "EventId", "id"];

/// JSON strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeExtractor;

impl Extractor for TreeExtractor {
    fn format(&self) -> FormatHint {
        FormatHint::Hierarchical
    }

    fn extract(
        &self,
        content: &str,
        source: &str,
        config: &ParseConfig,
    ) -> Result<Vec<LogEvent>, IngestError> {
        let root = parse_document(content).map_err(|e| IngestError::Structure {
            source_name: source.to_string(),
            format: FormatHint::Hierarchical.label(),
            reason: e.to_string(),
        })?;

        let mut walker = TreeWalker {
            source,
            config,
            events: Vec::new(),
            max_depth: 0,
        };
        walker.walk(root);

        tracing::debug!(
            source,
            events = walker.events.len(),
            max_depth = walker.max_depth,
            "Hierarchical extraction complete"
        );
        Ok(walker.events)
    }
}

struct TreeWalker<'a> {
    source: &'a str,
    config: &'a ParseConfig,
    events: Vec<LogEvent>,
    max_depth: usize,
}

impl TreeWalker<'_> {
    /// Pre-order walk in document order. Children are moved onto the work
    /// stack, so each node is dropped without recursing into its subtree.
    fn walk(&mut self, root: Value) {
        let mut stack = vec![(root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            self.max_depth = self.max_depth.max(depth);
            if let Value::Object(fields) = &node {
                if let Some(event) = self.event_from(&node, fields) {
                    self.events.push(event);
                }
            }
            match node {
                Value::Array(items) => {
                    stack.extend(items.into_iter().rev().map(|child| (child, depth + 1)));
                }
                Value::Object(fields) => {
                    stack.extend(fields.into_iter().rev().map(|(_, child)| (child, depth + 1)));
                }
                _ => {}
            }
        }
    }

    fn event_from(&self, node: &Value, fields: &Map<String, Value>) -> Option<LogEvent> {
        // Only the first populated date field is consulted; if it does not
        // convert, the node is not an event even when a later field would.
        let raw_date = first_populated(fields, DATE_FIELDS)?;
        let ts = resolve_value(raw_date, self.config.epoch_timestamps)?;

        let mut message = match first_populated(fields, MESSAGE_FIELDS) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => node.to_string(),
        };
        let event_id = explicit_id(fields).or_else(|| event_id::extract(&message));
        let level = level::classify(&message);
        cap_message(&mut message, self.config.max_entry_size);

        Some(LogEvent {
            timestamp: Some(ts),
            message,
            source: self.source.to_string(),
            level,
            event_id,
        })
    }
}

/// Parse without serde_json's default nesting limit of 128.
fn parse_document(content: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(content);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Truthiness used for field selection: null, false, 0 and "" are empty.
fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn first_populated<'v>(fields: &'v Map<String, Value>, names: &[&str]) -> Option<&'v Value> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|v| is_populated(v))
}

/// Convert a date field value into a point in time.
fn resolve_value(value: &Value, epoch: bool) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => timestamp::resolve(s).or_else(|| {
            epoch
                .then(|| timestamp::resolve_epoch_digits(s))
                .flatten()
        }),
        Value::Number(n) if epoch => n
            .as_u64()
            .and_then(|v| timestamp::resolve_epoch_digits(&v.to_string())),
        _ => None,
    }
}

/// Identifier from an explicit field holding an integer or a digit string.
fn explicit_id(fields: &Map<String, Value>) -> Option<String> {
    ID_FIELDS.iter().find_map(|name| match fields.get(*name)? {
        Value::Number(n) => n.as_u64().map(|v| v.to_string()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Some(s.clone())
        }
        _ => None,
    })
}
