// LogTrail - core/event_id.rs
//
// Heuristic recovery of a numeric event identifier from message text.
//
// Rules are tried in a fixed order and the first hit wins. No validation
// beyond the digit-count bounds is done, so a date fragment or a counter can
// occasionally be picked up; that noise is accepted.

use regex::Regex;
use std::sync::OnceLock;

fn rules() -> &'static [Regex] {
    static RULES: OnceLock<Vec<Regex>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // Component name followed by its event number, as in Windows
            // text exports: "Service Control Manager\t7036".
            r"(?i)\b[\w.\-]*(?:service|manager|provider|component|agent|daemon)[\w.\-]*\s*[:\-]?\s+(\d{3,5})\b",
            // Explicit label: "Event ID: 4624", "EventID=1001", "ID 42".
            r"(?i)\b(?:event\s*id|id)\s*[:#=]?\s*(\d+)\b",
            // Tag-embedded: <EventID Qualifiers="16384">7036</EventID>
            r"(?i)<EventID\b[^>]*>\s*(\d+)\s*</EventID>",
            // Last resort: a bare 3-5 digit token between whitespace.
            r"\s(\d{3,5})\s",
        ]
        .iter()
        .map(|pat| Regex::new(pat).expect("event_id: invalid regex"))
        .collect()
    })
}

/// Extract the first identifier matched by the rule cascade.
pub fn extract(text: &str) -> Option<String> {
    rules().iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}
