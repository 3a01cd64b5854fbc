// LogTrail - core/level.rs
//
// Severity classification from free text.
//
// Two ordered passes, each short-circuiting on its first hit:
//   1. anchored rules: the severity word must open the text;
//   2. fallback rules: tag-embedded codes (<Level>2</Level>) and a generic
//      success/completion vocabulary, matched anywhere.
// An anchored hit always wins, even if a fallback rule would also match.

use crate::core::model::Level;
use regex::Regex;
use std::sync::OnceLock;

struct LevelRule {
    re: Regex,
    level: Level,
}

fn compile(rules: &[(&str, Level)]) -> Vec<LevelRule> {
    rules
        .iter()
        .map(|(pat, level)| LevelRule {
            re: Regex::new(pat).expect("level: invalid regex"),
            level: *level,
        })
        .collect()
}

fn anchored_rules() -> &'static [LevelRule] {
    static RULES: OnceLock<Vec<LevelRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile(&[
            (r"(?i)^(?:crítico|critical)\b", Level::Critical),
            (r"(?i)^error\b", Level::Error),
            (r"(?i)^(?:advertencia|warning)\b", Level::Warning),
            (r"(?i)^(?:información|information)\b", Level::Info),
            (r"(?i)^(?:detallado|detailed)\b", Level::Detailed),
        ])
    })
}

fn fallback_rules() -> &'static [LevelRule] {
    static RULES: OnceLock<Vec<LevelRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile(&[
            (r"(?i)<Level>\s*(?:1|crítico|critical)\s*</Level>", Level::Critical),
            (r"(?i)<Level>\s*(?:2|error)\s*</Level>", Level::Error),
            (r"(?i)<Level>\s*(?:3|advertencia|warning)\s*</Level>", Level::Warning),
            (r"(?i)<Level>\s*(?:4|información|information)\s*</Level>", Level::Info),
            (r"(?i)<Level>\s*(?:5|detallado|detailed)\s*</Level>", Level::Detailed),
            // Success vocabulary has no level of its own; it reads as info.
            // Only the trailing boundary is checked, so "took" counts as "ok".
            (r"(?i)(?:success|ok|complete|done)\b", Level::Info),
        ])
    })
}

/// Classify `text` into a severity level, or `None` when nothing matches.
///
/// Success/completion words ("success", "ok", "complete", "done") map to
/// [`Level::Info`], so they are found by the info selector and `NIVEL:info`.
pub fn classify(text: &str) -> Option<Level> {
    anchored_rules()
        .iter()
        .chain(fallback_rules())
        .find(|rule| rule.re.is_match(text))
        .map(|rule| rule.level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_words_in_both_languages() {
        assert_eq!(classify("Error\tdisk"), Some(Level::Error));
        assert_eq!(classify("crítico: power loss"), Some(Level::Critical));
        assert_eq!(classify("CRITICAL failure"), Some(Level::Critical));
        assert_eq!(classify("Advertencia"), Some(Level::Warning));
        assert_eq!(classify("Warning low space"), Some(Level::Warning));
        assert_eq!(classify("Información"), Some(Level::Info));
        assert_eq!(classify("Information"), Some(Level::Info));
        assert_eq!(classify("Detallado"), Some(Level::Detailed));
        assert_eq!(classify("detailed trace"), Some(Level::Detailed));
    }

    #[test]
    fn test_anchored_requires_word_at_start() {
        assert_eq!(classify("disk Error"), None);
        assert_eq!(classify("Errors everywhere"), None);
    }

    #[test]
    fn test_tag_embedded_codes() {
        assert_eq!(classify("<Event><Level>2</Level></Event>"), Some(Level::Error));
        assert_eq!(classify("<Level>1</Level>"), Some(Level::Critical));
        assert_eq!(classify("<level>Warning</level>"), Some(Level::Warning));
        assert_eq!(classify("<Level>4</Level>"), Some(Level::Info));
        assert_eq!(classify("<Level>5</Level>"), Some(Level::Detailed));
        assert_eq!(classify("<Level>0</Level>"), None);
    }

    #[test]
    fn test_anchored_match_overrides_fallback() {
        // The tag says critical, but the leading word is authoritative.
        assert_eq!(
            classify("Warning <Level>1</Level> job done"),
            Some(Level::Warning)
        );
        assert_eq!(classify("Error: backup complete"), Some(Level::Error));
    }

    #[test]
    fn test_success_vocabulary_reads_as_info() {
        assert_eq!(classify("backup completed: success"), Some(Level::Info));
        assert_eq!(classify("all done"), Some(Level::Info));
        assert_eq!(classify("rebuild took 4s"), Some(Level::Info));
        assert_eq!(classify("no completion marker"), None);
    }

    #[test]
    fn test_no_match_is_none_not_detailed() {
        assert_eq!(classify("service started"), None);
        assert_eq!(classify(""), None);
    }
}
