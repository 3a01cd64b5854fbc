// LogTrail - core/timestamp.rs
//
// Temporal resolver: finds the earliest date-shaped substring in a text span
// that converts to a plausible point in time.
//
// Each recognised shape is a (matcher, converter) pair held in an explicitly
// ordered table. All shapes are tried against the text; the match with the
// smallest starting offset wins, and on an exact offset tie the shape listed
// first wins. Naive (zone-less) values are interpreted as UTC.

use crate::util::constants::{
    EPOCH_MILLIS_DIGITS, EPOCH_SECONDS_DIGITS, MAX_PLAUSIBLE_YEAR, MIN_PLAUSIBLE_YEAR,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// A resolved date together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub timestamp: DateTime<Utc>,
    /// Byte offset of the first character of the matched substring.
    pub start: usize,
    /// Byte offset one past the last character of the matched substring.
    pub end: usize,
}

impl DateMatch {
    /// The matched substring within the text it was resolved from.
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

// =============================================================================
// Month-name tables
// =============================================================================

/// Locales whose three-letter month abbreviations are recognised.
///
/// Kept as separate tables: several abbreviations (`feb`, `mar`, `sep`, ...)
/// are shared between languages and a merged map would silently drop one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthLocale {
    English,
    Spanish,
}

impl MonthLocale {
    /// Lookup order for textual months.
    pub const ALL: [MonthLocale; 2] = [MonthLocale::English, MonthLocale::Spanish];

    fn table(&self) -> &'static [&'static str; 12] {
        match self {
            MonthLocale::English => &[
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ],
            MonthLocale::Spanish => &[
                "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
            ],
        }
    }

    /// 1-based month number for an abbreviation in this locale.
    pub fn month(&self, abbrev: &str) -> Option<u32> {
        let key = abbrev.to_lowercase();
        self.table()
            .iter()
            .position(|m| *m == key)
            .map(|idx| idx as u32 + 1)
    }
}

/// Resolve a month name (only the first three letters are significant)
/// against every locale table in order.
pub fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect();
    MonthLocale::ALL
        .iter()
        .find_map(|locale| locale.month(&prefix))
}

// =============================================================================
// Resolution
// =============================================================================

/// Whether `year` falls inside the plausible window (both bounds exclusive).
pub fn is_plausible_year(year: i32) -> bool {
    year > MIN_PLAUSIBLE_YEAR && year < MAX_PLAUSIBLE_YEAR
}

fn plausible(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    is_plausible_year(ts.year()).then_some(ts)
}

/// Find the earliest-starting convertible date in `text`.
///
/// Returns `None` when no shape both matches and converts.
pub fn find_date(text: &str) -> Option<DateMatch> {
    let mut best: Option<DateMatch> = None;

    for shape in shapes() {
        for caps in shape.re.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if best.as_ref().is_some_and(|b| whole.start() >= b.start) {
                // Later matches of this shape cannot beat the current winner.
                break;
            }
            if let Some(ts) = (shape.convert)(&caps).and_then(plausible) {
                best = Some(DateMatch {
                    timestamp: ts,
                    start: whole.start(),
                    end: whole.end(),
                });
                break;
            }
        }
    }

    if let Some(ref m) = best {
        tracing::trace!(matched = m.as_str(text), start = m.start, "Date resolved");
    }
    best
}

/// Resolve `text` to a point in time, ignoring where the date was found.
pub fn resolve(text: &str) -> Option<DateTime<Utc>> {
    find_date(text).map(|m| m.timestamp)
}

/// Interpret a string of ASCII digits as a Unix epoch value.
///
/// 10 digits are seconds, 13 digits are milliseconds; any other length is
/// rejected. The plausible-year window still applies.
pub fn resolve_epoch_digits(digits: &str) -> Option<DateTime<Utc>> {
    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    let ts = match digits.len() {
        EPOCH_SECONDS_DIGITS => Utc.timestamp_opt(value, 0).single()?,
        EPOCH_MILLIS_DIGITS => Utc.timestamp_millis_opt(value).single()?,
        _ => return None,
    };
    plausible(ts)
}

// =============================================================================
// Shape table
// =============================================================================

/// One recognised date shape: a matcher plus a converter for its captures.
struct DateShape {
    re: Regex,
    convert: fn(&Captures<'_>) -> Option<DateTime<Utc>>,
}

fn shapes() -> &'static [DateShape] {
    static SHAPES: OnceLock<Vec<DateShape>> = OnceLock::new();

    SHAPES.get_or_init(|| {
        // Patterns are exercised by the unit tests below, so a mistake shows
        // up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("timestamp: invalid regex")
        }

        vec![
            // ------------------------------------------------------------------
            // 1. Numeric D/M/YYYY HH:MM:SS (day-first, month-first fallback)
            //    15/01/2024 10:30:00    01/15/2024 10:30:00
            // ------------------------------------------------------------------
            DateShape {
                re: re(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{2}):(\d{2}):(\d{2})\b"),
                convert: convert_numeric_dmy,
            },
            // ------------------------------------------------------------------
            // 2. Extended ISO 8601, optional fraction and zone
            //    2024-01-15T10:30:00    2024-01-15 10:30:00.123Z
            //    2024-01-15T10:30:00+02:00
            // ------------------------------------------------------------------
            DateShape {
                re: re(
                    r"(\d{4}-\d{2}-\d{2})[T\s](\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?)(Z|[+-]\d{2}:\d{2})?",
                ),
                convert: convert_iso,
            },
            // ------------------------------------------------------------------
            // 3. Space-separated date-time without zone (any run of spaces)
            //    2024-01-15   10:30:00
            // ------------------------------------------------------------------
            DateShape {
                re: re(r"(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})"),
                convert: convert_naive_parts,
            },
            // ------------------------------------------------------------------
            // 4. Space-separated with millisecond fraction
            //    2024-01-15  10:30:00.250
            // ------------------------------------------------------------------
            DateShape {
                re: re(r"(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2}\.\d{3})"),
                convert: convert_naive_parts,
            },
            // ------------------------------------------------------------------
            // 5. Textual month-first
            //    Jan 15 2024 10:30:00    ene 15 2024 10:30:00
            // ------------------------------------------------------------------
            DateShape {
                re: re(r"(?i)\b([a-z]{3})\s+(\d{1,2})\s+(\d{4})\s+(\d{2}):(\d{2}):(\d{2})\b"),
                convert: |caps| textual(caps, 2, 1, 3),
            },
            // ------------------------------------------------------------------
            // 6. Textual day-first, optional dot and comma
            //    17 oct 2025, 15:03:51    3 Feb. 2024 08:00:00
            // ------------------------------------------------------------------
            DateShape {
                re: re(
                    r"(?i)\b(\d{1,2})\s+([a-z]{3,4})\.?\s+(\d{4}),?\s+(\d{2}):(\d{2}):(\d{2})\b",
                ),
                convert: |caps| textual(caps, 1, 2, 3),
            },
        ]
    })
}

fn num(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn time_at(caps: &Captures<'_>, first: usize) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(num(caps, first)?, num(caps, first + 1)?, num(caps, first + 2)?)
}

fn convert_numeric_dmy(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let first = num(caps, 1)?;
    let second = num(caps, 2)?;
    let year = i32::try_from(num(caps, 3)?).ok()?;
    if !is_plausible_year(year) {
        return None;
    }
    let time = time_at(caps, 4)?;

    // Day-first wins whenever it names a real calendar day; from_ymd_opt
    // rejects roll-over such as 31/04.
    let date = NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))?;
    Some(date.and_time(time).and_utc())
}

fn convert_iso(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let date = caps.get(1)?.as_str();
    let time = caps.get(2)?.as_str();
    match caps.get(3) {
        Some(zone) => DateTime::parse_from_rfc3339(&format!("{date}T{time}{}", zone.as_str()))
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        None => parse_naive(date, time),
    }
}

fn convert_naive_parts(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    parse_naive(caps.get(1)?.as_str(), caps.get(2)?.as_str())
}

fn parse_naive(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let s = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|ndt| ndt.and_utc())
}

/// Shared converter for textual shapes; arguments are capture indices.
fn textual(
    caps: &Captures<'_>,
    day_idx: usize,
    month_idx: usize,
    year_idx: usize,
) -> Option<DateTime<Utc>> {
    let day = num(caps, day_idx)?;
    let month = month_from_name(caps.get(month_idx)?.as_str())?;
    let year = i32::try_from(num(caps, year_idx)?).ok()?;
    if !is_plausible_year(year) {
        return None;
    }
    let time = time_at(caps, 4)?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_every_shape_round_trips_inside_window() {
        let samples = [
            ymd_hms(1971, 1, 1, 0, 0, 0),
            ymd_hms(2024, 2, 29, 23, 59, 59),
            ymd_hms(2049, 12, 31, 12, 5, 9),
        ];
        let renderings: &[&str] = &[
            "%d/%m/%Y %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%SZ",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.3f",
            "%b %d %Y %H:%M:%S",
            "%d %b %Y, %H:%M:%S",
        ];
        for ts in samples {
            for fmt in renderings {
                let text = ts.format(fmt).to_string();
                assert_eq!(resolve(&text), Some(ts), "format {fmt} -> {text}");
            }
        }
    }

    #[test]
    fn test_years_outside_window_are_rejected() {
        assert_eq!(resolve("1970-06-01 10:00:00"), None);
        assert_eq!(resolve("2050-01-01T00:00:00Z"), None);
        assert_eq!(resolve("01/02/1969 10:00:00"), None);
        assert_eq!(resolve("3 feb 2077 08:00:00"), None);
        assert!(resolve("1971-06-01 10:00:00").is_some());
    }

    #[test]
    fn test_ambiguous_numeric_date_is_day_first() {
        // Both 5 March and 3 May are valid; day-first is the fixed tie-break.
        assert_eq!(
            resolve("05/03/2024 10:00:00"),
            Some(ymd_hms(2024, 3, 5, 10, 0, 0))
        );
    }

    #[test]
    fn test_numeric_date_falls_back_to_month_first() {
        // Month 25 is impossible, so only the month-first reading is valid.
        assert_eq!(
            resolve("03/25/2024 10:00:00"),
            Some(ymd_hms(2024, 3, 25, 10, 0, 0))
        );
    }

    #[test]
    fn test_numeric_date_rejects_calendar_rollover() {
        // 31 April is not a day in either reading.
        assert_eq!(resolve("31/04/2024 10:00:00"), None);
        assert_eq!(resolve("04/31/2024 10:00:00"), None);
        assert_eq!(resolve("30/02/2024 10:00:00"), None);
    }

    #[test]
    fn test_iso_zone_is_converted_to_utc() {
        assert_eq!(
            resolve("2024-01-15T10:30:00+02:00"),
            Some(ymd_hms(2024, 1, 15, 8, 30, 0))
        );
        let with_millis = resolve("at 2024-01-15T10:30:00.123Z").unwrap();
        assert_eq!(with_millis.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_earliest_offset_wins_across_shapes() {
        let text = "job 2024-01-15 10:30:00 retried 05/03/2024 10:00:00";
        let m = find_date(text).unwrap();
        assert_eq!(m.start, 4);
        assert_eq!(m.as_str(text), "2024-01-15 10:30:00");
        assert_eq!(m.timestamp, ymd_hms(2024, 1, 15, 10, 30, 0));

        let text = "05/03/2024 10:00:00 then 2024-01-15 10:30:00";
        let m = find_date(text).unwrap();
        assert_eq!(m.start, 0);
        assert_eq!(m.timestamp, ymd_hms(2024, 3, 5, 10, 0, 0));
    }

    #[test]
    fn test_unconvertible_match_does_not_hide_later_match() {
        let text = "bad 31/04/2024 10:00:00 good 15/01/2024 09:00:00";
        let m = find_date(text).unwrap();
        assert_eq!(m.as_str(text), "15/01/2024 09:00:00");
    }

    #[test]
    fn test_spanish_and_english_february_both_resolve() {
        assert_eq!(MonthLocale::English.month("feb"), Some(2));
        assert_eq!(MonthLocale::Spanish.month("feb"), Some(2));
        assert_eq!(MonthLocale::Spanish.month("ene"), Some(1));
        assert_eq!(MonthLocale::Spanish.month("ago"), Some(8));
        assert_eq!(MonthLocale::English.month("ago"), None);
        assert_eq!(
            resolve("3 feb 2024 08:00:00"),
            Some(ymd_hms(2024, 2, 3, 8, 0, 0))
        );
        assert_eq!(
            resolve("3 Feb. 2024, 08:00:00"),
            Some(ymd_hms(2024, 2, 3, 8, 0, 0))
        );
    }

    #[test]
    fn test_spanish_textual_dates() {
        assert_eq!(
            resolve("17 oct 2025, 15:03:51"),
            Some(ymd_hms(2025, 10, 17, 15, 3, 51))
        );
        assert_eq!(
            resolve("1 dic 2023 00:00:01"),
            Some(ymd_hms(2023, 12, 1, 0, 0, 1))
        );
        assert_eq!(
            resolve("Sept 9 2024 07:00:00"),
            None,
            "month-first textual shape takes exactly three letters"
        );
        assert_eq!(
            resolve("9 sept 2024 07:00:00"),
            Some(ymd_hms(2024, 9, 9, 7, 0, 0))
        );
        assert_eq!(resolve("9 xyz 2024 07:00:00"), None);
    }

    #[test]
    fn test_no_date_found() {
        assert_eq!(find_date(""), None);
        assert_eq!(find_date("disk failure on node 12"), None);
        assert_eq!(find_date("2024-01-15"), None);
    }

    #[test]
    fn test_epoch_digits() {
        assert_eq!(
            resolve_epoch_digits("1705314600"),
            Some(ymd_hms(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            resolve_epoch_digits("1705314600000"),
            Some(ymd_hms(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(resolve_epoch_digits("12345"), None);
        assert_eq!(resolve_epoch_digits("0000000001"), None, "1970 is outside the window");
        assert_eq!(resolve_epoch_digits("17053146OO"), None);
    }
}
