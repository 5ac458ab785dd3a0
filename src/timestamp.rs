//! Timestamp extraction from CI log lines
//!
//! Two formats appear in the logs we ingest: the test runner prefixes lines
//! with a syslog-style `Mon dd hh:mm:ss` stamp, and docker daemon output
//! carries an ISO-8601 stamp with fractional seconds. Neither format has a
//! year field, so every reading is collapsed onto a fixed reference year;
//! callers only ever take differences between readings.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// Reference year all parsed clock readings collapse onto.
const REFERENCE_YEAR: &str = "2000";

/// Syslog-style line timestamp: month name, day, clock. Day and month may be
/// separated by one or two spaces (single-digit days are double-spaced).
static LINE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]{2}[ ]{1,2}[0-9]{1,2}[ ]{1,2}[0-9]{1,2}:[0-9]{2}:[0-9]{2}).*")
        .expect("line timestamp pattern is valid")
});

/// Prefix shared by all docker phase markers: ISO-8601 date-time with
/// fractional seconds, capturing only the hh:mm:ss component.
pub const PHASE_TIME_PREFIX: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T([0-9]{2}:[0-9]{2}:[0-9]{2})\.[0-9]*Z ";

/// A log line that carried a recognizable timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedLine {
    /// Unix seconds of the clock reading in the reference year.
    pub time: i64,
    /// The full raw line, marker included.
    pub text: String,
}

/// Extract the line timestamp, if present.
///
/// Returns `None` for lines without a recognizable stamp; those lines are
/// untimed and excluded from all elapsed-time computation.
pub fn extract(text: &str) -> Option<TimedLine> {
    let caps = LINE_TIME.captures(text)?;
    let stamp = caps.get(1)?.as_str().replace("  ", " ");
    let parsed = NaiveDateTime::parse_from_str(
        &format!("{REFERENCE_YEAR} {stamp}"),
        "%Y %b %d %H:%M:%S",
    )
    .ok()?;
    Some(TimedLine {
        time: parsed.and_utc().timestamp(),
        text: text.to_string(),
    })
}

/// Extract the hh:mm:ss component matched by a phase-marker pattern.
///
/// `re` must be a pattern composed from [`PHASE_TIME_PREFIX`], whose first
/// capture group is the clock reading.
pub fn phase_time(re: &Regex, text: &str) -> Option<i64> {
    let caps = re.captures(text)?;
    let stamp = caps.get(1)?.as_str();
    let parsed = NaiveDateTime::parse_from_str(
        &format!("{REFERENCE_YEAR}-01-01 {stamp}"),
        "%Y-%m-%d %H:%M:%S",
    )
    .ok()?;
    Some(parsed.and_utc().timestamp())
}
