//! Splitting a CI run log into per-test line groups
//!
//! The test runner prints a dashed separator before each test and a
//! `• [SLOW TEST: ...]` marker after any test that exceeded its own slowness
//! threshold, carrying the authoritative duration. Tests that never earn a
//! marker are dropped along with their buffered lines.

use crate::phase::{Phase, PhaseError, PhaseTracker};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Marker announcing a finished slow test, with its reported duration.
pub const SLOW_TEST_PREFIX: &str = "• [SLOW TEST:";

/// Separator the runner prints between tests.
pub const SEPARATOR_PREFIX: &str = "------------------------------";

/// Boilerplate dropped before any other processing; these lines would
/// otherwise pollute phase detection.
pub const DEFAULT_IGNORE: &[&str] = &["INFO: Running AfterSuite actions on all node"];

static SLOW_TEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^• \[SLOW TEST:(.*) seconds\]$").expect("slow test pattern is valid")
});

/// Fatal input-format errors. A log that fails here cannot be segmented
/// reliably, so the whole run aborts with no partial results.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unparsable slow test duration: {line}")]
    BadDuration { line: String },

    #[error(transparent)]
    Phase(#[from] PhaseError),
}

/// One test that exceeded the runner's slowness threshold.
#[derive(Debug, Clone)]
pub struct SlowTest {
    /// Runner-reported duration from the marker line. Authoritative; never
    /// reconciled with block or window timing.
    pub reported_secs: f64,
    pub phases: Vec<Phase>,
    pub lines: Vec<String>,
}

/// Split a full run log into slow tests.
///
/// `ignore` substrings drop a line entirely before any other processing.
/// Marker lines stay visible in raw output: each one is appended to the
/// buffer that starts after it.
pub fn parse_log(log: &str, ignore: &[String]) -> Result<Vec<SlowTest>, ParseError> {
    let mut tests = Vec::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut tracker = PhaseTracker::new();

    for line in log.lines() {
        if ignore.iter().any(|pat| line.contains(pat.as_str())) {
            continue;
        }
        if line.starts_with(SLOW_TEST_PREFIX) {
            let reported_secs = reported_secs(line)?;
            let finished = std::mem::take(&mut tracker);
            tests.push(SlowTest {
                reported_secs,
                phases: finished.finish(),
                lines: std::mem::take(&mut buffer),
            });
            tracing::debug!(reported_secs, "slow test");
        } else if line.starts_with(SEPARATOR_PREFIX) {
            buffer.clear();
            tracker = PhaseTracker::new();
        } else {
            tracker.observe(line)?;
        }
        buffer.push(line.to_string());
    }

    Ok(tests)
}

fn reported_secs(line: &str) -> Result<f64, ParseError> {
    let caps = SLOW_TEST.captures(line).ok_or_else(|| ParseError::BadDuration {
        line: line.to_string(),
    })?;
    caps[1].parse().map_err(|_| ParseError::BadDuration {
        line: line.to_string(),
    })
}
