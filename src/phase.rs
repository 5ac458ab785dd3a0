//! Docker build/push phase extraction
//!
//! Tests that build and publish container images emit paired marker lines in
//! their output. A start marker opens a phase; an end marker of either kind
//! closes the most recently appended phase. Closing is deliberately not
//! type-checked: builds and pushes do not interleave in these logs, and the
//! observed pairing behavior is preserved as-is.

use crate::timestamp::{self, PHASE_TIME_PREFIX};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static BUILD_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{PHASE_TIME_PREFIX}Step 1/")).expect("build start pattern is valid")
});
static BUILD_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{PHASE_TIME_PREFIX}Successfully built"))
        .expect("build end pattern is valid")
});
static PUSH_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{PHASE_TIME_PREFIX}Pushing image")).expect("push start pattern is valid")
});
static PUSH_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{PHASE_TIME_PREFIX}Push successful")).expect("push end pattern is valid")
});

/// Errors from phase marker tracking. These are input-format faults that
/// abort the whole run: a log whose markers do not pair cannot be segmented
/// reliably.
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("phase end marker with no open phase: {line}")]
    UnmatchedEnd { line: String },
}

/// Kind of sub-phase embedded in a test's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Build,
    Push,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Push => write!(f, "push"),
        }
    }
}

/// A build or push interval within one test.
///
/// `end` is `None` while the phase is open; a phase never closed keeps
/// `None` and is rendered as a zero-length interval at the report boundary.
#[derive(Debug, Clone)]
pub struct Phase {
    pub kind: PhaseKind,
    pub start: i64,
    pub start_line: String,
    pub end: Option<i64>,
    pub end_line: Option<String>,
}

impl Phase {
    /// Phase duration in seconds, with the zero-length fallback for phases
    /// that never saw their end marker.
    pub fn duration(&self) -> i64 {
        self.end.map_or(0, |end| end - self.start)
    }
}

/// Tracks open and closed phases across one test's lines.
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phases: Vec<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one line for phase markers.
    ///
    /// Start markers append an open phase. End markers of either kind close
    /// the most recently appended phase; an end marker arriving before any
    /// start is a fatal input-format error.
    pub fn observe(&mut self, line: &str) -> Result<(), PhaseError> {
        if let Some(time) = timestamp::phase_time(&BUILD_START, line) {
            self.open(PhaseKind::Build, time, line);
            return Ok(());
        }
        if let Some(time) = timestamp::phase_time(&PUSH_START, line) {
            self.open(PhaseKind::Push, time, line);
            return Ok(());
        }
        if let Some(time) = timestamp::phase_time(&BUILD_END, line) {
            return self.close(time, line);
        }
        if let Some(time) = timestamp::phase_time(&PUSH_END, line) {
            return self.close(time, line);
        }
        Ok(())
    }

    fn open(&mut self, kind: PhaseKind, time: i64, line: &str) {
        tracing::debug!(%kind, time, "phase start");
        self.phases.push(Phase {
            kind,
            start: time,
            start_line: line.to_string(),
            end: None,
            end_line: None,
        });
    }

    fn close(&mut self, time: i64, line: &str) -> Result<(), PhaseError> {
        let phase = self.phases.last_mut().ok_or_else(|| PhaseError::UnmatchedEnd {
            line: line.to_string(),
        })?;
        tracing::debug!(kind = %phase.kind, time, "phase end");
        phase.end = Some(time);
        phase.end_line = Some(line.to_string());
        Ok(())
    }

    /// All phases observed so far, in append order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Consume the tracker, yielding the observed phases.
    pub fn finish(self) -> Vec<Phase> {
        self.phases
    }
}
