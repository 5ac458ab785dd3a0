//! Sliding window over timestamped log lines
//!
//! A fixed-capacity buffer of the most recent timed lines, used by both the
//! block segmenter and the bottleneck finder to measure local elapsed time.

use crate::timestamp::TimedLine;
use std::collections::VecDeque;

/// Bounded buffer of recent timed lines, oldest first.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    lines: VecDeque<TimedLine>,
    capacity: usize,
    /// Timed lines received since construction or the last reset. A window
    /// stays full across evictions; only a reset re-arms the count.
    received: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` timed lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            received: 0,
        }
    }

    /// Append a timed line, evicting the oldest once at capacity.
    pub fn push(&mut self, line: TimedLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.received += 1;
    }

    /// Seconds spanned by the current contents; 0 with fewer than 2 lines.
    pub fn elapsed(&self) -> i64 {
        match (self.lines.front(), self.lines.back()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0,
        }
    }

    /// Whether the window has received a full capacity's worth of timed
    /// lines since the last reset. Gates bottleneck detection so that a
    /// short initial run of lines is never flagged.
    pub fn is_full(&self) -> bool {
        self.received >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Oldest line currently held.
    pub fn first(&self) -> Option<&TimedLine> {
        self.lines.front()
    }

    /// Newest line currently held.
    pub fn last(&self) -> Option<&TimedLine> {
        self.lines.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedLine> {
        self.lines.iter()
    }

    /// Clear the window and seed it with a single line, re-arming the
    /// fullness count.
    pub fn reset_to(&mut self, line: TimedLine) {
        self.lines.clear();
        self.lines.push_back(line);
        self.received = 1;
    }

    /// Freeze the current contents for later reporting.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            lines: self.lines.iter().cloned().collect(),
        }
    }
}

/// A window frozen at the moment it exceeded the slowness threshold.
#[derive(Debug, Clone)]
pub struct WindowSnapshot {
    lines: Vec<TimedLine>,
}

impl WindowSnapshot {
    /// Seconds spanned by the snapshot contents.
    pub fn elapsed(&self) -> i64 {
        match (self.lines.first(), self.lines.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0,
        }
    }

    pub fn lines(&self) -> &[TimedLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(time: i64, text: &str) -> TimedLine {
        TimedLine {
            time,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_window_elapsed_zero() {
        let w = SlidingWindow::new(5);
        assert_eq!(w.elapsed(), 0);
        assert!(w.is_empty());
        assert!(!w.is_full());
    }

    #[test]
    fn test_single_line_elapsed_zero() {
        let mut w = SlidingWindow::new(5);
        w.push(timed(100, "a"));
        assert_eq!(w.elapsed(), 0);
    }

    #[test]
    fn test_elapsed_spans_contents() {
        let mut w = SlidingWindow::new(5);
        w.push(timed(10, "a"));
        w.push(timed(14, "b"));
        w.push(timed(25, "c"));
        assert_eq!(w.elapsed(), 15);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut w = SlidingWindow::new(3);
        for t in [0, 10, 20, 30] {
            w.push(timed(t, "l"));
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.first().unwrap().time, 10);
        assert_eq!(w.last().unwrap().time, 30);
        assert_eq!(w.elapsed(), 20);
    }

    #[test]
    fn test_full_only_after_capacity_received() {
        let mut w = SlidingWindow::new(3);
        w.push(timed(0, "a"));
        w.push(timed(1, "b"));
        assert!(!w.is_full());
        w.push(timed(2, "c"));
        assert!(w.is_full());
    }

    #[test]
    fn test_full_survives_eviction() {
        let mut w = SlidingWindow::new(2);
        w.push(timed(0, "a"));
        w.push(timed(1, "b"));
        w.push(timed(2, "c"));
        assert_eq!(w.len(), 2);
        assert!(w.is_full());
    }

    #[test]
    fn test_reset_rearms_fullness() {
        let mut w = SlidingWindow::new(2);
        w.push(timed(0, "a"));
        w.push(timed(5, "b"));
        assert!(w.is_full());
        w.reset_to(timed(5, "b"));
        assert!(!w.is_full());
        assert_eq!(w.len(), 1);
        assert_eq!(w.elapsed(), 0);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut w = SlidingWindow::new(2);
        w.push(timed(0, "a"));
        w.push(timed(9, "b"));
        let snap = w.snapshot();
        w.push(timed(50, "c"));
        assert_eq!(snap.elapsed(), 9);
        assert_eq!(snap.lines().len(), 2);
        assert_eq!(snap.lines()[0].text, "a");
    }
}
