//! Bottleneck window detection
//!
//! A coarser companion to block segmentation: scan a test's lines with a
//! sliding window and snapshot every full window whose span exceeds the
//! threshold, skipping a window's worth of timed lines after each hit so
//! the same stall is not reported repeatedly.

use crate::timestamp;
use crate::window::{SlidingWindow, WindowSnapshot};

/// Find every bottleneck window in one test's lines, sorted by elapsed time
/// descending.
///
/// Only full windows are eligible: a short initial run of lines is never
/// flagged, however far apart its stamps are.
pub fn find_windows(lines: &[String], window_size: usize, threshold: i64) -> Vec<WindowSnapshot> {
    let mut window = SlidingWindow::new(window_size);
    let mut snapshots = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if let Some(timed) = timestamp::extract(&lines[i]) {
            window.push(timed);
        }
        if window.is_full() && window.elapsed() > threshold {
            tracing::debug!(elapsed = window.elapsed(), line = i, "bottleneck window");
            snapshots.push(window.snapshot());
            // Re-feed subsequent lines until the window has turned over
            // completely, bounding overlap between reported windows.
            let mut refilled = 0;
            while refilled < window_size && i + 1 < lines.len() {
                i += 1;
                if let Some(timed) = timestamp::extract(&lines[i]) {
                    window.push(timed);
                    refilled += 1;
                }
            }
        }
        i += 1;
    }

    snapshots.sort_by(|a, b| b.elapsed().cmp(&a.elapsed()));
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(t: i64, text: &str) -> String {
        format!("Jan 12 10:{:02}:{:02} {}", t / 60, t % 60, text)
    }

    fn lines(times: &[i64]) -> Vec<String> {
        times
            .iter()
            .map(|&t| line(t, &format!("at {t}")))
            .collect()
    }

    #[test]
    fn test_two_stalls_two_windows() {
        let input = lines(&[0, 1, 2, 200, 201, 202, 600, 601, 602]);
        let windows = find_windows(&input, 3, 120);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_windows_sorted_by_elapsed_descending() {
        let input = lines(&[0, 1, 2, 200, 201, 202, 600, 601, 602]);
        let windows = find_windows(&input, 3, 120);
        assert!(windows[0].elapsed() >= windows[1].elapsed());
    }

    #[test]
    fn test_not_full_never_flagged() {
        // Two lines spanning far more than the threshold, but the window
        // never fills.
        let input = lines(&[0, 500]);
        assert!(find_windows(&input, 5, 120).is_empty());
    }

    #[test]
    fn test_quiet_log_no_windows() {
        let input = lines(&[0, 10, 20, 30, 40, 50]);
        assert!(find_windows(&input, 3, 120).is_empty());
    }

    #[test]
    fn test_windows_share_at_most_capacity_minus_one_lines() {
        let input = lines(&[0, 1, 2, 150, 300, 450, 600, 601, 602, 900]);
        let window_size = 3;
        let windows = find_windows(&input, window_size, 120);
        for (i, a) in windows.iter().enumerate() {
            for b in windows.iter().skip(i + 1) {
                let shared = a
                    .lines()
                    .iter()
                    .filter(|l| b.lines().iter().any(|m| m.text == l.text))
                    .count();
                assert!(shared < window_size, "windows overlap by {shared} lines");
            }
        }
    }

    #[test]
    fn test_untimed_lines_do_not_refill() {
        // Untimed chatter between stamps must not count toward the
        // skip-ahead, or a second stall could hide inside it.
        let mut input = lines(&[0, 1, 2, 200]);
        for _ in 0..10 {
            input.push("untimed chatter".to_string());
        }
        input.extend(lines(&[201, 202, 600, 601, 602]));
        let windows = find_windows(&input, 3, 120);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_windows(&[], 5, 120).is_empty());
    }

    #[test]
    fn test_snapshot_contents_are_the_triggering_window() {
        let input = lines(&[0, 1, 2, 200]);
        let windows = find_windows(&input, 3, 120);
        assert_eq!(windows.len(), 1);
        let texts: Vec<&str> = windows[0].lines().iter().map(|l| l.text.as_str()).collect();
        assert!(texts[0].contains("at 1"));
        assert!(texts[2].contains("at 200"));
    }
}
