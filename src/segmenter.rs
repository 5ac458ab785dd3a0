//! Fast/slow block segmentation of one test's output
//!
//! Partitions a test's lines into alternating fast and slow blocks by
//! sliding a bounded window over its timed lines. Whenever the window spans
//! more than the slowness threshold, the window's contents become a slow
//! block and the surrounding fast spans keep only their boundary lines with
//! an elision marker in between, bounding report size regardless of how much
//! a test printed.

use crate::timestamp::{self, TimedLine};
use crate::window::SlidingWindow;

/// Marker standing in for the omitted interior of a fast block.
pub const ELISION: &str = "...";

/// Classification of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Fast,
    Slow,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Slow => write!(f, "slow"),
        }
    }
}

/// A contiguous classified span of a test's output.
///
/// `start` and `end` are seconds relative to the test's first timed line.
/// Only the terminal block may still have `end = None` when segmentation
/// finishes; the serialization boundary renders that as `end := start`.
#[derive(Debug, Clone)]
pub struct Block {
    pub lines: Vec<String>,
    pub start: i64,
    pub end: Option<i64>,
    pub kind: BlockKind,
}

impl Block {
    fn open(start: i64, seed: &str, kind: BlockKind) -> Self {
        Self {
            lines: vec![seed.to_string()],
            start,
            end: None,
            kind,
        }
    }

    /// Block duration in seconds, zero while the block is still open.
    pub fn duration(&self) -> i64 {
        self.end.map_or(0, |end| end - self.start)
    }
}

/// Streaming segmenter for one test's line sequence.
#[derive(Debug)]
pub struct BlockSegmenter {
    window: SlidingWindow,
    threshold: i64,
    blocks: Vec<Block>,
    /// Time of the very first timed line, fixed once so every block start
    /// and end is an offset from the beginning of the test.
    offset: Option<i64>,
}

impl BlockSegmenter {
    pub fn new(window_size: usize, threshold: i64) -> Self {
        Self {
            window: SlidingWindow::new(window_size),
            threshold,
            blocks: Vec::new(),
            offset: None,
        }
    }

    /// Feed the next raw line. Untimed lines leave the window untouched and
    /// never appear in any block.
    pub fn feed(&mut self, line: &str) {
        if let Some(timed) = timestamp::extract(line) {
            self.window.push(timed);
        }
        self.advance();
    }

    fn advance(&mut self) {
        if self.blocks.is_empty() {
            // Open the first block at the window's earliest line.
            if let Some(first) = self.window.first() {
                let offset = *self.offset.get_or_insert(first.time);
                self.blocks
                    .push(Block::open(first.time - offset, &first.text, BlockKind::Fast));
            }
            return;
        }

        if self.window.elapsed() > self.threshold {
            self.split();
        }
    }

    /// The window spans more than the threshold: close the running fast
    /// block at the window's earliest line, emit the window verbatim as a
    /// slow block, and start a fresh fast block at its latest line.
    fn split(&mut self) {
        let offset = self.offset.unwrap_or(0);
        let (Some(first), Some(last)) = (self.window.first().cloned(), self.window.last().cloned())
        else {
            return;
        };
        let Some(current) = self.blocks.last_mut() else {
            return;
        };
        current.end = Some(first.time - offset);
        current.lines.push(ELISION.to_string());
        current.lines.push(first.text.clone());
        current.kind = BlockKind::Fast;

        let slow = Block {
            lines: self.window.iter().map(|l| l.text.clone()).collect(),
            start: first.time - offset,
            end: Some(last.time - offset),
            kind: BlockKind::Slow,
        };
        tracing::debug!(
            start = slow.start,
            end = last.time - offset,
            lines = slow.lines.len(),
            "slow block"
        );
        self.blocks.push(slow);
        self.blocks
            .push(Block::open(last.time - offset, &last.text, BlockKind::Fast));

        self.window.reset_to(last);
    }

    /// Close the final open block and yield the finished sequence.
    ///
    /// A test whose output never carried a timed line produces no blocks.
    pub fn finish(mut self) -> Vec<Block> {
        let offset = self.offset.unwrap_or(0);
        if let (Some(last), Some(current)) = (self.window.last(), self.blocks.last_mut()) {
            current.end = Some(last.time - offset);
            current.lines.push(ELISION.to_string());
            current.lines.push(last.text.clone());
            current.kind = BlockKind::Fast;
        }
        self.blocks
    }
}

/// Segment one test's lines in a single call.
pub fn segment(lines: &[String], window_size: usize, threshold: i64) -> Vec<Block> {
    let mut segmenter = BlockSegmenter::new(window_size, threshold);
    for line in lines {
        segmenter.feed(line);
    }
    segmenter.finish()
}
