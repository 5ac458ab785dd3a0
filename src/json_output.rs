//! JSON output format for segmented test blocks
//!
//! The engine types keep open ends as `Option`; these mirror structs resolve
//! them to the display fallback and pin the wire key names consumed by the
//! chart tooling (`name`, `block`, `blockType`).

use crate::analyzer::TestAnalysis;
use crate::segmenter::Block;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single classified span of a test's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBlock {
    /// Retained lines: a slow block's full window, a fast block's boundary
    /// lines around the elision marker.
    pub lines: Vec<String>,
    /// Seconds from the test's first timed line.
    pub start: i64,
    /// Seconds from the test's first timed line; equals `start` for a block
    /// that never closed.
    pub end: i64,
    /// `"fast"` or `"slow"`.
    #[serde(rename = "blockType")]
    pub block_type: String,
}

impl JsonBlock {
    fn from_block(block: &Block) -> Self {
        Self {
            lines: block.lines.clone(),
            start: block.start,
            end: block.end.unwrap_or(block.start),
            block_type: block.kind.to_string(),
        }
    }
}

/// One test's block structure, keyed by its derived identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTestBlocks {
    pub name: String,
    #[serde(rename = "block")]
    pub blocks: Vec<JsonBlock>,
}

impl JsonTestBlocks {
    pub fn from_analysis(analysis: &TestAnalysis) -> Self {
        Self {
            name: analysis.name.clone(),
            blocks: analysis.blocks.iter().map(JsonBlock::from_block).collect(),
        }
    }
}

/// Build the stats structure for every reported test.
pub fn stats(analyses: &[TestAnalysis]) -> Vec<JsonTestBlocks> {
    analyses.iter().map(JsonTestBlocks::from_analysis).collect()
}

/// Serialize to pretty-printed JSON.
pub fn to_json(stats: &[JsonTestBlocks]) -> Result<String> {
    serde_json::to_string_pretty(stats).context("failed to serialize stats")
}

/// Write `stats.json` into the output directory.
pub fn write_stats(output_dir: &Path, analyses: &[TestAnalysis]) -> Result<()> {
    let path = output_dir.join("stats.json");
    let json = to_json(&stats(analyses))?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
