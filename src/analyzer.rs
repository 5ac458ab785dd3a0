//! Analysis pipeline: slowest-test selection and per-test processing
//!
//! Parses the full log, keeps the N slowest tests by their runner-reported
//! duration, and runs block segmentation and bottleneck detection over each
//! one. Every numeric knob travels in [`AnalyzerConfig`]; nothing here is
//! process-wide state.

use crate::bottleneck;
use crate::parser::{self, ParseError, SlowTest};
use crate::segmenter::{self, Block};
use crate::window::WindowSnapshot;
use crate::{html_output, json_output, report};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Path-shaped substring used as the stable per-test identifier.
static TEST_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".*(/test/extended/.*\.go.*)").expect("test file pattern is valid")
});

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Sliding window capacity in timed lines.
    pub window_size: usize,
    /// Slowness threshold in seconds.
    pub threshold: i64,
    /// How many of the slowest tests to report; below 1 means all.
    pub count: i64,
    /// Substrings whose lines are dropped before any processing.
    pub ignore: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            threshold: 120,
            count: 5,
            ignore: parser::DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything derived for one reported test.
#[derive(Debug, Clone)]
pub struct TestAnalysis {
    /// 1-based position in the slowest-first ordering.
    pub rank: usize,
    /// Identifier derived from the test's own output; `unknown` when no
    /// path-shaped line was found.
    pub name: String,
    pub test: SlowTest,
    pub blocks: Vec<Block>,
    pub windows: Vec<WindowSnapshot>,
}

/// Derive the per-test identifier from its raw lines.
pub fn test_name(lines: &[String]) -> String {
    for line in lines {
        if let Some(caps) = TEST_FILE.captures(line) {
            return caps[1].to_string();
        }
    }
    "unknown".to_string()
}

/// Parse the log and analyze the slowest tests.
pub fn analyze(log: &str, config: &AnalyzerConfig) -> Result<Vec<TestAnalysis>, ParseError> {
    let mut tests = parser::parse_log(log, &config.ignore)?;
    tests.sort_by(|a, b| b.reported_secs.total_cmp(&a.reported_secs));

    let keep = if config.count < 1 {
        tests.len()
    } else {
        tests.len().min(config.count as usize)
    };
    tests.truncate(keep);
    tracing::debug!(kept = tests.len(), "analyzing slowest tests");

    Ok(tests
        .into_iter()
        .enumerate()
        .map(|(i, test)| {
            let blocks = segmenter::segment(&test.lines, config.window_size, config.threshold);
            let windows =
                bottleneck::find_windows(&test.lines, config.window_size, config.threshold);
            TestAnalysis {
                rank: i + 1,
                name: test_name(&test.lines),
                test,
                blocks,
                windows,
            }
        })
        .collect())
}

/// Full run: read the log, analyze, and write every report.
///
/// Produces one text report per test plus `stats.json` under `output_dir`,
/// and optionally a chart page.
pub fn run(
    config: &AnalyzerConfig,
    input: &Path,
    output_dir: &Path,
    chart: Option<&Path>,
) -> Result<()> {
    let log = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read log file {}", input.display()))?;
    let analyses = analyze(&log, config)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    for analysis in &analyses {
        report::write_report(output_dir, analysis)?;
    }
    json_output::write_stats(output_dir, &analyses)?;

    if let Some(chart_path) = chart {
        html_output::write_chart(chart_path, &analyses)?;
    }
    Ok(())
}
