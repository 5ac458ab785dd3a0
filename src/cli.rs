//! CLI argument parsing for Lentitud

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lentitud")]
#[command(version)]
#[command(about = "CI test log analyzer: segments slow test output into fast/slow blocks", long_about = None)]
pub struct Cli {
    /// Log file to parse
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// Output folder for per-test reports and stats.json
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "out")]
    pub output: PathBuf,

    /// Report the 'c' slowest tests (below 1 means all)
    #[arg(short = 'c', long = "count", default_value = "5")]
    pub count: i64,

    /// Sliding window size in timed lines
    #[arg(short = 'w', long = "window-size", value_name = "SIZE", default_value = "5")]
    pub window_size: usize,

    /// Threshold in seconds to identify windows/bottlenecks
    #[arg(short = 't', long = "threshold", value_name = "SECS", default_value = "120")]
    pub threshold: i64,

    /// Additional substrings whose lines are dropped before any processing
    #[arg(long = "ignore", value_name = "SUBSTR")]
    pub ignore: Vec<String>,

    /// Also render a stacked-bar chart page of the block structure
    #[arg(long = "chart", value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Enable debug tracing output
    #[arg(long = "debug")]
    pub debug: bool,
}
