//! Per-test text reports
//!
//! One file per reported test: the runner-reported time, docker phases,
//! bottleneck windows worth reading, and the entire raw output last so the
//! interesting parts come first.

use crate::analyzer::TestAnalysis;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name for one test's report: zero-padded rank, reported seconds, and
/// the path-derived identifier with slashes flattened.
pub fn report_file_name(analysis: &TestAnalysis) -> String {
    format!(
        "{:04}_{}{}",
        analysis.rank,
        analysis.test.reported_secs,
        analysis.name.replace('/', "_")
    )
}

/// Render one test's report.
pub fn render_report(analysis: &TestAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "time: {}s", analysis.test.reported_secs);

    for phase in &analysis.test.phases {
        let _ = writeln!(
            out,
            "docker {}: {}s\n  {}\n  {}",
            phase.kind,
            phase.duration(),
            phase.start_line,
            phase.end_line.as_deref().unwrap_or("")
        );
    }

    for (i, window) in analysis.windows.iter().enumerate() {
        let _ = writeln!(out, "\nWindow {} - {}s", i, window.elapsed());
        for line in window.lines() {
            let _ = writeln!(out, "{}", line.text);
        }
    }

    let _ = writeln!(out, "\n\nEntire output:");
    for line in &analysis.test.lines {
        let _ = writeln!(out, "{line}");
    }
    out
}

/// Write one test's report into the output directory.
pub fn write_report(output_dir: &Path, analysis: &TestAnalysis) -> Result<PathBuf> {
    let path = output_dir.join(report_file_name(analysis));
    std::fs::write(&path, render_report(analysis))
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{analyze, AnalyzerConfig};

    fn analysis() -> TestAnalysis {
        let log = "\
------------------------------
2018-05-04T10:00:00.000Z Step 1/9 : FROM centos:7
2018-05-04T10:01:40.000Z Successfully built abc123
Jan 12 10:00:00 /go/src/origin/test/extended/builds/multistage.go:52 running
Jan 12 10:00:01 step a
Jan 12 10:00:02 step b
Jan 12 10:00:03 step c
Jan 12 10:05:00 done waiting
• [SLOW TEST:150.5 seconds]
";
        analyze(log, &AnalyzerConfig::default())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_file_name_flattens_path() {
        let analysis = analysis();
        assert_eq!(
            report_file_name(&analysis),
            "0001_150.5_test_extended_builds_multistage.go:52 running"
        );
    }

    #[test]
    fn test_file_name_whole_seconds_have_no_decimal() {
        let mut analysis = analysis();
        analysis.test.reported_secs = 121.0;
        analysis.name = "unknown".to_string();
        assert_eq!(report_file_name(&analysis), "0001_121unknown");
    }

    #[test]
    fn test_report_sections() {
        let report = render_report(&analysis());
        assert!(report.starts_with("time: 150.5s\n"));
        assert!(report.contains("docker build: 100s"));
        assert!(report.contains("Step 1/9"));
        assert!(report.contains("Window 0 - 300s"));
        assert!(report.contains("\n\nEntire output:\n"));
        assert!(report.contains("done waiting"));
    }

    #[test]
    fn test_unclosed_phase_renders_zero_duration() {
        let log = "\
2018-05-04T10:00:00.000Z Pushing image registry/app:v1 ...
Jan 12 10:00:00 output
• [SLOW TEST:130 seconds]
";
        let analysis = analyze(log, &AnalyzerConfig::default())
            .unwrap()
            .remove(0);
        let report = render_report(&analysis);
        assert!(report.contains("docker push: 0s"));
    }

    #[test]
    fn test_write_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), &analysis()).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("time: 150.5s"));
    }
}
