//! HTML chart page for segmented test blocks
//!
//! Renders the per-test block structure as one stacked bar per test, fast
//! and slow spans alternating in color, with the retained lines surfaced in
//! the tooltip. Chart.js draws the page; this module only pivots blocks
//! into datasets and emits the markup.

use crate::analyzer::TestAnalysis;
use crate::json_output::{self, JsonTestBlocks};
use anyhow::{Context, Result};
use std::path::Path;

const FAST_COLOR: &str = "rgba(128,200,128,0.7)";
const SLOW_COLOR: &str = "rgba(200,128,128,0.7)";

/// Longest label line kept in a tooltip before truncation.
const LABEL_MAX: usize = 100;

/// One Chart.js dataset: the i-th block of every test.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Per-test tooltip labels, each a JS array literal of quoted lines in
    /// reverse block order (newest first).
    pub labels: Vec<String>,
    pub background_color: &'static str,
    /// Per-test block durations, stringified.
    pub data: Vec<String>,
}

fn trunc(line: &str) -> String {
    if line.chars().count() > LABEL_MAX {
        let kept: String = line.chars().take(LABEL_MAX - 3).collect();
        format!("{kept}...")
    } else {
        line.to_string()
    }
}

fn label_for(lines: &[String]) -> String {
    let quoted: Vec<String> = lines
        .iter()
        .rev()
        .map(|l| format!("{:?}", trunc(l)))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Widest block count and latest end time across all tests.
fn extent(tests: &[JsonTestBlocks]) -> (usize, i64) {
    let mut max_blocks = 0;
    let mut max_time = 0;
    for test in tests {
        max_blocks = max_blocks.max(test.blocks.len());
        if let Some(last) = test.blocks.last() {
            max_time = max_time.max(last.end);
        }
    }
    (max_blocks, max_time)
}

/// Pivot per-test block lists into per-position datasets.
///
/// Dataset `i` holds the i-th block of every test, colors alternating
/// fast/slow from the first position; tests with fewer blocks contribute an
/// empty label and zero duration.
pub fn to_datasets(tests: &[JsonTestBlocks]) -> Vec<DataSet> {
    let (max_blocks, _) = extent(tests);
    let mut datasets: Vec<DataSet> = (0..max_blocks)
        .map(|i| DataSet {
            labels: vec!["[]".to_string(); tests.len()],
            background_color: if i % 2 == 0 { FAST_COLOR } else { SLOW_COLOR },
            data: vec!["0".to_string(); tests.len()],
        })
        .collect();

    for (test_index, test) in tests.iter().enumerate() {
        for (block_index, block) in test.blocks.iter().enumerate() {
            datasets[block_index].labels[test_index] = label_for(&block.lines);
            datasets[block_index].data[test_index] = (block.end - block.start).to_string();
        }
    }
    datasets
}

fn test_names_js(tests: &[JsonTestBlocks]) -> String {
    let quoted: Vec<String> = tests.iter().map(|t| format!("{:?}", t.name)).collect();
    format!("[{}]", quoted.join(",\n "))
}

fn datasets_js(tests: &[JsonTestBlocks]) -> String {
    let rendered: Vec<String> = to_datasets(tests)
        .iter()
        .map(|ds| {
            format!(
                "{{ labels: [{}],\nbackgroundColor: \"{}\",\ndata: [{}], stack: 1 }}\n",
                ds.labels.join(",\n"),
                ds.background_color,
                ds.data.join(",\n")
            )
        })
        .collect();
    rendered.join(", ")
}

/// Render the full chart page.
pub fn render_page(tests: &[JsonTestBlocks]) -> String {
    let (_, max_time) = extent(tests);
    let y_max = (max_time as f64 * 1.02) as i64;
    let mut page = String::new();
    page.push_str(PRE);
    page.push_str(&format!(
        "\t\t\t\tvar data = {{\n\t\t\t\t\tlabels: {},\n\t\t\t\t\tdatasets: [ {} ]\n\t\t\t\t}};\n",
        test_names_js(tests),
        datasets_js(tests)
    ));
    page.push_str(&post(y_max));
    page
}

/// Write the chart page for the analyzed tests.
pub fn write_chart(path: &Path, analyses: &[TestAnalysis]) -> Result<()> {
    let tests = json_output::stats(analyses);
    std::fs::write(path, render_page(&tests))
        .with_context(|| format!("failed to write chart page {}", path.display()))?;
    Ok(())
}

const PRE: &str = r#"<!DOCTYPE HTML>
<html>
	<head>
		<script type="text/javascript">
			window.onload = function () {
				Chart.defaults.groupableBar = Chart.helpers.clone(Chart.defaults.bar);
				Chart.defaults.global.events = ["click"];

				Chart.controllers.groupableBar = Chart.controllers.bar.extend({
					calculateBarX: function (index, datasetIndex) {
						// position the bars based on the stack index
						var stackIndex = this.getMeta().stackIndex;
						return Chart.controllers.bar.prototype.calculateBarX.apply(this, [index, stackIndex]);
					},

					hideOtherStacks: function (datasetIndex) {
						var meta = this.getMeta();
						var stackIndex = meta.stackIndex;

						this.hiddens = [];
						for (var i = 0; i < datasetIndex; i++) {
							var dsMeta = this.chart.getDatasetMeta(i);
							if (dsMeta.stackIndex !== stackIndex) {
								this.hiddens.push(dsMeta.hidden);
								dsMeta.hidden = true;
							}
						}
					},

					unhideOtherStacks: function (datasetIndex) {
						var meta = this.getMeta();
						var stackIndex = meta.stackIndex;

						for (var i = 0; i < datasetIndex; i++) {
							var dsMeta = this.chart.getDatasetMeta(i);
							if (dsMeta.stackIndex !== stackIndex) {
								dsMeta.hidden = this.hiddens.unshift();
							}
						}
					},

					calculateBarY: function (index, datasetIndex) {
						this.hideOtherStacks(datasetIndex);
						var barY = Chart.controllers.bar.prototype.calculateBarY.apply(this, [index, datasetIndex]);
						this.unhideOtherStacks(datasetIndex);
						return barY;
					},

					calculateBarBase: function (datasetIndex, index) {
						this.hideOtherStacks(datasetIndex);
						var barBase = Chart.controllers.bar.prototype.calculateBarBase.apply(this, [datasetIndex, index]);
						this.unhideOtherStacks(datasetIndex);
						return barBase;
					},

					getBarCount: function () {
						var stacks = [];
						Chart.helpers.each(this.chart.data.datasets, function (dataset, datasetIndex) {
							var meta = this.chart.getDatasetMeta(datasetIndex);
							if (meta.bar && this.chart.isDatasetVisible(datasetIndex)) {
								var stackIndex = stacks.indexOf(dataset.stack);
								if (stackIndex === -1) {
									stackIndex = stacks.length;
									stacks.push(dataset.stack);
								}
								meta.stackIndex = stackIndex;
							}
						}, this);

						this.getMeta().stacks = stacks;
						return stacks.length;
					},
				});

"#;

fn post(y_max: i64) -> String {
    format!(
        r#"
				var ctx = document.getElementById("blockChart").getContext("2d");
				new Chart(ctx, {{
					type: 'groupableBar',
					data: data,
					options: {{
						legend: {{
							display: false
						}},
						scales: {{
							yAxes: [{{
								ticks: {{
									max: {y_max},
									beginAtZero: true,
								}},
								stacked: true,
							}}],
							xAxes: [{{
								ticks: {{
									display: false,
									beginAtZero: true,
								}},
							}}]
						}},
						tooltips: {{
							callbacks: {{
								label: function(tooltipItem, data) {{
									return data.datasets[tooltipItem.datasetIndex].labels[tooltipItem.index];
								}}
							}}
						}}
					}}
				}});
			}}

		</script>
	</head>
	<body>
		<canvas id="blockChart"></canvas>
		<script src="./Chart.bundle.js"></script>
	</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_output::JsonBlock;

    fn json_block(lines: &[&str], start: i64, end: i64, block_type: &str) -> JsonBlock {
        JsonBlock {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            start,
            end,
            block_type: block_type.to_string(),
        }
    }

    /// The two-test reference fixture: a 3-block test and a 4-block test.
    fn fixture() -> Vec<JsonTestBlocks> {
        vec![
            JsonTestBlocks {
                name: "test1".to_string(),
                blocks: vec![
                    json_block(&["1line1", "1line2"], 0, 7, "fast"),
                    json_block(&["1line3", "1line4"], 7, 17, "slow"),
                    json_block(&["1line5", "1line6"], 17, 18, "fast"),
                ],
            },
            JsonTestBlocks {
                name: "test2".to_string(),
                blocks: vec![
                    json_block(&["2line1", "2line2"], 0, 1, "fast"),
                    json_block(&["2line3", "2line4"], 1, 4, "slow"),
                    json_block(&["2line5", "2line6"], 4, 6, "fast"),
                    json_block(&["2line7", "2line8"], 6, 11, "slow"),
                ],
            },
        ]
    }

    #[test]
    fn test_fixture_dataset_count() {
        assert_eq!(to_datasets(&fixture()).len(), 4);
    }

    #[test]
    fn test_fixture_labels_reversed_per_block() {
        let datasets = to_datasets(&fixture());
        assert_eq!(
            datasets[0].labels,
            vec![
                r#"["1line2", "1line1"]"#.to_string(),
                r#"["2line2", "2line1"]"#.to_string(),
            ]
        );
        assert_eq!(
            datasets[3].labels,
            vec!["[]".to_string(), r#"["2line8", "2line7"]"#.to_string()]
        );
    }

    #[test]
    fn test_fixture_durations() {
        let datasets = to_datasets(&fixture());
        assert_eq!(datasets[0].data, vec!["7", "1"]);
        assert_eq!(datasets[1].data, vec!["10", "3"]);
        assert_eq!(datasets[2].data, vec!["1", "2"]);
        assert_eq!(datasets[3].data, vec!["0", "5"]);
    }

    #[test]
    fn test_fixture_colors_alternate() {
        let datasets = to_datasets(&fixture());
        assert_eq!(datasets[0].background_color, FAST_COLOR);
        assert_eq!(datasets[1].background_color, SLOW_COLOR);
        assert_eq!(datasets[2].background_color, FAST_COLOR);
        assert_eq!(datasets[3].background_color, SLOW_COLOR);
    }

    #[test]
    fn test_trunc_keeps_short_lines() {
        assert_eq!(trunc("short"), "short");
    }

    #[test]
    fn test_trunc_caps_long_lines() {
        let long: String = "x".repeat(150);
        let truncated = trunc(&long);
        assert_eq!(truncated.chars().count(), 100);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_render_page_structure() {
        let page = render_page(&fixture());
        assert!(page.contains("<!DOCTYPE HTML>"));
        assert!(page.contains("<canvas id=\"blockChart\"></canvas>"));
        assert!(page.contains("groupableBar"));
        assert!(page.contains("\"test1\""));
        // y-axis max: latest end is 18, padded by 2%
        assert!(page.contains("max: 18,"));
    }

    #[test]
    fn test_render_page_empty() {
        let page = render_page(&[]);
        assert!(page.contains("datasets: [  ]"));
        assert!(page.contains("max: 0,"));
    }
}
