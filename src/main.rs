use anyhow::Result;
use clap::Parser;
use lentitud::{analyzer, cli::Cli, parser};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Validate window size (a zero-capacity window cannot measure anything)
    if args.window_size < 1 {
        anyhow::bail!(
            "Invalid value for --window-size: {} (must be >= 1)",
            args.window_size
        );
    }

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    // Built-in ignore list plus anything passed on the command line
    let mut ignore: Vec<String> = parser::DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect();
    ignore.extend(args.ignore);

    let config = analyzer::AnalyzerConfig {
        window_size: args.window_size,
        threshold: args.threshold,
        count: args.count,
        ignore,
    };

    analyzer::run(&config, &args.file, &args.output, args.chart.as_deref())?;

    Ok(())
}
