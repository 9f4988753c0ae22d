//! Event Timeline CLI Application
//!
//! Command-line front end for the event-timeline library:
//! - Loads a scenario file (channels, events, display options)
//! - Prints the channel summary and the reconciled table
//! - Optionally dumps the lane plot as JSON draw commands

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

mod config;
mod report;

/// Event Timeline - Normalize and plot channel event logs
#[derive(Parser, Debug)]
#[command(name = "event-timeline-cli")]
#[command(about = "Normalize and plot channel event logs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the scenario file (scenario.toml)
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Emit the lane plot as JSON draw commands instead of the text report
    #[arg(short, long)]
    draw: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Event Timeline CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using event-timeline library v{}", event_timeline::VERSION);

    log::info!("Loading scenario from: {:?}", args.scenario);
    let scenario = config::load_scenario(&args.scenario)?;
    let store = scenario.build_store()?;
    log::debug!("Scenario loaded successfully");

    let output = if args.draw {
        report::draw_report(&store, &scenario)?
    } else {
        report::text_report(&store)
    };

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Level implied by `-q` / `-v` flags
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    use log::LevelFilter;

    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Route `log` records to stderr; `RUST_LOG` refines the flag level per module
fn init_logging(verbose: u8, quiet: bool) {
    use std::io::Write;

    env_logger::Builder::new()
        .filter_level(log_level(verbose, quiet))
        .parse_default_env()
        .format(|buf, record| {
            let target = record.target().trim_start_matches("event_timeline::");
            writeln!(buf, "{:<5} {}: {}", record.level(), target, record.args())
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["event-timeline-cli", "-s", "demo.toml", "--draw", "-vv"]);
        assert_eq!(args.scenario, PathBuf::from("demo.toml"));
        assert!(args.draw);
        assert_eq!(args.verbose, 2);
        assert!(!args.quiet);
    }

    #[test]
    fn test_log_level_from_flags() {
        use log::LevelFilter;

        assert_eq!(log_level(0, false), LevelFilter::Warn);
        assert_eq!(log_level(2, false), LevelFilter::Debug);
        assert_eq!(log_level(7, false), LevelFilter::Trace);
        assert_eq!(log_level(3, true), LevelFilter::Error);
    }
}
