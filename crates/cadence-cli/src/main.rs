//! Cadence Command-Line Interface
//!
//! The main entry point for the `cadence` tool.
//!
//! ```text
//! cadence schedule -i circuit.json -p platform.yaml --direction alap
//! cadence inspect -i circuit.json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{inspect, schedule, version};

/// Cadence - commutation-aware scheduling of quantum circuits
#[derive(Parser)]
#[command(name = "cadence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a circuit, searching over orderings of commuting gates
    Schedule {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Platform description (YAML or JSON)
        #[arg(short, long)]
        platform: Option<String>,

        /// Output file (JSON); prints the schedule when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Scheduling direction (forward/asap, backward/alap)
        #[arg(short, long, default_value = "forward")]
        direction: String,

        /// Schedule in program order without the commutation search
        #[arg(long)]
        no_commute: bool,

        /// Evaluate at most this many variations
        #[arg(long)]
        limit: Option<u64>,

        /// Print the depth of every evaluated variation
        #[arg(long)]
        trace: bool,
    },

    /// Show the commuting sets of a circuit without scheduling it
    Inspect {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Schedule {
            input,
            platform,
            output,
            direction,
            no_commute,
            limit,
            trace,
        } => schedule::execute(&schedule::ScheduleOptions {
            input: &input,
            platform: platform.as_deref(),
            output: output.as_deref(),
            direction: &direction,
            commute: !no_commute,
            limit,
            trace,
        }),

        Commands::Inspect { input } => inspect::execute(&input),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schedule_minimal() {
        let cli = Cli::try_parse_from(["cadence", "schedule", "-i", "circuit.json"]).unwrap();
        match cli.command {
            Commands::Schedule {
                input,
                platform,
                direction,
                no_commute,
                limit,
                ..
            } => {
                assert_eq!(input, "circuit.json");
                assert_eq!(platform, None);
                assert_eq!(direction, "forward");
                assert!(!no_commute);
                assert_eq!(limit, None);
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_parse_schedule_all_args() {
        let cli = Cli::try_parse_from([
            "cadence",
            "-vv",
            "schedule",
            "-i",
            "circuit.json",
            "-p",
            "platform.yaml",
            "-o",
            "out.json",
            "--direction",
            "alap",
            "--no-commute",
            "--limit",
            "100",
            "--trace",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Schedule {
                platform,
                output,
                direction,
                no_commute,
                limit,
                trace,
                ..
            } => {
                assert_eq!(platform.as_deref(), Some("platform.yaml"));
                assert_eq!(output.as_deref(), Some("out.json"));
                assert_eq!(direction, "alap");
                assert!(no_commute);
                assert_eq!(limit, Some(100));
                assert!(trace);
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_parse_missing_input() {
        assert!(Cli::try_parse_from(["cadence", "schedule"]).is_err());
        assert!(Cli::try_parse_from(["cadence", "inspect"]).is_err());
    }

    #[test]
    fn test_parse_inspect_and_version() {
        let cli = Cli::try_parse_from(["cadence", "inspect", "-i", "c.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Inspect { input } if input == "c.json"));
        let cli = Cli::try_parse_from(["cadence", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }
}
