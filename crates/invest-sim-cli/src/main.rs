mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::AmortizeArgs;
use commands::region::RegionArgs;
use commands::risk::RankArgs;
use commands::simulate::SimulateArgs;
use commands::tables::TablesArgs;

/// Rental property investment simulation
#[derive(Parser)]
#[command(
    name = "invsim",
    version,
    about = "Rental property investment simulation",
    long_about = "Values a rental property the way a lender does (cost and income approaches), \
                  ranks the desired loan on a DSCR x LTV matrix, solves for the largest \
                  rank-A loan, and projects cash flow over 35 years. Amounts are in 万円."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter (e.g. "debug", "invest_sim_core=debug"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full investment simulation for one property
    Simulate(SimulateArgs),
    /// Classify an address into its appraisal region
    Region(RegionArgs),
    /// Amortisation schedule for a fixed-rate loan
    Amortize(AmortizeArgs),
    /// Look up the lending rank for a DSCR / LTV pair
    Rank(RankArgs),
    /// Print the default reference tables
    Tables(TablesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(cli.log_level.as_deref()) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Region(args) => commands::region::run_region(args),
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Rank(args) => commands::risk::run_rank(args),
        Commands::Tables(args) => match commands::tables::run_tables(args) {
            // YAML is written directly; there is nothing left to format.
            Ok(None) => return,
            Ok(Some(value)) => Ok(value),
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("invsim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Err(e) = output::format_output(&cli.output, &value) {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
