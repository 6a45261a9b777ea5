mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dscr::DscrArgs;
use commands::rate_sheet::RateSheetArgs;
use commands::transitional::{BridgeArgs, ConstructionArgs, FixFlipArgs};

/// Price and size investor real-estate loans
#[derive(Parser)]
#[command(
    name = "loan-pricer",
    version,
    about = "Price and size investor real-estate loans",
    long_about = "A CLI for quoting DSCR rental, fix & flip, bridge and ground-up \
                  construction loans with decimal precision. Rates, leverage limits and \
                  funded amounts come from an injectable rate sheet."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Rate sheet to price with (.json, .yaml or .yml); defaults to the current epoch
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a DSCR rental loan
    Dscr(DscrArgs),
    /// Size and quote a fix & flip loan
    FixFlip(FixFlipArgs),
    /// Quote a bridge loan
    Bridge(BridgeArgs),
    /// Size and quote a ground-up construction loan
    Construction(ConstructionArgs),
    /// Print the active rate sheet
    RateSheet(RateSheetArgs),
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dscr(args) => commands::dscr::run_dscr(args, &config),
        Commands::FixFlip(args) => commands::transitional::run_fix_flip(args, &config),
        Commands::Bridge(args) => commands::transitional::run_bridge(args, &config),
        Commands::Construction(args) => commands::transitional::run_construction(args, &config),
        Commands::RateSheet(args) => commands::rate_sheet::run_rate_sheet(args, &config),
        Commands::Version => {
            println!("loan-pricer {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            // A rejected scenario still prints its envelope
            if value.get("valid").and_then(|v| v.as_bool()) == Some(false) {
                process::exit(1);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
