mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::affordability::{AffordabilityArgs, MaxPrincipalArgs};
use commands::amortization::{PaymentArgs, ScheduleArgs};
use commands::comparison::{CompareOffersArgs, ScenarioDeltaArgs};

/// Loan amortization, offer comparison and affordability checks
#[derive(Parser)]
#[command(
    name = "loan",
    version,
    about = "Loan amortization, offer comparison and affordability checks",
    long_about = "A CLI for fixed-payment loan calculations with decimal precision. \
                  Computes periodic payments and full amortization schedules, ranks \
                  competing loan offers, and checks affordability against income."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the fixed periodic payment for a loan
    Payment(PaymentArgs),
    /// Build the full amortization schedule for a loan
    Schedule(ScheduleArgs),
    /// Compare competing loan offers
    CompareOffers(CompareOffersArgs),
    /// Check a payment against a debt-to-income threshold
    Affordability(AffordabilityArgs),
    /// Largest principal an income can support
    MaxPrincipal(MaxPrincipalArgs),
    /// Savings from switching between two loan scenarios
    ScenarioDelta(ScenarioDeltaArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("loan_engine_core=debug,loan_engine_cli=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::CompareOffers(args) => commands::comparison::run_compare_offers(args),
        Commands::Affordability(args) => commands::affordability::run_affordability(args),
        Commands::MaxPrincipal(args) => commands::affordability::run_max_principal(args),
        Commands::ScenarioDelta(args) => commands::comparison::run_scenario_delta(args),
        Commands::Version => {
            println!("loan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
