//! Segregation worker main executable

pub mod common;
pub mod err;
pub mod segregation;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Segregation and inheritance filter",
    long_about = "This tool classifies variants by their segregation in the family"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Segregation-related commands.
    Segregation(Segregation),
}

/// Parsing of "segregation *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Segregation {
    /// The sub command to run
    #[command(subcommand)]
    command: SegregationCommands,
}

/// Enum supporting the parsing of "segregation *" sub commands.
#[derive(Debug, Subcommand)]
enum SegregationCommands {
    Filter(segregation::cli::filter::Args),
    Results(segregation::cli::results::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Segregation(segregation) => match &segregation.command {
                SegregationCommands::Filter(args) => {
                    segregation::cli::filter::run(&cli.common, args)?;
                }
                SegregationCommands::Results(args) => {
                    segregation::cli::results::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
