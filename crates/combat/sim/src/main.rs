//! Command-line driver for the combat engine.
//!
//! Loads combat definitions and scenario worlds from a content directory and
//! resolves a scenario's cast, printing the report.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{List, Run};

/// Combat resolution simulator
#[derive(Parser)]
#[command(name = "combat-sim")]
#[command(about = "Resolve combat scenarios from content files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// List combat definitions and scenarios
    List(List),

    /// Resolve one scenario and print the report
    Run(Run),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List(cmd) => cmd.execute(),
        Command::Run(cmd) => cmd.execute(),
    }
}
