//! `rcv`: command line tools for SII purchase/sales registries.

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod cmd;

/// Parse and validate SII "Registro de Compras y Ventas" exports.
#[derive(Parser, Debug)]
#[command(name = "rcv", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show verbose output including timing information
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one RCV export file
    Parse(cmd::parse::Args),
    /// Verify and canonicalize RUT identifiers
    Rut(cmd::rut::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match &cli.command {
        Command::Parse(args) => cmd::parse::run(args),
        Command::Rut(args) => cmd::rut::run(args),
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
