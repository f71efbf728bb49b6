//! The `rcv rut` command: verify and canonicalize RUT identifiers.

use anyhow::Result;
use rcvkit_core::{Rut, RutError};
use std::io::{self, Write};
use std::process::ExitCode;

/// Verify and canonicalize RUT identifiers.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// RUTs to verify, in any accepted spelling
    #[arg(value_name = "RUT", required = true)]
    pub values: Vec<String>,

    /// Print with thousands separators (96.874.030-K)
    #[arg(long)]
    pub dots: bool,
}

/// Parse a RUT, verify its check digit, and render it.
fn canonicalize(value: &str, dots: bool) -> Result<String, RutError> {
    let rut: Rut = value.parse()?;
    rut.verify()?;
    Ok(if dots {
        rut.format_with_dots()
    } else {
        rut.canonical()
    })
}

/// Run the rut command.
pub fn run(args: &Args) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    let mut failed = 0usize;
    for value in &args.values {
        match canonicalize(value, args.dots) {
            Ok(rendered) => writeln!(stdout, "{rendered}")?,
            Err(err) => {
                eprintln!("error: {value}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
