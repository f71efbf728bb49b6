//! The `rcv parse` command.
//!
//! Streams one RCV export file and emits one line per data row: either
//! JSON (default, for tooling) or a short text summary. Rows with
//! validation errors are reported and skipped; the stream keeps going.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rcvkit_core::{LedgerEntry, LedgerKind, PurchaseStatus, Rut};
use rcvkit_parser::{parse_rcv_path, ParseOptions, ParsedRow};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Which registry the file belongs to.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Sales registry (registro de ventas)
    Ventas,
    /// Purchases registry (registro de compras)
    Compras,
}

impl From<KindArg> for LedgerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ventas => Self::Sales,
            KindArg::Compras => Self::Purchases,
        }
    }
}

/// Accounting status of a purchases export.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    /// REGISTRO: accepted into the registry
    Registro,
    /// NO_INCLUIR: excluded from the registry
    NoIncluir,
    /// RECLAMADO: claimed by the receiver
    Reclamado,
    /// PENDIENTE: pending receiver action
    Pendiente,
}

impl From<StatusArg> for PurchaseStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Registro => Self::Registered,
            StatusArg::NoIncluir => Self::Excluded,
            StatusArg::Reclamado => Self::Claimed,
            StatusArg::Pendiente => Self::Pending,
        }
    }
}

/// Output format for parsed rows.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per row (default)
    #[default]
    Json,
    /// Human-readable text output
    Text,
}

/// Parse one RCV export file.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// The export file to parse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Which registry the file belongs to
    #[arg(long, short = 'k', value_enum)]
    pub kind: KindArg,

    /// Accounting status, required for purchase files
    #[arg(long, short = 's', value_enum)]
    pub status: Option<StatusArg>,

    /// RUT of the registry owner, e.g. 76354771-K
    #[arg(long, value_name = "RUT")]
    pub owner: String,

    /// Skip this many leading data rows
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub offset: usize,

    /// Abort after this many data rows
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Suppress the trailing summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (json or text)
    #[arg(long, short = 'f', value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// One output line of `rcv parse --format json`.
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    /// 1-based row index over the data rows.
    index: usize,
    /// The assembled entry, absent when the row failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<&'a LedgerEntry>,
    /// Field-level validation messages.
    validation: &'a BTreeMap<String, Vec<String>>,
    /// Assembly failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    conversion: Option<&'a str>,
}

impl<'a> From<&'a ParsedRow> for JsonRow<'a> {
    fn from(row: &'a ParsedRow) -> Self {
        Self {
            index: row.index,
            entry: row.entry.as_ref(),
            validation: &row.errors.validation,
            conversion: row.errors.conversion.as_deref(),
        }
    }
}

fn write_text(stdout: &mut impl Write, row: &ParsedRow) -> Result<()> {
    if let Some(entry) = &row.entry {
        let core = entry.core();
        writeln!(
            stdout,
            "row {}: DTE {} folio {} issuer {} total {}",
            row.index,
            core.dte_kind,
            core.folio,
            core.issuer.canonical(),
            core.total_amount
        )?;
        return Ok(());
    }
    if let Some(conversion) = &row.errors.conversion {
        writeln!(stdout, "row {}: conversion error: {conversion}", row.index)?;
    }
    for (field, messages) in &row.errors.validation {
        for message in messages {
            writeln!(stdout, "row {}: {field}: {message}", row.index)?;
        }
    }
    Ok(())
}

/// Run the parse command.
pub fn run(args: &Args) -> Result<ExitCode> {
    let owner: Rut = args
        .owner
        .parse()
        .with_context(|| format!("invalid owner RUT '{}'", args.owner))?;
    let options = ParseOptions {
        offset: args.offset,
        max_rows: args.max_rows,
    };

    let start = std::time::Instant::now();
    let stream = parse_rcv_path(
        &args.file,
        args.kind.into(),
        args.status.map(Into::into),
        owner,
        options,
    )
    .with_context(|| format!("failed to open {}", args.file.display()))?;
    debug!(
        kind = %stream.schema().kind,
        status = ?stream.schema().status,
        "header verified"
    );

    let mut stdout = io::stdout().lock();
    let mut total = 0usize;
    let mut failed = 0usize;
    for result in stream {
        let row =
            result.with_context(|| format!("aborted while reading {}", args.file.display()))?;
        total += 1;
        if !row.errors.is_empty() {
            failed += 1;
        }
        match args.format {
            OutputFormat::Json => {
                writeln!(stdout, "{}", serde_json::to_string(&JsonRow::from(&row))?)?;
            }
            OutputFormat::Text => write_text(&mut stdout, &row)?,
        }
    }

    debug!(
        total,
        failed,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "finished"
    );
    if !args.quiet {
        eprintln!("parsed {total} rows ({failed} with errors)");
    }

    if failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(LedgerKind::from(KindArg::Ventas), LedgerKind::Sales);
        assert_eq!(LedgerKind::from(KindArg::Compras), LedgerKind::Purchases);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PurchaseStatus::from(StatusArg::Registro),
            PurchaseStatus::Registered
        );
        assert_eq!(
            PurchaseStatus::from(StatusArg::NoIncluir),
            PurchaseStatus::Excluded
        );
        assert_eq!(
            PurchaseStatus::from(StatusArg::Reclamado),
            PurchaseStatus::Claimed
        );
        assert_eq!(
            PurchaseStatus::from(StatusArg::Pendiente),
            PurchaseStatus::Pending
        );
    }
}
