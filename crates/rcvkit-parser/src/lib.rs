//! RCV ingestion pipeline for rcvkit
//!
//! Parses the SII "Registro de Compras y Ventas" CSV exports into the
//! typed entries of `rcvkit-core`:
//!
//! - [`dialect`] - the fixed file dialect and the ordered header contract
//! - [`field`] - declarative per-column coercion rules
//! - [`rows`] - the lazy, row-isolating deserialization iterator
//! - [`schema`] - one schema per (ledger kind, accounting status), and
//!   entry assembly
//!
//! Row-scoped problems never abort the stream: every data row yields a
//! [`ParsedRow`] whose error bag records what went wrong, while
//! stream-scoped faults (bad header, malformed input, row budget)
//! surface as the iterator's terminal [`FatalError`].
//!
//! # Example
//!
//! ```
//! use rcvkit_parser::{parse_rcv, ParseOptions};
//! use rcvkit_core::{LedgerKind, PurchaseStatus};
//!
//! let content = "\
//! Nro;Tipo Doc;Tipo Venta;Rut cliente;Razon Social;Folio;Fecha Docto;\
//! Fecha Recepcion;Fecha Acuse Recibo;Fecha Reclamo;Monto Exento;Monto Neto;\
//! Monto IVA;Monto Total\r\n\
//! 1;33;Del Giro;96874030-K;COMERCIAL XYZ LTDA;170;14/03/2024;\
//! 15/03/2024 10:30:00;;;0;100000;19000;119000\r\n";
//!
//! let owner = "76354771-K".parse().unwrap();
//! let stream = parse_rcv(
//!     content.as_bytes(),
//!     LedgerKind::Sales,
//!     None,
//!     owner,
//!     ParseOptions::default(),
//! )
//! .unwrap();
//!
//! for result in stream {
//!     let row = result.unwrap();
//!     assert!(row.errors.is_empty());
//!     assert_eq!(row.entry.unwrap().core().folio, 170);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dialect;
pub mod error;
pub mod field;
pub mod rows;
pub mod schema;

use rcvkit_core::{LedgerEntry, LedgerKind, PurchaseStatus, Rut};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub use dialect::RawRow;
pub use error::{CoerceError, FatalError, RowErrors};
pub use field::{FieldRule, FieldSpec, FieldValue};
pub use rows::{ParseOptions, RowOutcome, RowStream};
pub use schema::{AssembleError, CoercedRow, RowSchema};

/// The final outcome of one data row: the assembled entry (when the
/// row was clean) alongside the raw data and the error bag.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    /// The assembled entry; `None` whenever `errors` is non-empty.
    pub entry: Option<LedgerEntry>,
    /// 1-based row index over the data rows.
    pub index: usize,
    /// The raw column-to-cell mapping.
    pub raw: RawRow,
    /// Validation and conversion errors for this row.
    pub errors: RowErrors,
}

/// Iterator over parsed registry rows.
///
/// Yields one item per data row; row-scoped failures are data on the
/// item, and only stream-scoped faults appear as `Err`.
pub struct RcvStream<R: Read> {
    rows: RowStream<R>,
}

impl<R: Read> RcvStream<R> {
    /// The schema this stream parses against.
    #[must_use]
    pub const fn schema(&self) -> &'static RowSchema {
        self.rows.schema()
    }
}

impl<R: Read> Iterator for RcvStream<R> {
    type Item = Result<ParsedRow, FatalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let outcome = match self.rows.next()? {
            Ok(outcome) => outcome,
            Err(err) => return Some(Err(err)),
        };

        let mut errors = outcome.errors;
        let entry = if errors.is_empty() {
            match self.rows.schema().assemble(&outcome.coerced) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    errors.set_conversion(err.to_string());
                    None
                }
            }
        } else {
            None
        };

        Some(Ok(ParsedRow {
            entry,
            index: outcome.index,
            raw: outcome.raw,
            errors,
        }))
    }
}

/// Parse an RCV export from a reader.
///
/// `kind` and `status` select the file variant; the combination is
/// validated before any input is read. `owner` is the RUT of the
/// registry owner, injected into the side of each row the file does
/// not carry.
pub fn parse_rcv<R: Read>(
    input: R,
    kind: LedgerKind,
    status: Option<PurchaseStatus>,
    owner: Rut,
    options: ParseOptions,
) -> Result<RcvStream<R>, FatalError> {
    let schema = RowSchema::for_file(kind, status)?;
    let rows = RowStream::new(input, schema, owner, options)?;
    Ok(RcvStream { rows })
}

/// Parse an RCV export from a file on disk.
pub fn parse_rcv_path(
    path: &Path,
    kind: LedgerKind,
    status: Option<PurchaseStatus>,
    owner: Rut,
    options: ParseOptions,
) -> Result<RcvStream<BufReader<File>>, FatalError> {
    let file = File::open(path)?;
    parse_rcv(BufReader::new(file), kind, status, owner, options)
}
