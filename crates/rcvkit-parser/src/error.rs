//! Error taxonomy for the ingestion pipeline.
//!
//! Two disjoint classes:
//!
//! - [`FatalError`] - stream-scoped faults that terminate the whole
//!   iteration (header mismatch, malformed input, row budget, invalid
//!   kind/status combination, I/O).
//! - [`RowErrors`] - row-scoped faults captured as data on the yielded
//!   row; iteration continues past them.

use rcvkit_core::{LedgerKind, PurchaseStatus, RutError};
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;

/// A fault that aborts the whole iteration.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The file header does not equal the schema's expected tuple.
    #[error("header mismatch: expected {expected:?}, found {actual:?}")]
    HeaderMismatch {
        /// The ordered header the schema requires.
        expected: Vec<String>,
        /// The ordered header the file actually presented.
        actual: Vec<String>,
    },
    /// A structural error in the underlying character stream.
    #[error("malformed input at line {line}")]
    Stream {
        /// Line number where the stream broke.
        line: u64,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// More data rows than the caller's budget allows.
    #[error("row budget exceeded: more than {limit} data rows")]
    MaxRowsExceeded {
        /// The caller-supplied maximum row count.
        limit: usize,
    },
    /// A (kind, status) combination that names no schema.
    #[error("no schema for ledger kind '{kind}' with status {status:?}")]
    InvalidVariant {
        /// The requested ledger kind.
        kind: LedgerKind,
        /// The requested accounting status, if any.
        status: Option<PurchaseStatus>,
    },
    /// An I/O error opening or reading the input.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl FatalError {
    /// Wrap a CSV error, extracting the line it occurred on.
    #[must_use]
    pub fn stream(source: csv::Error) -> Self {
        let line = source.position().map_or(0, csv::Position::line);
        Self::Stream { line, source }
    }
}

/// A single cell-level coercion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// A required cell was empty or whitespace.
    #[error("missing required field")]
    MissingRequired,
    /// A cell that should hold an integer did not.
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),
    /// A cell that should hold a decimal amount did not.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    /// A date cell did not match the declared format.
    #[error("invalid date '{raw}' (expected format '{format}')")]
    InvalidDate {
        /// The raw cell contents.
        raw: String,
        /// The strftime format the schema declares.
        format: &'static str,
    },
    /// A timestamp cell did not match the declared format.
    #[error("invalid timestamp '{raw}' (expected format '{format}')")]
    InvalidDateTime {
        /// The raw cell contents.
        raw: String,
        /// The strftime format the schema declares.
        format: &'static str,
    },
    /// A RUT cell failed to parse or verify.
    #[error(transparent)]
    Rut(#[from] RutError),
}

/// The per-row error bag.
///
/// `validation` maps field names to human-readable messages from
/// coercion and cross-field checks; `conversion` carries an assembly
/// failure (coerced data that did not map onto the entry constructor),
/// which signals schema drift rather than bad input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowErrors {
    /// Field-level validation messages.
    pub validation: BTreeMap<String, Vec<String>>,
    /// Assembly/conversion failure, if any.
    pub conversion: Option<String>,
}

impl RowErrors {
    /// True when the row carried no errors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validation.is_empty() && self.conversion.is_none()
    }

    /// Record a validation message against a field.
    pub fn add_validation(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.validation
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Record an assembly/conversion failure.
    pub fn set_conversion(&mut self, message: impl Into<String>) {
        self.conversion = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_errors_empty() {
        let errors = RowErrors::default();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_row_errors_accumulate() {
        let mut errors = RowErrors::default();
        errors.add_validation("folio", "invalid integer 'abc'");
        errors.add_validation("folio", "missing required field");
        errors.add_validation("issue_date", "invalid date '99/99/9999'");
        assert!(!errors.is_empty());
        assert_eq!(errors.validation["folio"].len(), 2);
        assert_eq!(errors.validation.len(), 2);
    }

    #[test]
    fn test_conversion_error_is_separate() {
        let mut errors = RowErrors::default();
        errors.set_conversion("missing expected key 'total_amount'");
        assert!(!errors.is_empty());
        assert!(errors.validation.is_empty());
    }

    #[test]
    fn test_fatal_error_display() {
        let err = FatalError::MaxRowsExceeded { limit: 100 };
        assert_eq!(
            err.to_string(),
            "row budget exceeded: more than 100 data rows"
        );

        let err = FatalError::HeaderMismatch {
            expected: vec!["A".into(), "B".into()],
            actual: vec!["A".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("expected"));
        assert!(msg.contains("found"));
    }
}
