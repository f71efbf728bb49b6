//! The fixed RCV file dialect and the header contract.
//!
//! The SII export format is not configurable: `;` delimiter, `"` quote
//! character, no escape character, no doubled-quote escaping, CRLF
//! terminator, minimal quoting. The first line must equal the schema's
//! expected column tuple exactly, in order. Cells beyond the declared
//! column count are kept in a per-row overflow bucket so column-count
//! drift is observable without aborting a stream in progress.

use csv::{ReaderBuilder, StringRecord, Terminator};
use std::collections::BTreeMap;
use std::io::Read;

use crate::error::FatalError;

/// Field delimiter of the RCV dialect.
pub const DELIMITER: u8 = b';';

/// Quote character of the RCV dialect.
pub const QUOTE: u8 = b'"';

/// Build a CSV reader configured for the RCV dialect.
///
/// Flexible mode is on: records with a drifting column count reach the
/// row layer (and its overflow bucket) instead of erroring out.
pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .double_quote(false)
        .escape(None)
        .terminator(Terminator::CRLF)
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

/// Verify the file header against the expected ordered tuple.
///
/// Order matters, not just membership; any mismatch carries both the
/// expected and the actual sequences as diagnostic payload.
pub fn check_header(actual: &StringRecord, expected: &[&str]) -> Result<(), FatalError> {
    let matches = actual.len() == expected.len()
        && actual.iter().zip(expected).all(|(a, e)| a == *e);
    if matches {
        Ok(())
    } else {
        Err(FatalError::HeaderMismatch {
            expected: expected.iter().map(ToString::to_string).collect(),
            actual: actual.iter().map(ToString::to_string).collect(),
        })
    }
}

/// One raw row: column name to raw cell, plus overflow cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Raw cell per declared column present in the row.
    pub fields: BTreeMap<String, String>,
    /// Cells beyond the declared column count, in file order.
    pub overflow: Vec<String>,
}

impl RawRow {
    /// Pair a record's cells with the declared columns.
    ///
    /// Missing trailing cells leave their columns absent from the map;
    /// extra cells land in the overflow bucket.
    #[must_use]
    pub fn from_record(record: &StringRecord, columns: &[&str]) -> Self {
        let mut fields = BTreeMap::new();
        let mut overflow = Vec::new();
        for (i, cell) in record.iter().enumerate() {
            match columns.get(i) {
                Some(column) => {
                    fields.insert((*column).to_string(), cell.to_string());
                }
                None => overflow.push(cell.to_string()),
            }
        }
        Self { fields, overflow }
    }

    /// The raw cell for a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_splits_on_semicolons() {
        let data = "A;B;C\r\n1;2;3\r\n";
        let mut rdr = reader(data.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers, StringRecord::from(vec!["A", "B", "C"]));
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(row, StringRecord::from(vec!["1", "2", "3"]));
    }

    #[test]
    fn test_reader_quotes_without_doubling() {
        let data = "A;B\r\n\"x;y\";2\r\n";
        let mut rdr = reader(data.as_bytes());
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(row.get(0), Some("x;y"));
    }

    #[test]
    fn test_check_header_exact_order() {
        let expected = ["A", "B", "C"];
        assert!(check_header(&StringRecord::from(vec!["A", "B", "C"]), &expected).is_ok());

        // Same set, wrong order
        let err =
            check_header(&StringRecord::from(vec!["B", "A", "C"]), &expected).unwrap_err();
        match err {
            FatalError::HeaderMismatch { expected, actual } => {
                assert_eq!(expected, vec!["A", "B", "C"]);
                assert_eq!(actual, vec!["B", "A", "C"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Missing column
        assert!(check_header(&StringRecord::from(vec!["A", "B"]), &expected).is_err());
        // Extra column
        assert!(
            check_header(&StringRecord::from(vec!["A", "B", "C", "D"]), &expected).is_err()
        );
    }

    #[test]
    fn test_raw_row_overflow_bucket() {
        let record = StringRecord::from(vec!["1", "2", "3", "extra", "more"]);
        let raw = RawRow::from_record(&record, &["A", "B", "C"]);
        assert_eq!(raw.get("A"), Some("1"));
        assert_eq!(raw.get("C"), Some("3"));
        assert_eq!(raw.overflow, vec!["extra".to_string(), "more".to_string()]);
    }

    #[test]
    fn test_raw_row_short_record() {
        let record = StringRecord::from(vec!["1"]);
        let raw = RawRow::from_record(&record, &["A", "B"]);
        assert_eq!(raw.get("A"), Some("1"));
        assert_eq!(raw.get("B"), None);
        assert!(raw.overflow.is_empty());
    }
}
