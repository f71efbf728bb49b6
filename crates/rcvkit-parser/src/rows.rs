//! The row deserialization iterator.
//!
//! A [`RowStream`] is a lazy, finite, single-pass sequence of
//! `Result<RowOutcome, FatalError>`. A row's coercion or validation
//! failure is never an `Err` item: it is captured in that row's error
//! bag and iteration continues. Only stream-scoped faults (structural
//! CSV errors, the row budget) terminate the sequence with an `Err`.

use rcvkit_core::Rut;
use std::io::Read;

use crate::dialect::{self, RawRow};
use crate::error::{FatalError, RowErrors};
use crate::schema::{CoercedRow, RowSchema};

/// Caller-supplied iteration options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Leading data rows to skip without coercing (e.g. for resuming).
    pub offset: usize,
    /// Maximum data rows to process, counted after the offset.
    ///
    /// Exceeding the budget aborts the iteration: it signals the
    /// caller's limit was violated, not a data defect.
    pub max_rows: Option<usize>,
}

/// The outcome of one data row.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    /// 1-based row index over the data rows, including skipped ones.
    pub index: usize,
    /// The raw column-to-cell mapping, after stripping.
    pub raw: RawRow,
    /// The coerced mapping; empty whenever `errors` is non-empty.
    pub coerced: CoercedRow,
    /// The row's error bag.
    pub errors: RowErrors,
}

/// Lazy iterator over the data rows of a header-validated stream.
pub struct RowStream<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    schema: &'static RowSchema,
    owner: Rut,
    options: ParseOptions,
    index: usize,
    done: bool,
}

impl<R: Read> RowStream<R> {
    /// Open a stream: reads the header line and verifies the contract
    /// before any row is available.
    pub fn new(
        input: R,
        schema: &'static RowSchema,
        owner: Rut,
        options: ParseOptions,
    ) -> Result<Self, FatalError> {
        let mut reader = dialect::reader(input);
        let headers = reader.headers().map_err(FatalError::stream)?;
        dialect::check_header(headers, schema.header)?;
        Ok(Self {
            records: reader.into_records(),
            schema,
            owner,
            options,
            index: 0,
            done: false,
        })
    }

    /// The schema this stream parses against.
    #[must_use]
    pub const fn schema(&self) -> &'static RowSchema {
        self.schema
    }

    fn process(&self, record: &csv::StringRecord) -> RowOutcome {
        let mut raw = RawRow::from_record(record, self.schema.header);
        for column in self.schema.strip_columns {
            raw.fields.remove(*column);
        }

        let work = self.schema.preprocess(&raw);
        let (mut coerced, mut errors) = self.schema.coerce_row(&work);
        if errors.is_empty() {
            self.schema.inject_owner(&mut coerced, self.owner);
            self.schema.postprocess(&mut coerced, &mut errors);
        }
        // A failed row yields raw data plus errors, nothing coerced.
        if !errors.is_empty() {
            coerced.clear();
        }

        RowOutcome {
            index: self.index,
            raw,
            coerced,
            errors,
        }
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<RowOutcome, FatalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(err) => {
                    self.done = true;
                    return Some(Err(FatalError::stream(err)));
                }
            };
            self.index += 1;

            if let Some(max) = self.options.max_rows {
                if self.index > max + self.options.offset {
                    self.done = true;
                    return Some(Err(FatalError::MaxRowsExceeded { limit: max }));
                }
            }
            if self.index <= self.options.offset {
                continue;
            }
            return Some(Ok(self.process(&record)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SALES;
    use rcvkit_core::LedgerKind;

    fn owner() -> Rut {
        "76354771-K".parse().unwrap()
    }

    fn sales_header() -> String {
        SALES.header.join(";")
    }

    fn sales_row(n: usize, folio: i64, date: &str) -> String {
        format!(
            "{n};33;Del Giro;96874030-K;COMERCIAL XYZ LTDA;{folio};{date};15/03/2024 10:30:00;;;0;100000;19000;119000"
        )
    }

    fn stream(content: &str, options: ParseOptions) -> Result<RowStream<&[u8]>, FatalError> {
        RowStream::new(content.as_bytes(), &SALES, owner(), options)
    }

    #[test]
    fn test_yields_coerced_rows() {
        let content = format!(
            "{}\r\n{}\r\n{}\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
            sales_row(2, 102, "15/03/2024"),
        );
        let rows: Vec<_> = stream(&content, ParseOptions::default())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[1].index, 2);
        assert!(rows[0].errors.is_empty());
        assert_eq!(rows[0].coerced["folio"].as_int(), Some(101));
        // Cosmetic row counter is stripped before coercion.
        assert_eq!(rows[0].raw.get("Nro"), None);
        // Owner RUT injected for the column the file does not carry.
        assert_eq!(
            rows[0].coerced["issuer"].as_rut().unwrap(),
            owner()
        );
    }

    #[test]
    fn test_row_isolation() {
        let mut lines = vec![sales_header()];
        for n in 1..=10 {
            let date = if n == 4 { "2024-03-14" } else { "14/03/2024" };
            lines.push(sales_row(n, 100 + n as i64, date));
        }
        let content = format!("{}\r\n", lines.join("\r\n"));

        let rows: Vec<_> = stream(&content, ParseOptions::default())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 10);
        for row in &rows {
            if row.index == 4 {
                assert!(!row.errors.is_empty());
                assert!(row.coerced.is_empty());
                assert!(row.errors.validation.contains_key("issue_date"));
            } else {
                assert!(row.errors.is_empty(), "row {} had errors", row.index);
                assert!(!row.coerced.is_empty());
            }
        }
    }

    #[test]
    fn test_header_mismatch_fails_before_rows() {
        let content = "Tipo Doc;Folio\r\n33;1\r\n";
        // The Ok side carries the reader, which has no Debug impl.
        let err = stream(content, ParseOptions::default()).err().unwrap();
        match err {
            FatalError::HeaderMismatch { actual, .. } => {
                assert_eq!(actual, vec!["Tipo Doc", "Folio"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(SALES.kind, LedgerKind::Sales);
    }

    #[test]
    fn test_offset_skips_rows() {
        let content = format!(
            "{}\r\n{}\r\n{}\r\n{}\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
            sales_row(2, 102, "14/03/2024"),
            sales_row(3, 103, "14/03/2024"),
        );
        let rows: Vec<_> = stream(
            &content,
            ParseOptions {
                offset: 2,
                max_rows: None,
            },
        )
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 3);
        assert_eq!(rows[0].coerced["folio"].as_int(), Some(103));
    }

    #[test]
    fn test_max_rows_budget_aborts() {
        let content = format!(
            "{}\r\n{}\r\n{}\r\n{}\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
            sales_row(2, 102, "14/03/2024"),
            sales_row(3, 103, "14/03/2024"),
        );
        let mut iter = stream(
            &content,
            ParseOptions {
                offset: 0,
                max_rows: Some(1),
            },
        )
        .unwrap();

        let first = iter.next().unwrap().unwrap();
        assert_eq!(first.index, 1);
        assert!(first.errors.is_empty());

        let err = iter.next().unwrap().unwrap_err();
        assert!(err.to_string().contains('1'));
        assert!(matches!(err, FatalError::MaxRowsExceeded { limit: 1 }));

        // Fused after the fatal error.
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_max_rows_counts_after_offset() {
        let content = format!(
            "{}\r\n{}\r\n{}\r\n{}\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
            sales_row(2, 102, "14/03/2024"),
            sales_row(3, 103, "14/03/2024"),
        );
        let results: Vec<_> = stream(
            &content,
            ParseOptions {
                offset: 2,
                max_rows: Some(1),
            },
        )
        .unwrap()
        .collect();
        // One yielded row, no budget violation: 2 skipped + 1 parsed.
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_overflow_cells_are_kept() {
        let content = format!(
            "{}\r\n{};EXTRA\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
        );
        let rows: Vec<_> = stream(&content, ParseOptions::default())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows[0].raw.overflow, vec!["EXTRA".to_string()]);
        assert!(rows[0].errors.is_empty());
    }

    #[test]
    fn test_structural_error_aborts() {
        // Invalid UTF-8 mid-stream is a structural fault, not row data.
        let mut bytes = format!(
            "{}\r\n{}\r\n",
            sales_header(),
            sales_row(1, 101, "14/03/2024"),
        )
        .into_bytes();
        bytes.extend_from_slice(b"2;33;\xff\xfe;bad\r\n");

        let mut iter =
            RowStream::new(bytes.as_slice(), &SALES, owner(), ParseOptions::default()).unwrap();
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next().unwrap().unwrap_err(),
            FatalError::Stream { .. }
        ));
        // Fused after the fatal error.
        assert!(iter.next().is_none());
    }
}
