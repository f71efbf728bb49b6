//! Declarative field coercion rules.
//!
//! Each schema declares one [`FieldSpec`] per output field: the source
//! column, a required/nullable contract, and a [`FieldRule`] naming the
//! converter. [`coerce`] is a pure function of the raw cell plus the
//! spec; the blank sentinel for optional numeric/date/identifier
//! columns is the empty (or whitespace-only) cell.

use chrono::{NaiveDate, NaiveDateTime};
use rcvkit_core::Rut;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::CoerceError;

/// The converter a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// A signed integer.
    Integer,
    /// A decimal monetary amount.
    Money,
    /// Free text, trimmed.
    Text,
    /// A RUT identifier.
    Rut,
    /// A date with an explicit strftime format.
    Date(&'static str),
    /// A date-time with an explicit strftime format.
    DateTime(&'static str),
}

/// Declaration of one output field of a row schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Output field name.
    pub name: &'static str,
    /// Source column name in the file header.
    pub column: &'static str,
    /// Whether the column must carry a value.
    pub required: bool,
    /// Whether a blank cell is legal and coerces to null.
    ///
    /// A field can be both required and nullable: the column must be
    /// present in the contract, but a blank cell is data, not an error.
    pub nullable: bool,
    /// The converter to run on non-blank cells.
    pub rule: FieldRule,
}

/// A coerced cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A blank optional cell.
    Null,
    /// An integer cell.
    Int(i64),
    /// A monetary cell.
    Money(Decimal),
    /// A text cell.
    Text(String),
    /// A RUT cell.
    Rut(Rut),
    /// A date cell.
    Date(NaiveDate),
    /// A naive timestamp cell, before zone attachment.
    DateTime(NaiveDateTime),
    /// A zone-aware timestamp, after post-processing.
    Zoned(chrono::DateTime<chrono_tz::Tz>),
}

impl FieldValue {
    /// True for the blank-cell value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer value, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The monetary value, if this is one.
    #[must_use]
    pub const fn as_money(&self) -> Option<Decimal> {
        match self {
            Self::Money(d) => Some(*d),
            _ => None,
        }
    }

    /// The text value, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The RUT value, if this is one.
    #[must_use]
    pub const fn as_rut(&self) -> Option<Rut> {
        match self {
            Self::Rut(r) => Some(*r),
            _ => None,
        }
    }

    /// The date value, if this is one.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The naive timestamp, if this is one.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The zone-aware timestamp, if this is one.
    #[must_use]
    pub const fn as_zoned(&self) -> Option<chrono::DateTime<chrono_tz::Tz>> {
        match self {
            Self::Zoned(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// Coerce one raw cell under a field spec.
///
/// `raw` is `None` when the column was absent from the row entirely;
/// that is treated like a blank cell.
pub fn coerce(spec: &FieldSpec, raw: Option<&str>) -> Result<FieldValue, CoerceError> {
    let cell = raw.map_or("", str::trim);

    if cell.is_empty() {
        return if spec.required && !spec.nullable {
            Err(CoerceError::MissingRequired)
        } else {
            Ok(FieldValue::Null)
        };
    }

    match spec.rule {
        FieldRule::Integer => cell
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| CoerceError::InvalidInteger(cell.to_string())),
        FieldRule::Money => Decimal::from_str(cell)
            .map(FieldValue::Money)
            .map_err(|_| CoerceError::InvalidAmount(cell.to_string())),
        FieldRule::Text => Ok(FieldValue::Text(cell.to_string())),
        FieldRule::Rut => Ok(FieldValue::Rut(Rut::parse(cell)?)),
        FieldRule::Date(format) => NaiveDate::parse_from_str(cell, format)
            .map(FieldValue::Date)
            .map_err(|_| CoerceError::InvalidDate {
                raw: cell.to_string(),
                format,
            }),
        FieldRule::DateTime(format) => NaiveDateTime::parse_from_str(cell, format)
            .map(FieldValue::DateTime)
            .map_err(|_| CoerceError::InvalidDateTime {
                raw: cell.to_string(),
                format,
            }),
    }
}
