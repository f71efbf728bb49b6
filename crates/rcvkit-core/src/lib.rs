//! Core types for rcvkit
//!
//! This crate provides the fundamental types used throughout the rcvkit
//! project:
//!
//! - [`Rut`] - The Chilean tax identifier, with modulo-11 verification
//! - [`TaxPeriod`] - A (year, month) reporting bucket
//! - [`DteKind`] - Electronic tax document type codes
//! - [`LedgerEntry`] - Validated purchase/sales registry rows
//! - [`attach_zone`] / [`verify_zone`] - Canonical-zone normalization
//!
//! # Example
//!
//! ```
//! use rcvkit_core::{attach_zone, Rut, CANONICAL_TZ};
//! use chrono::NaiveDate;
//!
//! let owner: Rut = "76.354.771-K".parse().unwrap();
//! assert_eq!(owner.canonical(), "76354771-K");
//! owner.verify().unwrap();
//!
//! let naive = NaiveDate::from_ymd_opt(2024, 3, 15)
//!     .unwrap()
//!     .and_hms_opt(10, 30, 0)
//!     .unwrap();
//! let received = attach_zone(naive, CANONICAL_TZ).unwrap();
//! assert_eq!(received.timezone(), CANONICAL_TZ);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dte;
pub mod entry;
pub mod period;
pub mod rut;
pub mod tz;

pub use dte::{DteKind, UnknownDteCode};
pub use entry::{
    EntryCore, EntryError, LedgerEntry, LedgerKind, PurchaseEntry, PurchaseStatus, SaleEntry,
    MAX_FOLIO,
};
pub use period::{PeriodError, TaxPeriod, MIN_PERIOD_YEAR};
pub use rut::{Rut, RutError, MAX_RUT_NUMBER};
pub use tz::{attach_zone, verify_zone, TzError, CANONICAL_TZ};

// Re-export commonly used external types
pub use chrono::{NaiveDate, NaiveDateTime};
pub use chrono_tz::Tz;
pub use rust_decimal::Decimal;
