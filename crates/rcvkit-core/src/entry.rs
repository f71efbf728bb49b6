//! Typed RCV ledger entries.
//!
//! One validated row of a purchase/sales registry becomes a
//! [`LedgerEntry`]: either a [`SaleEntry`] or a [`PurchaseEntry`]. The
//! shared [`EntryCore`] enforces the row-level invariants at
//! construction time: folio range, total-amount sign by document
//! type, and zone identity of every timestamp. Entries are immutable
//! values once built.
//!
//! The accounting status exists only on the purchase side: a
//! [`SaleEntry`] has no status field at all, so "status on a sales
//! entry" is unrepresentable rather than merely invalid.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::dte::DteKind;
use crate::rut::Rut;
use crate::tz::{verify_zone, TzError, CANONICAL_TZ};

/// Exclusive upper bound for folio numbers (10^10).
pub const MAX_FOLIO: i64 = 10_000_000_000;

/// The two registry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Sales registry ("registro de ventas").
    Sales,
    /// Purchases registry ("registro de compras").
    Purchases,
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "ventas"),
            Self::Purchases => write!(f, "compras"),
        }
    }
}

/// Accounting status of a purchase entry.
///
/// Sub-classification the SII applies to the purchases registry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PurchaseStatus {
    /// `REGISTRO`: accepted into the registry.
    #[serde(rename = "REGISTRO")]
    Registered,
    /// `NO_INCLUIR`: excluded from the registry.
    #[serde(rename = "NO_INCLUIR")]
    Excluded,
    /// `RECLAMADO`: claimed by the receiver.
    #[serde(rename = "RECLAMADO")]
    Claimed,
    /// `PENDIENTE`: pending receiver action.
    #[serde(rename = "PENDIENTE")]
    Pending,
}

impl PurchaseStatus {
    /// The SII wire code for this status.
    #[must_use]
    pub const fn wire_code(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTRO",
            Self::Excluded => "NO_INCLUIR",
            Self::Claimed => "RECLAMADO",
            Self::Pending => "PENDIENTE",
        }
    }

    /// Resolve an SII wire code.
    #[must_use]
    pub fn from_wire_code(code: &str) -> Option<Self> {
        match code {
            "REGISTRO" => Some(Self::Registered),
            "NO_INCLUIR" => Some(Self::Excluded),
            "RECLAMADO" => Some(Self::Claimed),
            "PENDIENTE" => Some(Self::Pending),
            _ => None,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_code())
    }
}

/// Errors from entry construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The folio is outside `[1, 10^10)`.
    #[error("folio {0} outside [1, 10^10)")]
    FolioOutOfRange(i64),
    /// A timestamp does not carry the canonical zone.
    #[error("{field}: {source}")]
    Zone {
        /// Which timestamp field failed the check.
        field: &'static str,
        /// The underlying zone error.
        source: TzError,
    },
    /// A negative total on a document type that forbids it.
    #[error("negative total {total} not allowed for DTE type {kind}")]
    NegativeTotal {
        /// The document type of the entry.
        kind: DteKind,
        /// The offending total amount.
        total: Decimal,
    },
}

/// Fields common to every registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCore {
    /// RUT of the document issuer.
    pub issuer: Rut,
    /// Document type.
    pub dte_kind: DteKind,
    /// Sequential document number assigned by the issuer.
    pub folio: i64,
    /// Date the document was issued.
    pub issue_date: NaiveDate,
    /// RUT of the counterparty (receiver for sales, owner for purchases).
    pub counterparty: Rut,
    /// Total document amount.
    pub total_amount: Decimal,
    /// When the SII received the document, in the canonical zone.
    pub received_at: DateTime<Tz>,
}

impl EntryCore {
    /// Build the common fields, enforcing the row-level invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        issuer: Rut,
        dte_kind: DteKind,
        folio: i64,
        issue_date: NaiveDate,
        counterparty: Rut,
        total_amount: Decimal,
        received_at: DateTime<Tz>,
    ) -> Result<Self, EntryError> {
        if !(1..MAX_FOLIO).contains(&folio) {
            return Err(EntryError::FolioOutOfRange(folio));
        }
        check_zone("received_at", &received_at)?;
        if total_amount.is_sign_negative() && !total_amount.is_zero() && !dte_kind.is_credit_note()
        {
            return Err(EntryError::NegativeTotal {
                kind: dte_kind,
                total: total_amount,
            });
        }
        Ok(Self {
            issuer,
            dte_kind,
            folio,
            issue_date,
            counterparty,
            total_amount,
            received_at,
        })
    }
}

fn check_zone(field: &'static str, dt: &DateTime<Tz>) -> Result<(), EntryError> {
    verify_zone(dt, CANONICAL_TZ).map_err(|source| EntryError::Zone { field, source })
}

/// One row of the sales registry.
///
/// Structurally statusless: the accounting-status axis does not exist
/// for sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleEntry {
    /// The shared row fields.
    #[serde(flatten)]
    pub core: EntryCore,
    /// Legal name of the client, as reported.
    pub counterparty_name: Option<String>,
    /// Coded sale category ("tipo venta").
    pub category_code: Option<i64>,
}

impl SaleEntry {
    /// Build a sales entry.
    #[must_use]
    pub const fn new(core: EntryCore) -> Self {
        Self {
            core,
            counterparty_name: None,
            category_code: None,
        }
    }

    /// Set the counterparty legal name.
    #[must_use]
    pub fn with_counterparty_name(mut self, name: impl Into<String>) -> Self {
        self.counterparty_name = Some(name.into());
        self
    }

    /// Set the coded sale category.
    #[must_use]
    pub const fn with_category_code(mut self, code: i64) -> Self {
        self.category_code = Some(code);
        self
    }
}

/// One row of the purchases registry, in one of the four accounting
/// statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseEntry {
    /// The shared row fields.
    #[serde(flatten)]
    pub core: EntryCore,
    /// Accounting status of this row.
    pub status: PurchaseStatus,
    /// Legal name of the supplier, as reported.
    pub counterparty_name: Option<String>,
    /// Coded purchase category ("tipo compra").
    pub category_code: Option<i64>,
    /// Exempt amount.
    pub exempt_amount: Option<Decimal>,
    /// Net amount.
    pub net_amount: Option<Decimal>,
    /// Recoverable VAT amount.
    pub recoverable_vat: Option<Decimal>,
    /// Non-recoverable VAT amount.
    pub nonrecoverable_vat: Option<Decimal>,
    /// Code qualifying the non-recoverable VAT.
    pub nonrecoverable_vat_code: Option<i64>,
    /// Tobacco tax sub-amount: cigars.
    pub tobacco_cigars: Option<Decimal>,
    /// Tobacco tax sub-amount: cigarettes.
    pub tobacco_cigarettes: Option<Decimal>,
    /// Tobacco tax sub-amount: processed tobacco.
    pub tobacco_processed: Option<Decimal>,
    /// Code of an additional tax, if any.
    pub other_tax_code: Option<i64>,
    /// Amount of the additional tax.
    pub other_tax_amount: Option<Decimal>,
    /// Rate of the additional tax, percent.
    pub other_tax_rate: Option<Decimal>,
    /// When the receiver acknowledged the document.
    pub acknowledged_at: Option<DateTime<Tz>>,
    /// When the receiver claimed the document.
    pub claimed_at: Option<DateTime<Tz>>,
    /// Document type of a referenced document.
    pub reference_dte_kind: Option<DteKind>,
    /// Folio of a referenced document.
    pub reference_folio: Option<i64>,
}

impl PurchaseEntry {
    /// Build a purchase entry with all optional fields unset.
    #[must_use]
    pub const fn new(core: EntryCore, status: PurchaseStatus) -> Self {
        Self {
            core,
            status,
            counterparty_name: None,
            category_code: None,
            exempt_amount: None,
            net_amount: None,
            recoverable_vat: None,
            nonrecoverable_vat: None,
            nonrecoverable_vat_code: None,
            tobacco_cigars: None,
            tobacco_cigarettes: None,
            tobacco_processed: None,
            other_tax_code: None,
            other_tax_amount: None,
            other_tax_rate: None,
            acknowledged_at: None,
            claimed_at: None,
            reference_dte_kind: None,
            reference_folio: None,
        }
    }

    /// Set the counterparty legal name.
    #[must_use]
    pub fn with_counterparty_name(mut self, name: impl Into<String>) -> Self {
        self.counterparty_name = Some(name.into());
        self
    }

    /// Set the acknowledgement timestamp, checking its zone identity.
    pub fn with_acknowledged_at(mut self, at: DateTime<Tz>) -> Result<Self, EntryError> {
        check_zone("acknowledged_at", &at)?;
        self.acknowledged_at = Some(at);
        Ok(self)
    }

    /// Set the claim timestamp, checking its zone identity.
    pub fn with_claimed_at(mut self, at: DateTime<Tz>) -> Result<Self, EntryError> {
        check_zone("claimed_at", &at)?;
        self.claimed_at = Some(at);
        Ok(self)
    }
}

/// A validated registry row of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "ledger_kind", rename_all = "lowercase")]
pub enum LedgerEntry {
    /// A sales registry row.
    #[serde(rename = "ventas")]
    Sale(SaleEntry),
    /// A purchases registry row.
    #[serde(rename = "compras")]
    Purchase(PurchaseEntry),
}

impl LedgerEntry {
    /// The shared row fields.
    #[must_use]
    pub const fn core(&self) -> &EntryCore {
        match self {
            Self::Sale(e) => &e.core,
            Self::Purchase(e) => &e.core,
        }
    }

    /// Which registry this row belongs to.
    #[must_use]
    pub const fn kind(&self) -> LedgerKind {
        match self {
            Self::Sale(_) => LedgerKind::Sales,
            Self::Purchase(_) => LedgerKind::Purchases,
        }
    }

    /// The accounting status, present only for purchases.
    #[must_use]
    pub const fn status(&self) -> Option<PurchaseStatus> {
        match self {
            Self::Sale(_) => None,
            Self::Purchase(e) => Some(e.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::attach_zone;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn received() -> DateTime<Tz> {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        attach_zone(naive, CANONICAL_TZ).unwrap()
    }

    fn core_with_folio(folio: i64) -> Result<EntryCore, EntryError> {
        EntryCore::new(
            "76354771-K".parse().unwrap(),
            DteKind::FacturaElectronica,
            folio,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            "96874030-K".parse().unwrap(),
            dec!(119000),
            received(),
        )
    }

    #[test]
    fn test_folio_bounds() {
        assert!(core_with_folio(1).is_ok());
        assert!(core_with_folio(MAX_FOLIO - 1).is_ok());
        assert_eq!(
            core_with_folio(0),
            Err(EntryError::FolioOutOfRange(0))
        );
        assert_eq!(
            core_with_folio(MAX_FOLIO),
            Err(EntryError::FolioOutOfRange(MAX_FOLIO))
        );
        assert_eq!(
            core_with_folio(-7),
            Err(EntryError::FolioOutOfRange(-7))
        );
    }

    #[test]
    fn test_received_at_must_be_canonical_zone() {
        let utc = received().with_timezone(&chrono_tz::UTC);
        let err = EntryCore::new(
            "76354771-K".parse().unwrap(),
            DteKind::FacturaElectronica,
            1,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            "96874030-K".parse().unwrap(),
            dec!(119000),
            utc,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EntryError::Zone {
                field: "received_at",
                ..
            }
        ));
    }

    #[test]
    fn test_total_sign_rule_by_dte_kind() {
        let make = |kind, total| {
            EntryCore::new(
                "76354771-K".parse().unwrap(),
                kind,
                1,
                NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
                "96874030-K".parse().unwrap(),
                total,
                received(),
            )
        };

        // Credit notes may be negative; everything else must not be.
        assert!(make(DteKind::NotaCreditoElectronica, dec!(-5000)).is_ok());
        assert!(make(DteKind::FacturaElectronica, dec!(-5000)).is_err());
        assert!(make(DteKind::FacturaElectronica, dec!(0)).is_ok());
        assert!(make(DteKind::NotaDebitoElectronica, dec!(5000)).is_ok());
    }

    #[test]
    fn test_optional_timestamps_zone_checked() {
        let core = core_with_folio(1).unwrap();
        let entry = PurchaseEntry::new(core.clone(), PurchaseStatus::Registered);
        assert!(entry.clone().with_acknowledged_at(received()).is_ok());

        let utc = received().with_timezone(&chrono_tz::UTC);
        let err = entry.with_acknowledged_at(utc).unwrap_err();
        assert!(matches!(
            err,
            EntryError::Zone {
                field: "acknowledged_at",
                ..
            }
        ));

        let entry = PurchaseEntry::new(core, PurchaseStatus::Claimed);
        let utc = received().with_timezone(&chrono_tz::UTC);
        assert!(entry.with_claimed_at(utc).is_err());
    }

    #[test]
    fn test_status_only_on_purchases() {
        let sale = LedgerEntry::Sale(SaleEntry::new(core_with_folio(1).unwrap()));
        assert_eq!(sale.status(), None);
        assert_eq!(sale.kind(), LedgerKind::Sales);

        let purchase = LedgerEntry::Purchase(PurchaseEntry::new(
            core_with_folio(2).unwrap(),
            PurchaseStatus::Pending,
        ));
        assert_eq!(purchase.status(), Some(PurchaseStatus::Pending));
        assert_eq!(purchase.kind(), LedgerKind::Purchases);
    }

    #[test]
    fn test_wire_codes_round_trip() {
        for status in [
            PurchaseStatus::Registered,
            PurchaseStatus::Excluded,
            PurchaseStatus::Claimed,
            PurchaseStatus::Pending,
        ] {
            assert_eq!(
                PurchaseStatus::from_wire_code(status.wire_code()),
                Some(status)
            );
        }
        assert_eq!(PurchaseStatus::from_wire_code("OTRO"), None);
    }

    #[test]
    fn test_status_serializes_as_wire_code() {
        for status in [
            PurchaseStatus::Registered,
            PurchaseStatus::Excluded,
            PurchaseStatus::Claimed,
            PurchaseStatus::Pending,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.wire_code()));
        }
    }
}
