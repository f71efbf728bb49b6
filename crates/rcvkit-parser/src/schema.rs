//! Row schemas per (ledger kind, accounting status), and entry assembly.
//!
//! Each schema is a data-driven table: the expected header tuple, the
//! cosmetic columns to strip, and one [`FieldSpec`] per output field,
//! plus ordered pre/post-processing steps (category-label mapping,
//! owner injection, zone attachment). There is no inheritance; the five
//! concrete schemas share field constants instead.
//!
//! Assembly transfers a fully coerced row into the concrete
//! [`LedgerEntry`] variant. A missing expected key at that stage means
//! the schema and the entry constructor drifted apart. That is an
//! [`AssembleError`], reported via the row's `conversion` slot, never
//! mixed with data-validation errors.

use rcvkit_core::{
    attach_zone, DteKind, EntryCore, LedgerEntry, LedgerKind, PurchaseEntry, PurchaseStatus, Rut,
    SaleEntry, CANONICAL_TZ,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::dialect::RawRow;
use crate::error::{FatalError, RowErrors};
use crate::field::{coerce, FieldRule, FieldSpec, FieldValue};

/// Date format used by RCV exports.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Timestamp format used by RCV exports.
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A coerced row, keyed by output field name.
pub type CoercedRow = BTreeMap<&'static str, FieldValue>;

/// Failure to map a coerced row onto an entry constructor.
///
/// These indicate schema/constructor drift or invariant violations
/// found at assembly time, not malformed cells.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// An output field the constructor expects is not in the row.
    #[error("missing expected key '{0}' (schema and entry out of sync)")]
    MissingKey(&'static str),
    /// A field coerced to a different shape than the constructor needs.
    #[error("field '{field}': expected {expected}")]
    WrongType {
        /// The output field name.
        field: &'static str,
        /// What the constructor needed.
        expected: &'static str,
    },
    /// A value that passed coercion but violates an entry invariant.
    #[error("field '{field}': {message}")]
    Invalid {
        /// The output field name.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

// Field specs shared across schemas. The column strings are the SII
// export header names, verbatim.

const DTE_KIND: FieldSpec = FieldSpec {
    name: "dte_kind",
    column: "Tipo Doc",
    required: true,
    nullable: false,
    rule: FieldRule::Integer,
};
const NAME: FieldSpec = FieldSpec {
    name: "counterparty_name",
    column: "Razon Social",
    required: false,
    nullable: true,
    rule: FieldRule::Text,
};
const FOLIO: FieldSpec = FieldSpec {
    name: "folio",
    column: "Folio",
    required: true,
    nullable: false,
    rule: FieldRule::Integer,
};
const ISSUE_DATE: FieldSpec = FieldSpec {
    name: "issue_date",
    column: "Fecha Docto",
    required: true,
    nullable: false,
    rule: FieldRule::Date(DATE_FORMAT),
};
const RECEIVED_AT: FieldSpec = FieldSpec {
    name: "received_at",
    column: "Fecha Recepcion",
    required: true,
    nullable: false,
    rule: FieldRule::DateTime(DATETIME_FORMAT),
};
const EXEMPT: FieldSpec = FieldSpec {
    name: "exempt_amount",
    column: "Monto Exento",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const NET: FieldSpec = FieldSpec {
    name: "net_amount",
    column: "Monto Neto",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const TOTAL: FieldSpec = FieldSpec {
    name: "total_amount",
    column: "Monto Total",
    required: true,
    nullable: false,
    rule: FieldRule::Money,
};

// Purchase-only specs.

const P_CATEGORY: FieldSpec = FieldSpec {
    name: "category_code",
    column: "Tipo Compra",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};
const P_ISSUER: FieldSpec = FieldSpec {
    name: "issuer",
    column: "RUT Proveedor",
    required: true,
    nullable: false,
    rule: FieldRule::Rut,
};
// Required-but-nullable: the column must be in the contract, but some
// document types ship it blank for unknown upstream reasons.
const P_ACK: FieldSpec = FieldSpec {
    name: "acknowledged_at",
    column: "Fecha Acuse",
    required: true,
    nullable: true,
    rule: FieldRule::DateTime(DATETIME_FORMAT),
};
const P_CLAIM: FieldSpec = FieldSpec {
    name: "claimed_at",
    column: "Fecha Reclamo",
    required: false,
    nullable: true,
    rule: FieldRule::DateTime(DATETIME_FORMAT),
};
const P_VAT_REC: FieldSpec = FieldSpec {
    name: "recoverable_vat",
    column: "Monto IVA Recuperable",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_VAT_NONREC: FieldSpec = FieldSpec {
    name: "nonrecoverable_vat",
    column: "Monto Iva No Recuperable",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_VAT_NONREC_CODE: FieldSpec = FieldSpec {
    name: "nonrecoverable_vat_code",
    column: "Codigo IVA No Rec.",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};
const P_TOB_CIGARS: FieldSpec = FieldSpec {
    name: "tobacco_cigars",
    column: "Tabacos Puros",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_TOB_CIGARETTES: FieldSpec = FieldSpec {
    name: "tobacco_cigarettes",
    column: "Tabacos Cigarrillos",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_TOB_PROCESSED: FieldSpec = FieldSpec {
    name: "tobacco_processed",
    column: "Tabacos Elaborados",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_OTHER_TAX_CODE: FieldSpec = FieldSpec {
    name: "other_tax_code",
    column: "Codigo Otro Impuesto",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};
const P_OTHER_TAX_AMOUNT: FieldSpec = FieldSpec {
    name: "other_tax_amount",
    column: "Valor Otro Impuesto",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_OTHER_TAX_RATE: FieldSpec = FieldSpec {
    name: "other_tax_rate",
    column: "Tasa Otro Impuesto",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};
const P_REF_KIND: FieldSpec = FieldSpec {
    name: "reference_dte_kind",
    column: "Tipo Docto. Referencia",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};
const P_REF_FOLIO: FieldSpec = FieldSpec {
    name: "reference_folio",
    column: "Folio Docto. Referencia",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};

// Sales-only specs.

const S_CATEGORY: FieldSpec = FieldSpec {
    name: "category_code",
    column: "Tipo Venta",
    required: false,
    nullable: true,
    rule: FieldRule::Integer,
};
const S_COUNTERPARTY: FieldSpec = FieldSpec {
    name: "counterparty",
    column: "Rut cliente",
    required: true,
    nullable: false,
    rule: FieldRule::Rut,
};
const S_ACK: FieldSpec = FieldSpec {
    name: "acknowledged_at",
    column: "Fecha Acuse Recibo",
    required: false,
    nullable: true,
    rule: FieldRule::DateTime(DATETIME_FORMAT),
};
const S_CLAIM: FieldSpec = FieldSpec {
    name: "claimed_at",
    column: "Fecha Reclamo",
    required: false,
    nullable: true,
    rule: FieldRule::DateTime(DATETIME_FORMAT),
};
const S_VAT: FieldSpec = FieldSpec {
    name: "vat_amount",
    column: "Monto IVA",
    required: false,
    nullable: true,
    rule: FieldRule::Money,
};

/// The schema for one (kind, status) file variant.
#[derive(Debug)]
pub struct RowSchema {
    /// Which registry this schema parses.
    pub kind: LedgerKind,
    /// The accounting status, present for purchase schemas only.
    pub status: Option<PurchaseStatus>,
    /// The exact ordered header tuple the file must present.
    pub header: &'static [&'static str],
    /// Cosmetic columns stripped from each row before coercion.
    pub strip_columns: &'static [&'static str],
    /// One spec per output field.
    pub fields: &'static [FieldSpec],
    /// The column holding a free-text category label, if any.
    pub category_column: Option<&'static str>,
    /// Output field injected from the caller-supplied owner RUT.
    pub owner_field: &'static str,
}

/// Sales registry schema.
pub static SALES: RowSchema = RowSchema {
    kind: LedgerKind::Sales,
    status: None,
    header: &[
        "Nro",
        "Tipo Doc",
        "Tipo Venta",
        "Rut cliente",
        "Razon Social",
        "Folio",
        "Fecha Docto",
        "Fecha Recepcion",
        "Fecha Acuse Recibo",
        "Fecha Reclamo",
        "Monto Exento",
        "Monto Neto",
        "Monto IVA",
        "Monto Total",
    ],
    strip_columns: &["Nro"],
    fields: &[
        DTE_KIND, S_CATEGORY, S_COUNTERPARTY, NAME, FOLIO, ISSUE_DATE, RECEIVED_AT, S_ACK,
        S_CLAIM, EXEMPT, NET, S_VAT, TOTAL,
    ],
    category_column: Some("Tipo Venta"),
    owner_field: "issuer",
};

/// Purchases registry schema, `REGISTRO` status.
pub static PURCHASE_REGISTERED: RowSchema = RowSchema {
    kind: LedgerKind::Purchases,
    status: Some(PurchaseStatus::Registered),
    header: PURCHASE_HEADER_WITH_ACK,
    strip_columns: &["Nro"],
    fields: PURCHASE_FIELDS_WITH_ACK,
    category_column: Some("Tipo Compra"),
    owner_field: "counterparty",
};

/// Purchases registry schema, `NO_INCLUIR` status.
pub static PURCHASE_EXCLUDED: RowSchema = RowSchema {
    kind: LedgerKind::Purchases,
    status: Some(PurchaseStatus::Excluded),
    header: PURCHASE_HEADER_WITH_ACK,
    strip_columns: &["Nro"],
    fields: PURCHASE_FIELDS_WITH_ACK,
    category_column: Some("Tipo Compra"),
    owner_field: "counterparty",
};

/// Purchases registry schema, `RECLAMADO` status.
pub static PURCHASE_CLAIMED: RowSchema = RowSchema {
    kind: LedgerKind::Purchases,
    status: Some(PurchaseStatus::Claimed),
    header: &[
        "Nro",
        "Tipo Doc",
        "Tipo Compra",
        "RUT Proveedor",
        "Razon Social",
        "Folio",
        "Fecha Docto",
        "Fecha Recepcion",
        "Fecha Reclamo",
        "Monto Exento",
        "Monto Neto",
        "Monto IVA Recuperable",
        "Monto Iva No Recuperable",
        "Codigo IVA No Rec.",
        "Monto Total",
        "Tabacos Puros",
        "Tabacos Cigarrillos",
        "Tabacos Elaborados",
        "Codigo Otro Impuesto",
        "Valor Otro Impuesto",
        "Tasa Otro Impuesto",
        "Tipo Docto. Referencia",
        "Folio Docto. Referencia",
    ],
    strip_columns: &["Nro"],
    fields: &[
        DTE_KIND,
        P_CATEGORY,
        P_ISSUER,
        NAME,
        FOLIO,
        ISSUE_DATE,
        RECEIVED_AT,
        P_CLAIM,
        EXEMPT,
        NET,
        P_VAT_REC,
        P_VAT_NONREC,
        P_VAT_NONREC_CODE,
        TOTAL,
        P_TOB_CIGARS,
        P_TOB_CIGARETTES,
        P_TOB_PROCESSED,
        P_OTHER_TAX_CODE,
        P_OTHER_TAX_AMOUNT,
        P_OTHER_TAX_RATE,
        P_REF_KIND,
        P_REF_FOLIO,
    ],
    category_column: Some("Tipo Compra"),
    owner_field: "counterparty",
};

/// Purchases registry schema, `PENDIENTE` status.
pub static PURCHASE_PENDING: RowSchema = RowSchema {
    kind: LedgerKind::Purchases,
    status: Some(PurchaseStatus::Pending),
    header: &[
        "Nro",
        "Tipo Doc",
        "Tipo Compra",
        "RUT Proveedor",
        "Razon Social",
        "Folio",
        "Fecha Docto",
        "Fecha Recepcion",
        "Monto Exento",
        "Monto Neto",
        "Monto IVA Recuperable",
        "Monto Iva No Recuperable",
        "Codigo IVA No Rec.",
        "Monto Total",
        "Tabacos Puros",
        "Tabacos Cigarrillos",
        "Tabacos Elaborados",
        "Codigo Otro Impuesto",
        "Valor Otro Impuesto",
        "Tasa Otro Impuesto",
        "Tipo Docto. Referencia",
        "Folio Docto. Referencia",
    ],
    strip_columns: &["Nro"],
    fields: &[
        DTE_KIND,
        P_CATEGORY,
        P_ISSUER,
        NAME,
        FOLIO,
        ISSUE_DATE,
        RECEIVED_AT,
        EXEMPT,
        NET,
        P_VAT_REC,
        P_VAT_NONREC,
        P_VAT_NONREC_CODE,
        TOTAL,
        P_TOB_CIGARS,
        P_TOB_CIGARETTES,
        P_TOB_PROCESSED,
        P_OTHER_TAX_CODE,
        P_OTHER_TAX_AMOUNT,
        P_OTHER_TAX_RATE,
        P_REF_KIND,
        P_REF_FOLIO,
    ],
    category_column: Some("Tipo Compra"),
    owner_field: "counterparty",
};

const PURCHASE_HEADER_WITH_ACK: &[&str] = &[
    "Nro",
    "Tipo Doc",
    "Tipo Compra",
    "RUT Proveedor",
    "Razon Social",
    "Folio",
    "Fecha Docto",
    "Fecha Recepcion",
    "Fecha Acuse",
    "Monto Exento",
    "Monto Neto",
    "Monto IVA Recuperable",
    "Monto Iva No Recuperable",
    "Codigo IVA No Rec.",
    "Monto Total",
    "Tabacos Puros",
    "Tabacos Cigarrillos",
    "Tabacos Elaborados",
    "Codigo Otro Impuesto",
    "Valor Otro Impuesto",
    "Tasa Otro Impuesto",
    "Tipo Docto. Referencia",
    "Folio Docto. Referencia",
];

const PURCHASE_FIELDS_WITH_ACK: &[FieldSpec] = &[
    DTE_KIND,
    P_CATEGORY,
    P_ISSUER,
    NAME,
    FOLIO,
    ISSUE_DATE,
    RECEIVED_AT,
    P_ACK,
    EXEMPT,
    NET,
    P_VAT_REC,
    P_VAT_NONREC,
    P_VAT_NONREC_CODE,
    TOTAL,
    P_TOB_CIGARS,
    P_TOB_CIGARETTES,
    P_TOB_PROCESSED,
    P_OTHER_TAX_CODE,
    P_OTHER_TAX_AMOUNT,
    P_OTHER_TAX_RATE,
    P_REF_KIND,
    P_REF_FOLIO,
];

/// Map the free-text category labels the SII exports to their codes.
fn category_code_for(label: &str) -> Option<&'static str> {
    match label {
        "Del Giro" => Some("1"),
        "Supermercados" => Some("2"),
        "Bienes Raíces" => Some("3"),
        "Activo Fijo" => Some("4"),
        "IVA Uso Común" => Some("5"),
        "IVA No Recuperable" => Some("6"),
        _ => None,
    }
}

impl RowSchema {
    /// Select the schema for a whole file.
    ///
    /// Sales has exactly one schema and takes no status; each purchase
    /// status names its own schema. Anything else is rejected here,
    /// before any input is read.
    pub fn for_file(
        kind: LedgerKind,
        status: Option<PurchaseStatus>,
    ) -> Result<&'static Self, FatalError> {
        match (kind, status) {
            (LedgerKind::Sales, None) => Ok(&SALES),
            (LedgerKind::Purchases, Some(PurchaseStatus::Registered)) => Ok(&PURCHASE_REGISTERED),
            (LedgerKind::Purchases, Some(PurchaseStatus::Excluded)) => Ok(&PURCHASE_EXCLUDED),
            (LedgerKind::Purchases, Some(PurchaseStatus::Claimed)) => Ok(&PURCHASE_CLAIMED),
            (LedgerKind::Purchases, Some(PurchaseStatus::Pending)) => Ok(&PURCHASE_PENDING),
            (kind, status) => Err(FatalError::InvalidVariant { kind, status }),
        }
    }

    /// Whether this schema declares an output field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == name)
    }

    /// Pre-processing: produce the working raw map for coercion.
    ///
    /// Applies the category label-to-code mapping; labels already coded
    /// or unknown pass through untouched (unknown ones then fail the
    /// integer coercion and surface as validation errors).
    #[must_use]
    pub fn preprocess(&self, raw: &RawRow) -> BTreeMap<String, String> {
        let mut work = raw.fields.clone();
        if let Some(column) = self.category_column {
            if let Some(cell) = work.get_mut(column) {
                if let Some(code) = category_code_for(cell.trim()) {
                    *cell = code.to_string();
                }
            }
        }
        work
    }

    /// Coerce every declared field of a pre-processed row.
    ///
    /// Failures accumulate per field; the returned map holds whatever
    /// coerced cleanly.
    #[must_use]
    pub fn coerce_row(&self, work: &BTreeMap<String, String>) -> (CoercedRow, RowErrors) {
        let mut coerced = CoercedRow::new();
        let mut errors = RowErrors::default();
        for spec in self.fields {
            match coerce(spec, work.get(spec.column).map(String::as_str)) {
                Ok(value) => {
                    coerced.insert(spec.name, value);
                }
                Err(err) => errors.add_validation(spec.name, err.to_string()),
            }
        }
        (coerced, errors)
    }

    /// Inject the caller-supplied owner RUT into the field the file
    /// does not carry (issuer for sales, counterparty for purchases).
    pub fn inject_owner(&self, coerced: &mut CoercedRow, owner: Rut) {
        coerced
            .entry(self.owner_field)
            .or_insert(FieldValue::Rut(owner));
    }

    /// Post-processing: attach the canonical zone to every naive
    /// timestamp field present.
    ///
    /// Zone-attachment failures (nonexistent local times) are recorded
    /// as validation errors on the owning field.
    pub fn postprocess(&self, coerced: &mut CoercedRow, errors: &mut RowErrors) {
        for spec in self.fields {
            if !matches!(spec.rule, FieldRule::DateTime(_)) {
                continue;
            }
            let Some(value) = coerced.get_mut(spec.name) else {
                continue;
            };
            if let FieldValue::DateTime(naive) = *value {
                match attach_zone(naive, CANONICAL_TZ) {
                    Ok(aware) => *value = FieldValue::Zoned(aware),
                    Err(err) => errors.add_validation(spec.name, err.to_string()),
                }
            }
        }
    }

    /// Assemble the concrete entry variant from a coerced row.
    pub fn assemble(&self, coerced: &CoercedRow) -> Result<LedgerEntry, AssembleError> {
        let core = assemble_core(coerced)?;
        match self.status {
            None => {
                let mut entry = SaleEntry::new(core);
                if let Some(name) = opt_text(coerced, "counterparty_name")? {
                    entry = entry.with_counterparty_name(name);
                }
                if let Some(code) = opt_int(coerced, "category_code")? {
                    entry = entry.with_category_code(code);
                }
                Ok(LedgerEntry::Sale(entry))
            }
            Some(status) => {
                let mut entry = PurchaseEntry::new(core, status);
                if let Some(name) = opt_text(coerced, "counterparty_name")? {
                    entry = entry.with_counterparty_name(name);
                }
                entry.category_code = opt_int(coerced, "category_code")?;
                entry.exempt_amount = opt_money(coerced, "exempt_amount")?;
                entry.net_amount = opt_money(coerced, "net_amount")?;
                entry.recoverable_vat = opt_money(coerced, "recoverable_vat")?;
                entry.nonrecoverable_vat = opt_money(coerced, "nonrecoverable_vat")?;
                entry.nonrecoverable_vat_code = opt_int(coerced, "nonrecoverable_vat_code")?;
                entry.tobacco_cigars = opt_money(coerced, "tobacco_cigars")?;
                entry.tobacco_cigarettes = opt_money(coerced, "tobacco_cigarettes")?;
                entry.tobacco_processed = opt_money(coerced, "tobacco_processed")?;
                entry.other_tax_code = opt_int(coerced, "other_tax_code")?;
                entry.other_tax_amount = opt_money(coerced, "other_tax_amount")?;
                entry.other_tax_rate = opt_money(coerced, "other_tax_rate")?;
                entry.reference_dte_kind = match opt_int(coerced, "reference_dte_kind")? {
                    Some(code) => Some(dte_kind_of("reference_dte_kind", code)?),
                    None => None,
                };
                entry.reference_folio = opt_int(coerced, "reference_folio")?;

                if self.has_field("acknowledged_at") {
                    if let Some(at) = opt_zoned(coerced, "acknowledged_at")? {
                        entry = entry.with_acknowledged_at(at).map_err(|err| {
                            AssembleError::Invalid {
                                field: "acknowledged_at",
                                message: err.to_string(),
                            }
                        })?;
                    }
                }
                if self.has_field("claimed_at") {
                    if let Some(at) = opt_zoned(coerced, "claimed_at")? {
                        entry =
                            entry
                                .with_claimed_at(at)
                                .map_err(|err| AssembleError::Invalid {
                                    field: "claimed_at",
                                    message: err.to_string(),
                                })?;
                    }
                }
                Ok(LedgerEntry::Purchase(entry))
            }
        }
    }
}

fn assemble_core(coerced: &CoercedRow) -> Result<EntryCore, AssembleError> {
    let issuer = rut_of(coerced, "issuer")?;
    let code = int_of(coerced, "dte_kind")?;
    let dte_kind = dte_kind_of("dte_kind", code)?;
    let folio = int_of(coerced, "folio")?;
    let issue_date = date_of(coerced, "issue_date")?;
    let counterparty = rut_of(coerced, "counterparty")?;
    let total_amount = money_of(coerced, "total_amount")?;
    let received_at = zoned_of(coerced, "received_at")?;

    EntryCore::new(
        issuer,
        dte_kind,
        folio,
        issue_date,
        counterparty,
        total_amount,
        received_at,
    )
    .map_err(|err| AssembleError::Invalid {
        field: "entry",
        message: err.to_string(),
    })
}

fn take<'a>(coerced: &'a CoercedRow, name: &'static str) -> Result<&'a FieldValue, AssembleError> {
    coerced.get(name).ok_or(AssembleError::MissingKey(name))
}

fn dte_kind_of(field: &'static str, code: i64) -> Result<DteKind, AssembleError> {
    let code = u16::try_from(code).map_err(|_| AssembleError::Invalid {
        field,
        message: format!("DTE code {code} out of range"),
    })?;
    DteKind::from_code(code).map_err(|err| AssembleError::Invalid {
        field,
        message: err.to_string(),
    })
}

fn int_of(coerced: &CoercedRow, name: &'static str) -> Result<i64, AssembleError> {
    take(coerced, name)?
        .as_int()
        .ok_or(AssembleError::WrongType {
            field: name,
            expected: "integer",
        })
}

fn money_of(coerced: &CoercedRow, name: &'static str) -> Result<Decimal, AssembleError> {
    take(coerced, name)?
        .as_money()
        .ok_or(AssembleError::WrongType {
            field: name,
            expected: "amount",
        })
}

fn rut_of(coerced: &CoercedRow, name: &'static str) -> Result<Rut, AssembleError> {
    take(coerced, name)?
        .as_rut()
        .ok_or(AssembleError::WrongType {
            field: name,
            expected: "RUT",
        })
}

fn date_of(
    coerced: &CoercedRow,
    name: &'static str,
) -> Result<chrono::NaiveDate, AssembleError> {
    take(coerced, name)?
        .as_date()
        .ok_or(AssembleError::WrongType {
            field: name,
            expected: "date",
        })
}

fn zoned_of(
    coerced: &CoercedRow,
    name: &'static str,
) -> Result<chrono::DateTime<chrono_tz::Tz>, AssembleError> {
    take(coerced, name)?
        .as_zoned()
        .ok_or(AssembleError::WrongType {
            field: name,
            expected: "zone-aware timestamp",
        })
}

fn opt_int(coerced: &CoercedRow, name: &'static str) -> Result<Option<i64>, AssembleError> {
    match take(coerced, name)? {
        FieldValue::Null => Ok(None),
        FieldValue::Int(n) => Ok(Some(*n)),
        _ => Err(AssembleError::WrongType {
            field: name,
            expected: "integer",
        }),
    }
}

fn opt_money(coerced: &CoercedRow, name: &'static str) -> Result<Option<Decimal>, AssembleError> {
    match take(coerced, name)? {
        FieldValue::Null => Ok(None),
        FieldValue::Money(d) => Ok(Some(*d)),
        _ => Err(AssembleError::WrongType {
            field: name,
            expected: "amount",
        }),
    }
}

fn opt_text(coerced: &CoercedRow, name: &'static str) -> Result<Option<String>, AssembleError> {
    match take(coerced, name)? {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s.clone())),
        _ => Err(AssembleError::WrongType {
            field: name,
            expected: "text",
        }),
    }
}

fn opt_zoned(
    coerced: &CoercedRow,
    name: &'static str,
) -> Result<Option<chrono::DateTime<chrono_tz::Tz>>, AssembleError> {
    match take(coerced, name)? {
        FieldValue::Null => Ok(None),
        FieldValue::Zoned(dt) => Ok(Some(*dt)),
        _ => Err(AssembleError::WrongType {
            field: name,
            expected: "zone-aware timestamp",
        }),
    }
}
