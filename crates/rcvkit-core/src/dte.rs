//! Electronic tax document (DTE) type codes.
//!
//! The SII assigns a numeric code to each kind of electronic document.
//! Only the codes that appear in purchase/sales registries are modeled.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A DTE type code outside the known registry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown DTE type code {0}")]
pub struct UnknownDteCode(pub u16);

/// The kind of an electronic tax document, by SII code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum DteKind {
    /// 33: factura electrónica.
    FacturaElectronica,
    /// 34: factura no afecta o exenta electrónica.
    FacturaNoAfectaElectronica,
    /// 43: liquidación-factura electrónica.
    LiquidacionFacturaElectronica,
    /// 46: factura de compra electrónica.
    FacturaCompraElectronica,
    /// 56: nota de débito electrónica.
    NotaDebitoElectronica,
    /// 61: nota de crédito electrónica.
    NotaCreditoElectronica,
    /// 110: factura de exportación electrónica.
    FacturaExportacionElectronica,
    /// 111: nota de débito de exportación electrónica.
    NotaDebitoExportacionElectronica,
    /// 112: nota de crédito de exportación electrónica.
    NotaCreditoExportacionElectronica,
}

impl DteKind {
    /// Resolve a numeric SII code.
    pub const fn from_code(code: u16) -> Result<Self, UnknownDteCode> {
        match code {
            33 => Ok(Self::FacturaElectronica),
            34 => Ok(Self::FacturaNoAfectaElectronica),
            43 => Ok(Self::LiquidacionFacturaElectronica),
            46 => Ok(Self::FacturaCompraElectronica),
            56 => Ok(Self::NotaDebitoElectronica),
            61 => Ok(Self::NotaCreditoElectronica),
            110 => Ok(Self::FacturaExportacionElectronica),
            111 => Ok(Self::NotaDebitoExportacionElectronica),
            112 => Ok(Self::NotaCreditoExportacionElectronica),
            other => Err(UnknownDteCode(other)),
        }
    }

    /// The numeric SII code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::FacturaElectronica => 33,
            Self::FacturaNoAfectaElectronica => 34,
            Self::LiquidacionFacturaElectronica => 43,
            Self::FacturaCompraElectronica => 46,
            Self::NotaDebitoElectronica => 56,
            Self::NotaCreditoElectronica => 61,
            Self::FacturaExportacionElectronica => 110,
            Self::NotaDebitoExportacionElectronica => 111,
            Self::NotaCreditoExportacionElectronica => 112,
        }
    }

    /// Whether this is a credit note (domestic or export).
    ///
    /// Credit notes are the only documents whose total amount may be
    /// negative.
    #[must_use]
    pub const fn is_credit_note(&self) -> bool {
        matches!(
            self,
            Self::NotaCreditoElectronica | Self::NotaCreditoExportacionElectronica
        )
    }
}

impl TryFrom<u16> for DteKind {
    type Error = UnknownDteCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<DteKind> for u16 {
    fn from(kind: DteKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for DteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
