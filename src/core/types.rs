use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rut::Rut;

/// SII document type codes (TipoDTE) handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    /// 33: Factura electrónica.
    Invoice,
    /// 34: Factura no afecta o exenta electrónica.
    ExemptInvoice,
    /// 52: Guía de despacho electrónica.
    DispatchGuide,
    /// 56: Nota de débito electrónica.
    DebitNote,
    /// 61: Nota de crédito electrónica.
    CreditNote,
}

impl DocumentType {
    /// All supported types, in code order.
    pub const ALL: [DocumentType; 5] = [
        Self::Invoice,
        Self::ExemptInvoice,
        Self::DispatchGuide,
        Self::DebitNote,
        Self::CreditNote,
    ];

    /// SII numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Invoice => 33,
            Self::ExemptInvoice => 34,
            Self::DispatchGuide => 52,
            Self::DebitNote => 56,
            Self::CreditNote => 61,
        }
    }

    /// Parse from SII numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            33 => Some(Self::Invoice),
            34 => Some(Self::ExemptInvoice),
            52 => Some(Self::DispatchGuide),
            56 => Some(Self::DebitNote),
            61 => Some(Self::CreditNote),
            _ => None,
        }
    }

    /// Legal name of the document type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invoice => "Factura Electrónica",
            Self::ExemptInvoice => "Factura Exenta Electrónica",
            Self::DispatchGuide => "Guía de Despacho Electrónica",
            Self::DebitNote => "Nota de Débito Electrónica",
            Self::CreditNote => "Nota de Crédito Electrónica",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A tax document before numbering.
///
/// Totals are never stored here: they are derived from `lines` when the
/// document is built. `declared` only carries figures the caller wants
/// cross-checked against that derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Variant and its type-specific data.
    pub kind: DocumentKind,
    /// FchEmis.
    pub issue_date: NaiveDate,
    /// Emisor.
    pub issuer: Party,
    /// Receptor.
    pub receiver: Option<Party>,
    /// Detalle, in print order.
    pub lines: Vec<DetailLine>,
    /// FmaPago.
    pub payment_method: Option<PaymentMethod>,
    /// FchVenc.
    pub due_date: Option<NaiveDate>,
    /// Totals supplied by the caller, verified at build time.
    pub declared: Option<DeclaredTotals>,
}

impl Document {
    /// The SII document type this document will be numbered under.
    pub fn document_type(&self) -> DocumentType {
        self.kind.document_type()
    }
}

/// The closed set of document variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice(InvoiceDetails),
    DispatchGuide(DispatchDetails),
    CreditNote(NoteDetails),
    DebitNote(NoteDetails),
}

impl DocumentKind {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Invoice(details) if details.exempt => DocumentType::ExemptInvoice,
            Self::Invoice(_) => DocumentType::Invoice,
            Self::DispatchGuide(_) => DocumentType::DispatchGuide,
            Self::CreditNote(_) => DocumentType::CreditNote,
            Self::DebitNote(_) => DocumentType::DebitNote,
        }
    }
}

/// Invoice-specific data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceDetails {
    /// Exempt invoice (type 34): every line is exempt and no IVA is charged.
    pub exempt: bool,
}

/// Dispatch-guide-specific data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchDetails {
    /// IndTraslado. Required; `None` fails validation.
    pub transfer_reason: Option<TransferReason>,
    /// TipoDespacho.
    pub dispatch_type: Option<DispatchType>,
    /// Transporte block.
    pub transport: Option<Transport>,
}

/// Credit/debit-note data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteDetails {
    /// Referencia entries; at least one is required.
    pub references: Vec<Reference>,
}

/// Issuer or receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// RUTEmisor / RUTRecep.
    pub rut: Rut,
    /// RznSoc / RznSocRecep.
    pub legal_name: String,
    /// GiroEmis / GiroRecep.
    pub business_activity: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub commune: Option<String>,
    pub city: Option<String>,
}

/// One Detalle line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailLine {
    /// NroLinDet, 1-based and consecutive.
    pub line_number: u32,
    /// NmbItem.
    pub name: String,
    /// DscItem.
    pub description: Option<String>,
    /// QtyItem.
    pub quantity: Decimal,
    /// UnmdItem.
    pub unit: Option<String>,
    /// PrcItem.
    pub unit_price: Decimal,
    /// DescuentoPct, 0–100.
    pub discount_pct: Decimal,
    /// IndExe: amount goes to MntExe instead of MntNeto.
    pub exempt: bool,
}

/// IndTraslado codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferReason {
    /// 1: Operación constituye venta.
    Sale,
    /// 2: Ventas por efectuar.
    PendingSale,
    /// 3: Consignaciones.
    Consignment,
    /// 4: Entrega gratuita.
    FreeDelivery,
    /// 5: Traslados internos.
    InternalTransfer,
    /// 6: Otros traslados no venta.
    OtherNonSale,
    /// 7: Guía de devolución.
    Return,
    /// 8: Traslado para exportación (no venta).
    ExportTransfer,
    /// 9: Venta para exportación.
    ExportSale,
}

impl TransferReason {
    pub fn code(&self) -> u8 {
        match self {
            Self::Sale => 1,
            Self::PendingSale => 2,
            Self::Consignment => 3,
            Self::FreeDelivery => 4,
            Self::InternalTransfer => 5,
            Self::OtherNonSale => 6,
            Self::Return => 7,
            Self::ExportTransfer => 8,
            Self::ExportSale => 9,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Sale),
            2 => Some(Self::PendingSale),
            3 => Some(Self::Consignment),
            4 => Some(Self::FreeDelivery),
            5 => Some(Self::InternalTransfer),
            6 => Some(Self::OtherNonSale),
            7 => Some(Self::Return),
            8 => Some(Self::ExportTransfer),
            9 => Some(Self::ExportSale),
            _ => None,
        }
    }
}

/// TipoDespacho codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchType {
    /// 1: Por cuenta del receptor.
    ByReceiver,
    /// 2: Por cuenta del emisor a instalaciones del cliente.
    ByIssuerToReceiver,
    /// 3: Por cuenta del emisor a otras instalaciones.
    ByIssuerToOther,
}

impl DispatchType {
    pub fn code(&self) -> u8 {
        match self {
            Self::ByReceiver => 1,
            Self::ByIssuerToReceiver => 2,
            Self::ByIssuerToOther => 3,
        }
    }
}

/// Transporte block of a dispatch guide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    /// Patente.
    pub plate: Option<String>,
    /// RUTTrans.
    pub carrier_rut: Option<Rut>,
    /// Chofer/RUTChofer.
    pub driver_rut: Option<Rut>,
    /// Chofer/NombreChofer.
    pub driver_name: Option<String>,
    /// DirDest / CmnaDest / CiudadDest.
    pub destination: Address,
}

/// Referencia to a previously issued document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// TpoDocRef, e.g. "33".
    pub document_type: String,
    /// FolioRef.
    pub folio: u64,
    /// FchRef.
    pub date: Option<NaiveDate>,
    /// CodRef.
    pub code: Option<ReferenceCode>,
    /// RazonRef.
    pub reason: Option<String>,
}

/// CodRef values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceCode {
    /// 1: Anula documento de referencia.
    Annul,
    /// 2: Corrige texto.
    CorrectText,
    /// 3: Corrige montos.
    CorrectAmounts,
}

impl ReferenceCode {
    pub fn code(&self) -> u8 {
        match self {
            Self::Annul => 1,
            Self::CorrectText => 2,
            Self::CorrectAmounts => 3,
        }
    }
}

/// FmaPago values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// 1: Contado.
    Cash,
    /// 2: Crédito.
    Credit,
    /// 3: Sin costo.
    Free,
}

impl PaymentMethod {
    pub fn code(&self) -> u8 {
        match self {
            Self::Cash => 1,
            Self::Credit => 2,
            Self::Free => 3,
        }
    }
}

/// Totals supplied by the caller. Each present field must agree with the
/// computed value within the configured tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTotals {
    pub net: Option<i64>,
    pub exempt: Option<i64>,
    pub tax_amount: Option<i64>,
    pub total: Option<i64>,
}

impl DeclaredTotals {
    /// Declare only the grand total.
    pub fn total(total: i64) -> Self {
        Self {
            total: Some(total),
            ..Self::default()
        }
    }
}

/// Totales, derived from the detail lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// MntNeto.
    pub net: i64,
    /// MntExe.
    pub exempt: i64,
    /// TasaIVA.
    pub tax_rate: Decimal,
    /// IVA.
    pub tax_amount: i64,
    /// MntTotal.
    pub total: i64,
}

/// Computed amounts for one detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// DescuentoMonto.
    pub discount: i64,
    /// MontoItem.
    pub amount: i64,
}
