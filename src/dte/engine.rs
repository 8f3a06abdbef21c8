use rust_decimal::Decimal;

use super::render::{RenderedDocument, to_dte_xml};
use crate::caf::FolioAllocator;
use crate::config::EngineConfig;
use crate::core::*;

/// Turns a [`Document`] into a numbered [`RenderedDocument`].
///
/// A build runs in a fixed order: validate, compute and check totals,
/// claim a folio, render. Nothing is claimed unless the first two steps
/// pass. Once claimed, a folio stays spent even if rendering then fails;
/// such a folio is logged at `warn` so it can be voided with the SII.
///
/// ```
/// use dte::caf::{FolioAllocator, FolioRange};
/// use dte::core::*;
/// use dte::dte::DocumentBuilder;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
/// let allocator = FolioAllocator::new();
/// allocator
///     .load(FolioRange::new(DocumentType::Invoice, 1, 100, date, "<AUTORIZACION/>").unwrap())
///     .unwrap();
///
/// let issuer = PartyBuilder::new("77117239-3".parse().unwrap(), "Comercial Andes SpA")
///     .business_activity("Venta de artículos de oficina")
///     .street("Av. Providencia 1234")
///     .commune("Providencia")
///     .build();
/// let receiver = PartyBuilder::new("76086428-5".parse().unwrap(), "Cliente Ltda.")
///     .street("Calle Falsa 456")
///     .commune("Santiago")
///     .build();
/// let doc = Document::invoice(date, issuer)
///     .receiver(receiver)
///     .add_line(LineBuilder::new("Resma carta", dec!(2), dec!(3900)).build())
///     .declared_total(9282);
///
/// let rendered = DocumentBuilder::new(&allocator).build(&doc).unwrap();
/// assert_eq!(rendered.folio(), 1);
/// assert_eq!(rendered.totals().total, 9282);
/// assert!(rendered.xml().contains("<Folio>1</Folio>"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    allocator: &'a FolioAllocator,
    tax_rate: Decimal,
    tolerance: i64,
}

impl<'a> DocumentBuilder<'a> {
    /// Builder with the standard IVA rate and a 1 peso tolerance.
    pub fn new(allocator: &'a FolioAllocator) -> Self {
        Self {
            allocator,
            tax_rate: IVA_RATE,
            tolerance: 1,
        }
    }

    pub fn with_config(allocator: &'a FolioAllocator, config: &EngineConfig) -> Self {
        Self {
            allocator,
            tax_rate: config.tax_rate,
            tolerance: config.totals_tolerance,
        }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Field rules only; claims nothing.
    pub fn validate(&self, doc: &Document) -> Result<(), DteError> {
        validate(doc)
    }

    /// Totals the document would be issued with, checked against any
    /// declared figures. Claims nothing.
    pub fn totals(&self, doc: &Document) -> Result<ComputedTotals, DteError> {
        let computed = calculate_totals(doc, self.tax_rate)?;
        if let Some(declared) = &doc.declared {
            check_declared_totals(declared, &computed.totals, self.tolerance)?;
        }
        Ok(computed)
    }

    /// Validate, total, number and render `doc`.
    pub fn build(&self, doc: &Document) -> Result<RenderedDocument, DteError> {
        let document_type = doc.document_type();

        if let Err(e) = self.validate(doc) {
            tracing::debug!(
                document_type = %document_type,
                errors = e.validation_errors().len(),
                "document rejected"
            );
            return Err(e);
        }
        let computed = self.totals(doc)?;

        // Last step before rendering: anything that fails past this point
        // burns the folio.
        let claimed = self.allocator.claim(document_type)?;

        let xml = match to_dte_xml(doc, claimed.folio, &computed) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!(
                    document_type = %document_type,
                    folio = claimed.folio,
                    error = %e,
                    "render failed after folio was claimed; folio is spent"
                );
                return Err(e);
            }
        };

        tracing::info!(
            document_type = %document_type,
            folio = claimed.folio,
            total = computed.totals.total,
            "document built"
        );

        Ok(RenderedDocument::new(
            xml,
            claimed.folio,
            doc,
            computed.totals,
            claimed.range.blob().clone(),
        ))
    }
}
