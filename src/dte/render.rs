use std::sync::Arc;

use chrono::NaiveDate;

use super::xml_utils::{XmlResult, XmlWriter, to_latin1};
use crate::core::*;

/// SII DTE namespace.
pub const SII_NS: &str = "http://www.sii.cl/SiiDte";

/// A numbered document in SII wire format.
///
/// Produced once by [`DocumentBuilder::build`](super::DocumentBuilder::build)
/// and handed to whatever signs and transmits it.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    xml: String,
    folio: u64,
    document_type: DocumentType,
    issue_date: NaiveDate,
    totals: Totals,
    amount_in_words: String,
    authorization: Arc<str>,
}

impl RenderedDocument {
    pub(crate) fn new(
        xml: String,
        folio: u64,
        document: &Document,
        totals: Totals,
        authorization: Arc<str>,
    ) -> Self {
        Self {
            xml,
            folio,
            document_type: document.document_type(),
            issue_date: document.issue_date,
            totals,
            amount_in_words: amount_in_words(totals.total.unsigned_abs()),
            authorization,
        }
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn folio(&self) -> u64 {
        self.folio
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// MntTotal spelled out, for the printed representation.
    pub fn amount_in_words(&self) -> &str {
        &self.amount_in_words
    }

    /// The CAF the folio was drawn from, for the signer.
    pub fn authorization_blob(&self) -> &str {
        &self.authorization
    }

    /// Value of the `Documento/@ID` attribute.
    pub fn document_id(&self) -> String {
        document_id(self.document_type, self.folio)
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    /// The XML as ISO-8859-1 bytes, matching its declaration.
    pub fn to_latin1(&self) -> Result<Vec<u8>, DteError> {
        to_latin1(&self.xml)
    }
}

/// `F<folio>T<type>`, unique per issuer.
pub fn document_id(document_type: DocumentType, folio: u64) -> String {
    format!("F{folio}T{}", document_type.code())
}

/// Render a validated document with its folio and computed totals.
///
/// Elements are written in SII schema order.
pub fn to_dte_xml(doc: &Document, folio: u64, computed: &ComputedTotals) -> XmlResult {
    let document_type = doc.document_type();
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs("DTE", &[("version", "1.0"), ("xmlns", SII_NS)])?;
    let id = document_id(document_type, folio);
    w.start_element_with_attrs("Documento", &[("ID", id.as_str())])?;

    w.start_element("Encabezado")?;
    write_id_doc(&mut w, doc, folio)?;
    write_issuer(&mut w, &doc.issuer)?;
    if let Some(receiver) = &doc.receiver {
        write_receiver(&mut w, receiver)?;
    }
    if let DocumentKind::DispatchGuide(DispatchDetails {
        transport: Some(transport),
        ..
    }) = &doc.kind
    {
        write_transport(&mut w, transport)?;
    }
    write_totals(&mut w, &computed.totals)?;
    w.end_element("Encabezado")?;

    let all_exempt = document_type == DocumentType::ExemptInvoice;
    for (line, amounts) in doc.lines.iter().zip(&computed.lines) {
        write_line(&mut w, line, amounts, all_exempt)?;
    }

    match &doc.kind {
        DocumentKind::CreditNote(note) | DocumentKind::DebitNote(note) => {
            for (i, reference) in note.references.iter().enumerate() {
                write_reference(&mut w, reference, i + 1)?;
            }
        }
        DocumentKind::Invoice(_) | DocumentKind::DispatchGuide(_) => {}
    }

    w.end_element("Documento")?;
    w.end_element("DTE")?;
    w.into_string()
}

fn write_id_doc(w: &mut XmlWriter, doc: &Document, folio: u64) -> Result<(), DteError> {
    w.start_element("IdDoc")?;
    w.code_element("TipoDTE", doc.document_type().code())?;
    w.code_element("Folio", folio)?;
    w.date_element("FchEmis", doc.issue_date)?;

    match &doc.kind {
        DocumentKind::DispatchGuide(details) => {
            if let Some(dispatch_type) = details.dispatch_type {
                w.code_element("TipoDespacho", dispatch_type.code())?;
            }
            if let Some(reason) = details.transfer_reason {
                w.code_element("IndTraslado", reason.code())?;
            }
        }
        DocumentKind::Invoice(_) | DocumentKind::CreditNote(_) | DocumentKind::DebitNote(_) => {}
    }

    if let Some(method) = doc.payment_method {
        w.code_element("FmaPago", method.code())?;
    }
    if let Some(due) = doc.due_date {
        w.date_element("FchVenc", due)?;
    }
    w.end_element("IdDoc")?;
    Ok(())
}

fn write_issuer(w: &mut XmlWriter, party: &Party) -> Result<(), DteError> {
    w.start_element("Emisor")?;
    w.rut_element("RUTEmisor", party.rut)?;
    w.text_element("RznSoc", &party.legal_name)?;
    w.optional_element("GiroEmis", party.business_activity.as_deref())?;
    w.optional_element("DirOrigen", party.address.street.as_deref())?;
    w.optional_element("CmnaOrigen", party.address.commune.as_deref())?;
    w.optional_element("CiudadOrigen", party.address.city.as_deref())?;
    w.end_element("Emisor")?;
    Ok(())
}

fn write_receiver(w: &mut XmlWriter, party: &Party) -> Result<(), DteError> {
    w.start_element("Receptor")?;
    w.rut_element("RUTRecep", party.rut)?;
    w.text_element("RznSocRecep", &party.legal_name)?;
    w.optional_element("GiroRecep", party.business_activity.as_deref())?;
    w.optional_element("DirRecep", party.address.street.as_deref())?;
    w.optional_element("CmnaRecep", party.address.commune.as_deref())?;
    w.optional_element("CiudadRecep", party.address.city.as_deref())?;
    w.end_element("Receptor")?;
    Ok(())
}

fn write_transport(w: &mut XmlWriter, transport: &Transport) -> Result<(), DteError> {
    w.start_element("Transporte")?;
    w.optional_element("Patente", transport.plate.as_deref())?;
    if let Some(carrier) = transport.carrier_rut {
        w.rut_element("RUTTrans", carrier)?;
    }
    if let (Some(rut), Some(name)) = (transport.driver_rut, &transport.driver_name) {
        w.start_element("Chofer")?;
        w.rut_element("RUTChofer", rut)?;
        w.text_element("NombreChofer", name)?;
        w.end_element("Chofer")?;
    }
    let destination = &transport.destination;
    w.optional_element("DirDest", destination.street.as_deref())?;
    w.optional_element("CmnaDest", destination.commune.as_deref())?;
    w.optional_element("CiudadDest", destination.city.as_deref())?;
    w.end_element("Transporte")?;
    Ok(())
}

fn write_totals(w: &mut XmlWriter, totals: &Totals) -> Result<(), DteError> {
    w.start_element("Totales")?;
    // Net and IVA appear together or not at all; an all-exempt document
    // carries only MntExe and MntTotal.
    if totals.net > 0 {
        w.amount_element("MntNeto", totals.net)?;
    }
    if totals.exempt > 0 {
        w.amount_element("MntExe", totals.exempt)?;
    }
    if totals.net > 0 {
        w.decimal_element("TasaIVA", totals.tax_rate)?;
        w.amount_element("IVA", totals.tax_amount)?;
    }
    w.amount_element("MntTotal", totals.total)?;
    w.end_element("Totales")?;
    Ok(())
}

fn write_line(
    w: &mut XmlWriter,
    line: &DetailLine,
    amounts: &LineAmounts,
    all_exempt: bool,
) -> Result<(), DteError> {
    w.start_element("Detalle")?;
    w.code_element("NroLinDet", line.line_number)?;
    if line.exempt || all_exempt {
        w.text_element("IndExe", "1")?;
    }
    w.text_element("NmbItem", &line.name)?;
    w.optional_element("DscItem", line.description.as_deref())?;
    w.decimal_element("QtyItem", line.quantity)?;
    w.optional_element("UnmdItem", line.unit.as_deref())?;
    w.decimal_element("PrcItem", line.unit_price)?;
    if !wire_decimal(line.discount_pct).is_zero() {
        w.decimal_element("DescuentoPct", line.discount_pct)?;
        w.amount_element("DescuentoMonto", amounts.discount)?;
    }
    w.amount_element("MontoItem", amounts.amount)?;
    w.end_element("Detalle")?;
    Ok(())
}

fn write_reference(w: &mut XmlWriter, reference: &Reference, line: usize) -> Result<(), DteError> {
    w.start_element("Referencia")?;
    w.code_element("NroLinRef", line)?;
    w.text_element("TpoDocRef", &reference.document_type)?;
    w.code_element("FolioRef", reference.folio)?;
    if let Some(date) = reference.date {
        w.date_element("FchRef", date)?;
    }
    if let Some(code) = reference.code {
        w.code_element("CodRef", code.code())?;
    }
    w.optional_element("RazonRef", reference.reason.as_deref())?;
    w.end_element("Referencia")?;
    Ok(())
}
