use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::rut::Rut;
use super::types::*;

/// Fluent construction of a [`Document`].
///
/// ```
/// use dte::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let issuer = PartyBuilder::new("77117239-3".parse().unwrap(), "Comercial Andes SpA")
///     .business_activity("Venta al por mayor")
///     .street("Av. Providencia 1234")
///     .commune("Providencia")
///     .build();
/// let receiver = PartyBuilder::new("76086428-5".parse().unwrap(), "Cliente Ltda.")
///     .street("Calle Falsa 456")
///     .commune("Santiago")
///     .build();
///
/// let doc = Document::invoice(NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(), issuer)
///     .receiver(receiver)
///     .add_line(LineBuilder::new("Resma carta", dec!(2), dec!(3900)).unit("UN").build())
///     .declared_total(9282);
///
/// assert_eq!(doc.document_type(), DocumentType::Invoice);
/// assert_eq!(doc.lines[0].line_number, 1);
/// ```
impl Document {
    pub fn new(kind: DocumentKind, issue_date: NaiveDate, issuer: Party) -> Self {
        Self {
            kind,
            issue_date,
            issuer,
            receiver: None,
            lines: Vec::new(),
            payment_method: None,
            due_date: None,
            declared: None,
        }
    }

    /// Taxed invoice (33).
    pub fn invoice(issue_date: NaiveDate, issuer: Party) -> Self {
        Self::new(
            DocumentKind::Invoice(InvoiceDetails { exempt: false }),
            issue_date,
            issuer,
        )
    }

    /// Exempt invoice (34).
    pub fn exempt_invoice(issue_date: NaiveDate, issuer: Party) -> Self {
        Self::new(
            DocumentKind::Invoice(InvoiceDetails { exempt: true }),
            issue_date,
            issuer,
        )
    }

    /// Dispatch guide (52).
    pub fn dispatch_guide(issue_date: NaiveDate, issuer: Party, details: DispatchDetails) -> Self {
        Self::new(DocumentKind::DispatchGuide(details), issue_date, issuer)
    }

    /// Credit note (61).
    pub fn credit_note(issue_date: NaiveDate, issuer: Party, details: NoteDetails) -> Self {
        Self::new(DocumentKind::CreditNote(details), issue_date, issuer)
    }

    /// Debit note (56).
    pub fn debit_note(issue_date: NaiveDate, issuer: Party, details: NoteDetails) -> Self {
        Self::new(DocumentKind::DebitNote(details), issue_date, issuer)
    }

    pub fn receiver(mut self, party: Party) -> Self {
        self.receiver = Some(party);
        self
    }

    /// Append a line, numbering it after the lines already present.
    pub fn add_line(mut self, mut line: DetailLine) -> Self {
        line.line_number = self.lines.len() as u32 + 1;
        self.lines.push(line);
        self
    }

    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn declared_totals(mut self, totals: DeclaredTotals) -> Self {
        self.declared = Some(totals);
        self
    }

    /// Shorthand for declaring only the grand total.
    pub fn declared_total(self, total: i64) -> Self {
        self.declared_totals(DeclaredTotals::total(total))
    }
}

impl DispatchDetails {
    pub fn new(transfer_reason: TransferReason) -> Self {
        Self {
            transfer_reason: Some(transfer_reason),
            dispatch_type: None,
            transport: None,
        }
    }

    pub fn dispatch_type(mut self, dispatch_type: DispatchType) -> Self {
        self.dispatch_type = Some(dispatch_type);
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl NoteDetails {
    pub fn new(reference: Reference) -> Self {
        Self {
            references: vec![reference],
        }
    }

    pub fn add_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }
}

impl Reference {
    pub fn new(document_type: DocumentType, folio: u64) -> Self {
        Self {
            document_type: document_type.code().to_string(),
            folio,
            date: None,
            code: None,
            reason: None,
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn code(mut self, code: ReferenceCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Builder for [`Party`] (issuer/receiver).
pub struct PartyBuilder {
    rut: Rut,
    legal_name: String,
    business_activity: Option<String>,
    address: Address,
}

impl PartyBuilder {
    pub fn new(rut: Rut, legal_name: impl Into<String>) -> Self {
        Self {
            rut,
            legal_name: legal_name.into(),
            business_activity: None,
            address: Address::default(),
        }
    }

    pub fn business_activity(mut self, activity: impl Into<String>) -> Self {
        self.business_activity = Some(activity.into());
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.address.street = Some(street.into());
        self
    }

    pub fn commune(mut self, commune: impl Into<String>) -> Self {
        self.address.commune = Some(commune.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.address.city = Some(city.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            rut: self.rut,
            legal_name: self.legal_name,
            business_activity: self.business_activity,
            address: self.address,
        }
    }
}

/// Builder for [`DetailLine`].
///
/// The line number is assigned by [`Document::add_line`].
pub struct LineBuilder {
    name: String,
    description: Option<String>,
    quantity: Decimal,
    unit: Option<String>,
    unit_price: Decimal,
    discount_pct: Decimal,
    exempt: bool,
}

impl LineBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: None,
            quantity,
            unit: None,
            unit_price,
            discount_pct: Decimal::ZERO,
            exempt: false,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn discount_pct(mut self, pct: Decimal) -> Self {
        self.discount_pct = pct;
        self
    }

    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }

    pub fn build(self) -> DetailLine {
        DetailLine {
            line_number: 0,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            discount_pct: self.discount_pct,
            exempt: self.exempt,
        }
    }
}

/// Builder for the [`Transport`] block of a dispatch guide.
#[derive(Default)]
pub struct TransportBuilder {
    transport: Transport,
}

impl TransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plate(mut self, plate: impl Into<String>) -> Self {
        self.transport.plate = Some(plate.into());
        self
    }

    pub fn carrier(mut self, rut: Rut) -> Self {
        self.transport.carrier_rut = Some(rut);
        self
    }

    pub fn driver(mut self, rut: Rut, name: impl Into<String>) -> Self {
        self.transport.driver_rut = Some(rut);
        self.transport.driver_name = Some(name.into());
        self
    }

    pub fn destination_street(mut self, street: impl Into<String>) -> Self {
        self.transport.destination.street = Some(street.into());
        self
    }

    pub fn destination_commune(mut self, commune: impl Into<String>) -> Self {
        self.transport.destination.commune = Some(commune.into());
        self
    }

    pub fn destination_city(mut self, city: impl Into<String>) -> Self {
        self.transport.destination.city = Some(city.into());
        self
    }

    pub fn build(self) -> Transport {
        self.transport
    }
}
