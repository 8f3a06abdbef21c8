use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::{DteError, ValidationError};
use super::money::{self, MAX_AMOUNT, MAX_DECIMALS, round_pesos, tax_amount, wire_decimal};
use super::types::*;

/// Maximum lengths of SII text fields, in characters.
pub mod limits {
    pub const LEGAL_NAME: usize = 100;
    pub const ISSUER_ACTIVITY: usize = 80;
    pub const RECEIVER_ACTIVITY: usize = 40;
    pub const STREET: usize = 70;
    pub const COMMUNE: usize = 20;
    pub const CITY: usize = 20;
    pub const ITEM_NAME: usize = 80;
    pub const ITEM_DESCRIPTION: usize = 1000;
    pub const UNIT: usize = 4;
    pub const PLATE: usize = 8;
    pub const DRIVER_NAME: usize = 30;
    pub const REFERENCE_TYPE: usize = 3;
    pub const REFERENCE_REASON: usize = 90;
    pub const MAX_LINES: usize = 60;
    pub const MAX_REFERENCES: usize = 40;
}

/// Validate a document against the SII field rules.
/// Returns all validation errors found (not just the first).
pub fn validate_document(doc: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_issuer(&doc.issuer, &mut errors);

    // Every supported variant names its receiver.
    match &doc.receiver {
        Some(receiver) => validate_receiver(receiver, &mut errors),
        None => errors.push(ValidationError::with_rule(
            "receiver",
            format!(
                "receiver is required for document type {}",
                doc.document_type()
            ),
            "Receptor",
        )),
    }

    if let Some(due) = doc.due_date {
        if due < doc.issue_date {
            errors.push(ValidationError::with_rule(
                "due_date",
                "due date must not precede the issue date",
                "FchVenc",
            ));
        }
    }

    if doc.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "at least one detail line is required",
            "Detalle",
        ));
    } else if doc.lines.len() > limits::MAX_LINES {
        errors.push(ValidationError::with_rule(
            "lines",
            format!("at most {} detail lines are allowed", limits::MAX_LINES),
            "Detalle",
        ));
    }

    for (i, line) in doc.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    validate_kind(&doc.kind, &mut errors);

    errors
}

/// Validate a document, folding all errors into one [`DteError::Validation`].
pub fn validate(doc: &Document) -> Result<(), DteError> {
    let errors = validate_document(doc);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DteError::Validation(errors))
    }
}

/// Totals plus per-line amounts, as computed from the detail lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedTotals {
    pub lines: Vec<LineAmounts>,
    pub totals: Totals,
}

/// Compute line amounts and header totals.
///
/// Each line is `round(quantity * unit_price) - round(discount)`; header net
/// and exempt amounts are sums of those rounded line amounts, so the Detalle
/// lines always add up to the Totales block. Fails with
/// [`DteError::AmountOutOfRange`] when a line or a total exceeds
/// [`MAX_AMOUNT`].
pub fn calculate_totals(doc: &Document, tax_rate: Decimal) -> Result<ComputedTotals, DteError> {
    let all_exempt = doc.document_type() == DocumentType::ExemptInvoice;
    let tax_rate = wire_decimal(tax_rate);

    let mut net = 0i64;
    let mut exempt = 0i64;
    let mut lines = Vec::with_capacity(doc.lines.len());

    for line in &doc.lines {
        let amounts = line_amounts(line)?;
        if line.exempt || all_exempt {
            exempt = in_range("exempt", exempt.checked_add(amounts.amount))?;
        } else {
            net = in_range("net", net.checked_add(amounts.amount))?;
        }
        lines.push(amounts);
    }

    let tax = in_range("tax_amount", tax_amount(net, tax_rate))?;
    let total = in_range("total", money::total(net, Some(tax), exempt))?;

    Ok(ComputedTotals {
        lines,
        totals: Totals {
            net,
            exempt,
            tax_rate,
            tax_amount: tax,
            total,
        },
    })
}

/// Amounts for one detail line.
///
/// Quantity, price and discount are taken at their rendered precision.
pub fn line_amounts(line: &DetailLine) -> Result<LineAmounts, DteError> {
    let field = format!("lines[{}].amount", line.line_number.saturating_sub(1));
    let quantity = wire_decimal(line.quantity);
    let unit_price = wire_decimal(line.unit_price);
    let discount_pct = wire_decimal(line.discount_pct);

    let gross = quantity.checked_mul(unit_price);
    let discount = if discount_pct.is_zero() {
        Some(0)
    } else {
        gross
            .and_then(|g| g.checked_mul(discount_pct))
            .and_then(|d| d.checked_div(dec!(100)))
            .and_then(round_pesos)
    };
    let discount = in_range(&field, discount)?;
    let gross = in_range(&field, gross.and_then(round_pesos))?;

    Ok(LineAmounts {
        discount,
        amount: in_range(&field, gross.checked_sub(discount))?,
    })
}

fn in_range(field: &str, amount: Option<i64>) -> Result<i64, DteError> {
    amount
        .filter(|a| a.unsigned_abs() <= MAX_AMOUNT.unsigned_abs())
        .ok_or_else(|| DteError::AmountOutOfRange {
            field: field.to_string(),
        })
}

/// Compare caller-declared totals against computed ones.
///
/// Every declared field must be within `tolerance` pesos of the computed
/// value. The first disagreement is reported; nothing is corrected.
pub fn check_declared_totals(
    declared: &DeclaredTotals,
    computed: &Totals,
    tolerance: i64,
) -> Result<(), DteError> {
    let tolerance = u64::try_from(tolerance).unwrap_or(0);
    let pairs = [
        ("net", declared.net, computed.net),
        ("exempt", declared.exempt, computed.exempt),
        ("tax_amount", declared.tax_amount, computed.tax_amount),
        ("total", declared.total, computed.total),
    ];

    for (field, declared, computed) in pairs {
        if let Some(declared) = declared {
            if declared.abs_diff(computed) > tolerance {
                return Err(DteError::TotalsMismatch {
                    field,
                    computed,
                    declared,
                });
            }
        }
    }
    Ok(())
}

fn validate_issuer(party: &Party, errors: &mut Vec<ValidationError>) {
    required_text(
        &party.legal_name,
        "issuer.legal_name",
        "RznSoc",
        limits::LEGAL_NAME,
        errors,
    );
    match &party.business_activity {
        Some(activity) => required_text(
            activity,
            "issuer.business_activity",
            "GiroEmis",
            limits::ISSUER_ACTIVITY,
            errors,
        ),
        None => errors.push(ValidationError::with_rule(
            "issuer.business_activity",
            "issuer business activity is required",
            "GiroEmis",
        )),
    }

    let address = &party.address;
    match &address.street {
        Some(street) => required_text(
            street,
            "issuer.address.street",
            "DirOrigen",
            limits::STREET,
            errors,
        ),
        None => errors.push(ValidationError::with_rule(
            "issuer.address.street",
            "issuer address is required",
            "DirOrigen",
        )),
    }
    match &address.commune {
        Some(commune) => required_text(
            commune,
            "issuer.address.commune",
            "CmnaOrigen",
            limits::COMMUNE,
            errors,
        ),
        None => errors.push(ValidationError::with_rule(
            "issuer.address.commune",
            "issuer commune is required",
            "CmnaOrigen",
        )),
    }
    optional_text(
        address.city.as_deref(),
        "issuer.address.city",
        "CiudadOrigen",
        limits::CITY,
        errors,
    );
}

fn validate_receiver(party: &Party, errors: &mut Vec<ValidationError>) {
    required_text(
        &party.legal_name,
        "receiver.legal_name",
        "RznSocRecep",
        limits::LEGAL_NAME,
        errors,
    );
    optional_text(
        party.business_activity.as_deref(),
        "receiver.business_activity",
        "GiroRecep",
        limits::RECEIVER_ACTIVITY,
        errors,
    );
    validate_address(&party.address, "receiver.address", "Recep", errors);
}

fn validate_address(address: &Address, prefix: &str, suffix: &str, errors: &mut Vec<ValidationError>) {
    optional_text(
        address.street.as_deref(),
        &format!("{prefix}.street"),
        &format!("Dir{suffix}"),
        limits::STREET,
        errors,
    );
    optional_text(
        address.commune.as_deref(),
        &format!("{prefix}.commune"),
        &format!("Cmna{suffix}"),
        limits::COMMUNE,
        errors,
    );
    optional_text(
        address.city.as_deref(),
        &format!("{prefix}.city"),
        &format!("Ciudad{suffix}"),
        limits::CITY,
        errors,
    );
}

fn validate_line(line: &DetailLine, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.line_number as usize != index + 1 {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.line_number"),
            format!(
                "line number must be {} (consecutive from 1), got {}",
                index + 1,
                line.line_number
            ),
            "NroLinDet",
        ));
    }

    required_text(
        &line.name,
        &format!("{prefix}.name"),
        "NmbItem",
        limits::ITEM_NAME,
        errors,
    );
    optional_text(
        line.description.as_deref(),
        &format!("{prefix}.description"),
        "DscItem",
        limits::ITEM_DESCRIPTION,
        errors,
    );
    optional_text(
        line.unit.as_deref(),
        &format!("{prefix}.unit"),
        "UnmdItem",
        limits::UNIT,
        errors,
    );

    if line.quantity < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.quantity"),
            format!("quantity must not be negative, got {}", line.quantity),
            "QtyItem",
        ));
    }

    if line.unit_price < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.unit_price"),
            format!("unit price must not be negative, got {}", line.unit_price),
            "PrcItem",
        ));
    }

    if line.discount_pct < Decimal::ZERO || line.discount_pct > dec!(100) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.discount_pct"),
            format!(
                "discount percentage must be between 0 and 100, got {}",
                line.discount_pct
            ),
            "DescuentoPct",
        ));
    }

    for (value, field, element) in [
        (line.quantity, "quantity", "QtyItem"),
        (line.unit_price, "unit_price", "PrcItem"),
        (line.discount_pct, "discount_pct", "DescuentoPct"),
    ] {
        if value.normalize().scale() > MAX_DECIMALS {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.{field}"),
                format!("at most {MAX_DECIMALS} decimal places are allowed, got {value}"),
                element,
            ));
        }
    }

    let within_limit = line
        .quantity
        .checked_mul(line.unit_price)
        .is_some_and(|gross| gross.abs() <= Decimal::from(MAX_AMOUNT));
    if !within_limit {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.unit_price"),
            format!(
                "quantity {} times unit price {} exceeds the {MAX_AMOUNT} peso line limit",
                line.quantity, line.unit_price
            ),
            "MontoItem",
        ));
    }
}

fn validate_kind(kind: &DocumentKind, errors: &mut Vec<ValidationError>) {
    match kind {
        DocumentKind::Invoice(_) => {}

        DocumentKind::DispatchGuide(details) => {
            if details.transfer_reason.is_none() {
                errors.push(ValidationError::with_rule(
                    "transfer_reason",
                    "dispatch guide requires a transfer reason",
                    "IndTraslado",
                ));
            }
            if let Some(transport) = &details.transport {
                validate_transport(transport, errors);
            }
        }

        DocumentKind::CreditNote(details) | DocumentKind::DebitNote(details) => {
            validate_references(&details.references, errors);
        }
    }
}

fn validate_transport(transport: &Transport, errors: &mut Vec<ValidationError>) {
    optional_text(
        transport.plate.as_deref(),
        "transport.plate",
        "Patente",
        limits::PLATE,
        errors,
    );
    optional_text(
        transport.driver_name.as_deref(),
        "transport.driver_name",
        "NombreChofer",
        limits::DRIVER_NAME,
        errors,
    );

    // Chofer carries both RUTChofer and NombreChofer or nothing.
    if transport.driver_rut.is_some() != transport.driver_name.is_some() {
        errors.push(ValidationError::with_rule(
            "transport.driver_rut",
            "driver RUT and driver name must be given together",
            "Chofer",
        ));
    }

    validate_address(&transport.destination, "transport.destination", "Dest", errors);
}

fn validate_references(references: &[Reference], errors: &mut Vec<ValidationError>) {
    if references.is_empty() {
        errors.push(ValidationError::with_rule(
            "references",
            "credit and debit notes must reference the document they amend",
            "Referencia",
        ));
    } else if references.len() > limits::MAX_REFERENCES {
        errors.push(ValidationError::with_rule(
            "references",
            format!("at most {} references are allowed", limits::MAX_REFERENCES),
            "Referencia",
        ));
    }

    for (i, reference) in references.iter().enumerate() {
        let prefix = format!("references[{i}]");
        required_text(
            &reference.document_type,
            &format!("{prefix}.document_type"),
            "TpoDocRef",
            limits::REFERENCE_TYPE,
            errors,
        );
        if reference.folio == 0 {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.folio"),
                "referenced folio must be positive",
                "FolioRef",
            ));
        }
        optional_text(
            reference.reason.as_deref(),
            &format!("{prefix}.reason"),
            "RazonRef",
            limits::REFERENCE_REASON,
            errors,
        );
    }
}

fn required_text(
    value: &str,
    field: &str,
    rule: &str,
    max: usize,
    errors: &mut Vec<ValidationError>,
) {
    if value.trim().is_empty() {
        errors.push(ValidationError::with_rule(field, "must not be empty", rule));
        return;
    }
    check_text(value, field, rule, max, errors);
}

fn optional_text(
    value: Option<&str>,
    field: &str,
    rule: &str,
    max: usize,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(value) = value {
        check_text(value, field, rule, max, errors);
    }
}

fn check_text(value: &str, field: &str, rule: &str, max: usize, errors: &mut Vec<ValidationError>) {
    let len = value.chars().count();
    if len > max {
        errors.push(ValidationError::with_rule(
            field,
            format!("exceeds {max} characters (got {len})"),
            rule,
        ));
    }
    if let Some(c) = value.chars().find(|c| u32::from(*c) > 0xFF) {
        errors.push(ValidationError::with_rule(
            field,
            format!("character '{c}' cannot be encoded as ISO-8859-1"),
            rule,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IVA_RATE, LineBuilder, PartyBuilder, Rut};
    use chrono::NaiveDate;

    fn issuer() -> Party {
        PartyBuilder::new(Rut::parse("77117239-3").unwrap(), "Comercial Andes SpA")
            .business_activity("Venta de articulos de oficina")
            .street("Av. Matta 100")
            .commune("Santiago")
            .build()
    }

    fn receiver() -> Party {
        PartyBuilder::new(Rut::from_body(76_086_428).unwrap(), "Cliente Ltda.")
            .street("Calle Falsa 456")
            .commune("Providencia")
            .build()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
    }

    fn invoice() -> Document {
        Document::invoice(date(), issuer())
            .receiver(receiver())
            .add_line(LineBuilder::new("Resma carta", dec!(1), dec!(3900)).build())
            .add_line(LineBuilder::new("Resma oficio", dec!(1), dec!(3900)).build())
            .add_line(LineBuilder::new("Corchetera", dec!(1), dec!(1000)).build())
    }

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn valid_invoice_has_no_errors() {
        assert!(validate_document(&invoice()).is_empty());
        assert!(validate(&invoice()).is_ok());
    }

    #[test]
    fn receiver_is_required() {
        let mut doc = invoice();
        doc.receiver = None;
        let errors = validate_document(&doc);
        assert_eq!(fields(&errors), vec!["receiver"]);
    }

    #[test]
    fn issuer_requirements() {
        let mut doc = invoice();
        doc.issuer.business_activity = None;
        doc.issuer.address.street = None;
        doc.issuer.legal_name = "  ".into();
        let errors = validate_document(&doc);
        let f = fields(&errors);
        assert!(f.contains(&"issuer.legal_name"));
        assert!(f.contains(&"issuer.business_activity"));
        assert!(f.contains(&"issuer.address.street"));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let mut doc = invoice();
        doc.issuer.legal_name = "X".repeat(101);
        doc.lines[0].name = "Y".repeat(81);
        doc.lines[1].unit = Some("CAJAS".into());
        let errors = validate_document(&doc);
        let f = fields(&errors);
        assert!(f.contains(&"issuer.legal_name"));
        assert!(f.contains(&"lines[0].name"));
        assert!(f.contains(&"lines[1].unit"));
        assert_eq!(errors[0].rule.as_deref(), Some("RznSoc"));
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let mut doc = invoice();
        // 100 two-byte characters is still within the limit.
        doc.issuer.legal_name = "Ñ".repeat(100);
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn non_latin1_text_is_rejected() {
        let mut doc = invoice();
        doc.lines[0].name = "Cafe \u{2615}".into();
        let errors = validate_document(&doc);
        assert_eq!(fields(&errors), vec!["lines[0].name"]);
    }

    #[test]
    fn empty_lines_rejected() {
        let mut doc = invoice();
        doc.lines.clear();
        assert_eq!(fields(&validate_document(&doc)), vec!["lines"]);
    }

    #[test]
    fn negative_quantity_and_price_rejected() {
        let mut doc = invoice();
        doc.lines[0].quantity = dec!(-1);
        doc.lines[1].unit_price = dec!(-0.5);
        doc.lines[2].discount_pct = dec!(120);
        let errors = validate_document(&doc);
        let f = fields(&errors);
        assert!(f.contains(&"lines[0].quantity"));
        assert!(f.contains(&"lines[1].unit_price"));
        assert!(f.contains(&"lines[2].discount_pct"));
    }

    #[test]
    fn line_numbers_must_be_consecutive() {
        let mut doc = invoice();
        doc.lines[1].line_number = 5;
        assert_eq!(
            fields(&validate_document(&doc)),
            vec!["lines[1].line_number"]
        );
    }

    #[test]
    fn dispatch_guide_requires_transfer_reason() {
        let doc = Document::dispatch_guide(date(), issuer(), DispatchDetails::default())
            .receiver(receiver())
            .add_line(LineBuilder::new("Pallet", dec!(1), dec!(1000)).build());
        let errors = validate_document(&doc);
        assert_eq!(fields(&errors), vec!["transfer_reason"]);
        assert_eq!(errors[0].rule.as_deref(), Some("IndTraslado"));
    }

    #[test]
    fn driver_needs_rut_and_name() {
        let transport = Transport {
            driver_name: Some("Juan".into()),
            ..Transport::default()
        };
        let doc = Document::dispatch_guide(
            date(),
            issuer(),
            DispatchDetails::new(TransferReason::Sale).transport(transport),
        )
        .receiver(receiver())
        .add_line(LineBuilder::new("Pallet", dec!(1), dec!(1000)).build());
        assert_eq!(
            fields(&validate_document(&doc)),
            vec!["transport.driver_rut"]
        );
    }

    #[test]
    fn notes_require_references() {
        let doc = Document::credit_note(date(), issuer(), NoteDetails::default())
            .receiver(receiver())
            .add_line(LineBuilder::new("Devolucion", dec!(1), dec!(1000)).build());
        assert_eq!(fields(&validate_document(&doc)), vec!["references"]);

        let bad_ref = Reference {
            folio: 0,
            ..Reference::new(DocumentType::Invoice, 1)
        };
        let doc = Document::debit_note(date(), issuer(), NoteDetails::new(bad_ref))
            .receiver(receiver())
            .add_line(LineBuilder::new("Intereses", dec!(1), dec!(1000)).build());
        assert_eq!(
            fields(&validate_document(&doc)),
            vec!["references[0].folio"]
        );
    }

    #[test]
    fn due_date_before_issue_date() {
        let doc = invoice().due_date(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(fields(&validate_document(&doc)), vec!["due_date"]);
    }

    #[test]
    fn totals_from_observed_document() {
        let computed = calculate_totals(&invoice(), IVA_RATE).unwrap();
        assert_eq!(computed.totals.net, 8800);
        assert_eq!(computed.totals.exempt, 0);
        assert_eq!(computed.totals.tax_amount, 1672);
        assert_eq!(computed.totals.total, 10472);
        let amounts: Vec<i64> = computed.lines.iter().map(|l| l.amount).collect();
        assert_eq!(amounts, vec![3900, 3900, 1000]);
    }

    #[test]
    fn exempt_lines_and_exempt_invoices() {
        let doc = invoice().add_line(LineBuilder::new("Flete", dec!(1), dec!(5000)).exempt().build());
        let t = calculate_totals(&doc, IVA_RATE).unwrap().totals;
        assert_eq!(t.net, 8800);
        assert_eq!(t.exempt, 5000);
        assert_eq!(t.total, 8800 + 1672 + 5000);

        let doc = Document::exempt_invoice(date(), issuer())
            .receiver(receiver())
            .add_line(LineBuilder::new("Asesoria", dec!(2), dec!(50000)).build());
        let t = calculate_totals(&doc, IVA_RATE).unwrap().totals;
        assert_eq!(t.net, 0);
        assert_eq!(t.exempt, 100_000);
        assert_eq!(t.tax_amount, 0);
        assert_eq!(t.total, 100_000);
    }

    #[test]
    fn discounts_and_fractional_quantities() {
        let line = LineBuilder::new("Cable", dec!(2.5), dec!(1999))
            .discount_pct(dec!(10))
            .build();
        // 2.5 * 1999 = 4997.5 -> 4998; discount 499.75 -> 500
        assert_eq!(
            line_amounts(&line).unwrap(),
            LineAmounts {
                discount: 500,
                amount: 4498
            }
        );
    }

    fn pow10(exp: u32) -> Decimal {
        Decimal::from(10i64.pow(exp))
    }

    #[test]
    fn oversized_line_amounts_are_rejected() {
        // 1e15 * 1e15 does not fit a Decimal at all.
        let doc = invoice().add_line(LineBuilder::new("Lote", pow10(15), pow10(15)).build());
        let errors = validate_document(&doc);
        assert_eq!(fields(&errors), vec!["lines[3].unit_price"]);
        assert_eq!(errors[0].rule.as_deref(), Some("MontoItem"));
        assert!(matches!(
            calculate_totals(&doc, IVA_RATE),
            Err(DteError::AmountOutOfRange { ref field }) if field == "lines[3].amount"
        ));

        // 1.5e19 fits a Decimal but not an i64.
        let doc = invoice().add_line(LineBuilder::new("Lote", dec!(3), dec!(5) * pow10(18)).build());
        assert_eq!(fields(&validate_document(&doc)), vec!["lines[3].unit_price"]);
        assert!(calculate_totals(&doc, IVA_RATE).is_err());

        let at_limit = LineBuilder::new("Lote", dec!(1), Decimal::from(MAX_AMOUNT)).build();
        assert!(validate_document(&invoice().add_line(at_limit)).is_empty());
    }

    #[test]
    fn header_sum_beyond_limit_is_an_error() {
        // Each line is valid on its own; together they overflow the header.
        let mut doc = invoice();
        for _ in 0..20 {
            doc = doc.add_line(LineBuilder::new("Lote", pow10(10), dec!(9) * pow10(7)).build());
        }
        assert!(validate_document(&doc).is_empty());
        assert!(matches!(
            calculate_totals(&doc, IVA_RATE),
            Err(DteError::AmountOutOfRange { ref field }) if field == "net"
        ));
    }

    #[test]
    fn excess_decimal_places_rejected() {
        let doc = invoice().add_line(
            LineBuilder::new("Tornillo", dec!(10000000), dec!(0.00000049))
                .discount_pct(dec!(0.1234567))
                .build(),
        );
        assert_eq!(
            fields(&validate_document(&doc)),
            vec!["lines[3].unit_price", "lines[3].discount_pct"]
        );

        // Trailing zeros do not count.
        let doc = invoice().add_line(LineBuilder::new("Cable", dec!(2.5000000), dec!(10)).build());
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn line_amounts_use_rendered_precision() {
        let line = LineBuilder::new("Tornillo", dec!(10000000), dec!(0.00000049)).build();
        // PrcItem renders as 0, so MontoItem must be 0 as well.
        assert_eq!(line_amounts(&line).unwrap().amount, 0);
    }

    #[test]
    fn declared_totals_checked_within_tolerance() {
        let computed = calculate_totals(&invoice(), IVA_RATE).unwrap().totals;
        assert!(check_declared_totals(&DeclaredTotals::total(10472), &computed, 1).is_ok());
        assert!(check_declared_totals(&DeclaredTotals::total(10473), &computed, 1).is_ok());

        let err = check_declared_totals(&DeclaredTotals::total(10000), &computed, 1).unwrap_err();
        match err {
            DteError::TotalsMismatch {
                field,
                computed,
                declared,
            } => {
                assert_eq!(field, "total");
                assert_eq!(computed, 10472);
                assert_eq!(declared, 10000);
            }
            other => panic!("unexpected error: {other}"),
        }

        let declared = DeclaredTotals {
            net: Some(8800),
            tax_amount: Some(1500),
            ..DeclaredTotals::default()
        };
        assert!(matches!(
            check_declared_totals(&declared, &computed, 1),
            Err(DteError::TotalsMismatch {
                field: "tax_amount",
                ..
            })
        ));
    }
}
