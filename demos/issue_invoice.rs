use chrono::NaiveDate;
use dte::caf::{FolioAllocator, FolioRange};
use dte::core::*;
use dte::dte::DocumentBuilder;
use rust_decimal_macros::dec;

const CAF: &str = r#"<?xml version="1.0"?>
<AUTORIZACION>
<CAF version="1.0">
<DA>
<RE>77117239-3</RE>
<RS>COMERCIAL ANDES SPA</RS>
<TD>33</TD>
<RNG><D>1501</D><H>1600</H></RNG>
<FA>2025-11-03</FA>
<RSAPK><M>0a4O6Kbx8Qj3K4iWSP4w7KneZYeJ+g==</M><E>Aw==</E></RSAPK>
<IDK>100</IDK>
</DA>
<FRMA algoritmo="SHA1withRSA">g1AQX0sy8NJugX52k2hTJEZAE9Cuul6p</FRMA>
</CAF>
</AUTORIZACION>"#;

fn main() -> Result<(), DteError> {
    // Load the authorization and replay folios already issued elsewhere
    let allocator = FolioAllocator::new().with_low_stock_threshold(20);
    allocator.load(FolioRange::from_caf_xml(CAF)?)?;
    for issued in 1501..=1503 {
        allocator.mark_claimed(DocumentType::Invoice, issued)?;
    }

    let issuer = PartyBuilder::new("77117239-3".parse()?, "Comercial Andes SpA")
        .business_activity("Venta al por mayor de artículos de oficina")
        .street("Av. Providencia 1234, Of. 501")
        .commune("Providencia")
        .city("Santiago")
        .build();
    let receiver = PartyBuilder::new("76.086.428-5".parse()?, "Distribuidora Ñuble Ltda.")
        .business_activity("Ferretería")
        .street("Av. Libertad 980")
        .commune("Chillán")
        .build();

    let date = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap_or_default();
    let invoice = Document::invoice(date, issuer)
        .receiver(receiver)
        .payment_method(PaymentMethod::Credit)
        .due_date(date + chrono::Days::new(30))
        .add_line(
            LineBuilder::new("Resma carta 75g", dec!(1), dec!(3900))
                .unit("UN")
                .build(),
        )
        .add_line(
            LineBuilder::new("Resma oficio 75g", dec!(1), dec!(3900))
                .unit("UN")
                .build(),
        )
        .add_line(LineBuilder::new("Archivador lomo ancho", dec!(1), dec!(1000)).build())
        .declared_total(10472);

    let rendered = DocumentBuilder::new(&allocator).build(&invoice)?;
    println!(
        "Folio {} ({}): total ${}",
        rendered.folio(),
        rendered.document_type().name(),
        format_amount(rendered.totals().total)
    );
    println!("Son: {}", rendered.amount_in_words());
    println!("{}", rendered.xml());

    if let Some(info) = allocator.caf_info(DocumentType::Invoice) {
        println!("Folios remaining: {} of {}", info.remaining, info.total);
    }
    Ok(())
}
