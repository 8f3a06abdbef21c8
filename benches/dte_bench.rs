use chrono::NaiveDate;
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use dte::caf::{FolioAllocator, FolioRange};
use dte::core::*;
use dte::dte::{DocumentBuilder, to_dte_xml};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
}

fn party(rut: &str, name: &str) -> Party {
    PartyBuilder::new(rut.parse().unwrap(), name)
        .business_activity("Comercio al por mayor")
        .street("Av. Libertador Bernardo O'Higgins 1449")
        .commune("Santiago")
        .build()
}

fn invoice_with_lines(count: usize) -> Document {
    let mut doc = Document::invoice(test_date(), party("77117239-3", "Benchmark SpA"))
        .receiver(party("76086428-5", "Cliente Ltda."));
    for i in 1..=count {
        doc = doc.add_line(
            LineBuilder::new(format!("Item {i}"), dec!(3), dec!(1990))
                .unit("UN")
                .discount_pct(dec!(5))
                .build(),
        );
    }
    doc
}

fn allocator(len: u64) -> FolioAllocator {
    let allocator = FolioAllocator::new().with_low_stock_threshold(0);
    allocator
        .load(FolioRange::new(DocumentType::Invoice, 1, len, test_date(), "caf").unwrap())
        .unwrap();
    allocator
}

fn bench_rut_parse(c: &mut Criterion) {
    c.bench_function("rut_parse_dotted", |b| {
        b.iter(|| black_box(Rut::parse(black_box("77.117.239-3"))));
    });
}

fn bench_amount_in_words(c: &mut Criterion) {
    c.bench_function("amount_in_words", |b| {
        b.iter(|| black_box(amount_in_words(black_box(1_234_567_890))));
    });
}

fn bench_validate(c: &mut Criterion) {
    let doc = invoice_with_lines(60);
    c.bench_function("validate_60_lines", |b| {
        b.iter(|| black_box(validate_document(black_box(&doc))));
    });
}

fn bench_totals(c: &mut Criterion) {
    let doc = invoice_with_lines(60);
    c.bench_function("calculate_totals_60_lines", |b| {
        b.iter(|| black_box(calculate_totals(black_box(&doc), IVA_RATE).unwrap()));
    });
}

fn bench_render(c: &mut Criterion) {
    let doc = invoice_with_lines(10);
    let computed = calculate_totals(&doc, IVA_RATE).unwrap();
    c.bench_function("render_10_lines", |b| {
        b.iter(|| black_box(to_dte_xml(black_box(&doc), 1, &computed)));
    });
}

fn bench_next_folio(c: &mut Criterion) {
    c.bench_function("next_folio_10k_claimed", |b| {
        b.iter_batched(
            || {
                let allocator = allocator(20_000);
                for _ in 0..10_000 {
                    allocator.next_folio(DocumentType::Invoice).unwrap();
                }
                allocator
            },
            |allocator| black_box(allocator.next_folio(DocumentType::Invoice)),
            BatchSize::LargeInput,
        );
    });
}

fn bench_build(c: &mut Criterion) {
    let doc = invoice_with_lines(10);
    c.bench_function("build_10_lines", |b| {
        b.iter_batched(
            || allocator(1),
            |allocator| black_box(DocumentBuilder::new(&allocator).build(&doc)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_rut_parse,
    bench_amount_in_words,
    bench_validate,
    bench_totals,
    bench_render,
    bench_next_folio,
    bench_build,
);
criterion_main!(benches);
