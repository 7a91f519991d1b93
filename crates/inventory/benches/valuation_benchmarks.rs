use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, TimeZone, Utc};
use costbook_core::{Money, ProductId};
use costbook_inventory::{FixedClock, Product, SequenceBatchIds, ValuationEngine};

fn stocked_product(layers: u64) -> (ValuationEngine<SequenceBatchIds, FixedClock>, Product) {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let engine = ValuationEngine::with_parts(SequenceBatchIds, FixedClock(t0));
    let mut product = Product::new(ProductId::new(), "Bench").unwrap();
    for i in 0..layers {
        product = engine
            .apply_purchase_at(
                &product,
                10,
                Money::from_cents(100 + (i as i64 % 37)),
                t0 + Duration::minutes(i as i64),
            )
            .unwrap();
    }
    (engine, product)
}

fn bench_sale(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_sale");
    for layers in [10u64, 100, 1_000] {
        let (engine, product) = stocked_product(layers);
        let sell = product.current_quantity() / 2;
        group.throughput(Throughput::Elements(layers));
        group.bench_with_input(BenchmarkId::from_parameter(layers), &product, |b, p| {
            b.iter(|| engine.apply_sale(black_box(p), black_box(sell)).unwrap())
        });
    }
    group.finish();
}

fn bench_purchase(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_purchase");
    for layers in [10u64, 100, 1_000] {
        let (engine, product) = stocked_product(layers);
        group.bench_with_input(BenchmarkId::from_parameter(layers), &product, |b, p| {
            b.iter(|| {
                engine
                    .apply_purchase(black_box(p), 5, Money::from_cents(250))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sale, bench_purchase);
criterion_main!(benches);
