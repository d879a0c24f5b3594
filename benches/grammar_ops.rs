//! Benchmarks for grammar composition, parsing, and dependency ordering.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nomenclator::deps::insertion_order;
use nomenclator::entry::CatalogEntry;
use nomenclator::grammar::{Grammar, StructuredName};
use nomenclator::provenance::Provenance;
use nomenclator::unit::Unit;

fn bench_compose(c: &mut Criterion) {
    let grammar = Grammar::default();
    let parts = StructuredName::new()
        .with("component", "radial")
        .with("subject", "electron")
        .with("physical_base", "heat_flux");

    c.bench_function("compose_three_segments", |bench| {
        bench.iter(|| black_box(grammar.compose(&parts).unwrap()))
    });
}

fn bench_parse(c: &mut Criterion) {
    let grammar = Grammar::default();

    c.bench_function("parse_prefixed_name", |bench| {
        bench.iter(|| {
            black_box(
                grammar
                    .parse("radial_component_of_electron_heat_flux")
                    .unwrap(),
            )
        })
    });

    c.bench_function("parse_suffixed_name", |bench| {
        bench.iter(|| {
            black_box(
                grammar
                    .parse("magnetic_field_at_plasma_boundary_due_to_external_coil")
                    .unwrap(),
            )
        })
    });
}

/// Layered batch: every entry past the root depends on an earlier one, so
/// the ordering pass has real graph work to do.
fn layered_entries(n: usize) -> Vec<CatalogEntry> {
    (0..n)
        .map(|i| {
            let name = format!("quantity_{i}");
            if i == 0 {
                CatalogEntry::scalar(name, "Layer root.", Unit::dimensionless())
            } else {
                CatalogEntry::derived_scalar(
                    name,
                    "Derived layer.",
                    Unit::dimensionless(),
                    Provenance::expression("a + b", [format!("quantity_{}", i / 2)]),
                )
            }
        })
        .collect()
}

fn bench_ordering(c: &mut Criterion) {
    let entries = layered_entries(64);

    c.bench_function("insertion_order_64", |bench| {
        bench.iter(|| black_box(insertion_order(&entries).unwrap()))
    });
}

criterion_group!(benches, bench_compose, bench_parse, bench_ordering);
criterion_main!(benches);
