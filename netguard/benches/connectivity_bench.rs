use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netguard::prelude::*;
use netguard::schematic::{Label, LabelType, Position, Wire};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A grid of horizontal and vertical wires crossing without junctions.
fn wire_grid(size: usize) -> Schematic {
    let pitch = 2.54;
    let extent = pitch * size as f64;
    let mut schematic = Schematic::default();
    for i in 0..size {
        let offset = pitch * i as f64;
        schematic
            .wires
            .push(Wire::new(vec![Position::new(0.0, offset), Position::new(extent, offset)]));
        schematic
            .wires
            .push(Wire::new(vec![Position::new(offset, 0.0), Position::new(offset, extent)]));
        schematic.labels.push(Label::new(
            format!("ROW{}", i),
            Position::new(0.0, offset),
            LabelType::Local,
        ));
    }
    schematic
}

fn bench_analyze_fixture(c: &mut Criterion) {
    let schematic = Schematic::load_json(&fixture_path("divider.json")).unwrap();
    let library = SymbolLibrary::load_json(&fixture_path("symbols.json")).unwrap();

    c.bench_function("analyze_nets_divider", |b| {
        b.iter(|| NetExtractor::new(black_box(&schematic), &library).analyze_nets());
    });
}

fn bench_analyze_grid(c: &mut Criterion) {
    let schematic = wire_grid(40);
    let library = SymbolLibrary::new();

    c.bench_function("analyze_nets_grid_40", |b| {
        b.iter(|| NetExtractor::new(black_box(&schematic), &library).analyze_nets());
    });
}

fn bench_erc(c: &mut Criterion) {
    let schematic = Schematic::load_json(&fixture_path("divider.json")).unwrap();
    let library = SymbolLibrary::load_json(&fixture_path("symbols.json")).unwrap();

    c.bench_function("erc_check_divider", |b| {
        b.iter(|| NetguardCore::check(black_box(&schematic), &library, black_box(ErcConfig::default())));
    });
}

criterion_group!(benches, bench_analyze_fixture, bench_analyze_grid, bench_erc);
criterion_main!(benches);
