//! Layout benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_core::{Length, Node, Property, Session};
use trellis_layout::{layout, AvailableSize, EstimatedTextMeasure, LayoutOptions, NumericDomain};

/// A column of `rows` rows, each holding a growing label and a button.
fn build_list(rows: usize) -> Node {
    let mut s = Session::new();
    let mut column = s.column();
    column.set_style(Property::Gap, Length::px(4.0)).unwrap();
    for i in 0..rows {
        let label = s
            .text(format!("Item {i}"))
            .with_style(Property::FlexGrow, 1.0)
            .unwrap();
        let row = s
            .row()
            .with_children([label, s.button("Open")])
            .unwrap();
        column.append_child(row).unwrap();
    }
    column
}

fn layout_list(c: &mut Criterion, name: &str, domain: NumericDomain) {
    let tree = build_list(500);
    let resolved = trellis_style::resolve(&tree);
    let measure = EstimatedTextMeasure::default();
    let options = LayoutOptions::default().with_domain(domain);
    c.bench_function(name, |b| {
        b.iter(|| layout(black_box(&resolved), AvailableSize::new(1024.0, 768.0), &measure, &options))
    });
}

fn layout_float(c: &mut Criterion) {
    layout_list(c, "layout_list_float", NumericDomain::Float);
}

fn layout_fixed(c: &mut Criterion) {
    layout_list(c, "layout_list_fixed", NumericDomain::Fixed);
}

criterion_group!(benches, layout_float, layout_fixed);
criterion_main!(benches);
