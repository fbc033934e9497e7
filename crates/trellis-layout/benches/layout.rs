//! Benchmarks for grid and flow layout.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_core::{NodeId, Size};
use trellis_layout::{
    compute_flow_layout, compute_grid_layout, Breakpoint, FlowItem, FlowSpec, GridContainer,
    GridPlacement, GridSpec, Justify, LayoutStrategy, ResolvedPlacement, ResponsiveOverride,
    SizeTable,
};

fn placements(n: usize) -> Vec<ResolvedPlacement> {
    (0..n)
        .map(|i| ResolvedPlacement {
            span: [6, 8, 12, 4][i % 4],
            offset: (i % 3) as u32,
        })
        .collect()
}

fn flow_items(n: usize) -> Vec<FlowItem> {
    (0..n)
        .map(|i| Some(Size::new(40.0 + (i % 7) as f32 * 15.0, 30.0 + (i % 3) as f32 * 10.0)))
        .collect()
}

fn bench_grid(c: &mut Criterion) {
    let spec = GridSpec::new()
        .with_gutter(16.0)
        .with_justify(Justify::SpaceBetween);

    for n in [10, 100, 1000] {
        let items = placements(n);
        c.bench_function(&format!("grid_layout_{n}_children"), |b| {
            b.iter(|| {
                compute_grid_layout(
                    black_box(&spec),
                    black_box(1280.0),
                    black_box(&items),
                    |i, _| 40.0 + (i % 5) as f32,
                )
            })
        });
    }
}

fn bench_flow(c: &mut Criterion) {
    let spec = FlowSpec::uniform(8.0);

    for n in [10, 100, 1000] {
        let items = flow_items(n);
        c.bench_function(&format!("flow_layout_{n}_children"), |b| {
            b.iter(|| compute_flow_layout(black_box(&spec), black_box(1024.0), black_box(&items)))
        });
    }
}

fn bench_grid_container_responsive(c: &mut Criterion) {
    let mut grid = GridContainer::new(GridSpec::new().with_gutter(12.0));
    for i in 0..100 {
        grid.push(
            NodeId::new(i, 0),
            GridPlacement::span(6)
                .at(Breakpoint::Xs, ResponsiveOverride::span(24))
                .at(Breakpoint::Sm, ResponsiveOverride::span(12)),
        );
    }
    let mut measure = SizeTable::new();

    c.bench_function("grid_container_resize_across_breakpoints", |b| {
        b.iter(|| {
            for width in [480.0, 800.0, 1300.0] {
                black_box(grid.arrange(black_box(width), &mut measure));
            }
        })
    });
}

criterion_group!(benches, bench_grid, bench_flow, bench_grid_container_responsive);
criterion_main!(benches);
