//! A responsive dashboard composed with nested scopes.
//!
//! Run with `RUST_LOG=trellis=debug` to watch relayouts being coalesced.

use std::time::{Duration, Instant};
use trellis::prelude::*;
use tracing_subscriber::EnvFilter;

fn print_tree(tree: &UiTree, node: NodeId, depth: usize) {
    let label = tree
        .kind(node)
        .map_or_else(|| "leaf".to_string(), |kind| kind.to_string());
    let frame = tree
        .frame(node)
        .map(|f| format!("{:.0},{:.0} {:.0}x{:.0}", f.x, f.y, f.width, f.height))
        .unwrap_or_else(|| "-".to_string());
    println!("{:indent$}{label} {node} [{frame}]", "", indent = depth * 2);
    for child in tree.children(node) {
        print_tree(tree, child, depth + 1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ui = Composer::new();
    let page = ui.group().build();
    ui.set_spacing(page, 16.0);

    ui.scope(page, |ui| {
        let header = ui.grid().build();
        ui.set_gutter(header, 12.0);
        ui.set_justify(header, Justify::SpaceBetween);
        ui.scope(header, |ui| {
            ui.leaf(FixedElement::new(180.0, 48.0)).span(6).build();
            ui.leaf(FixedElement::new(120.0, 32.0))
                .span(4)
                .at(Breakpoint::Xs, ResponsiveOverride::span(12))
                .build();
        });

        let stats = ui.grid().build();
        ui.set_gutter(stats, 12.0);
        ui.set_align_named(stats, "middle");
        ui.scope(stats, |ui| {
            for height in [90.0, 120.0, 90.0, 60.0] {
                ui.leaf(FixedElement::new(0.0, height))
                    .span(6)
                    .at(Breakpoint::Xs, ResponsiveOverride::span(12))
                    .on_theme(|node, event| {
                        tracing::info!(%node, mode = ?event.mode, "restyle card");
                    })
                    .build();
            }
        });

        let projects = ui.flow().build();
        ui.set_spacing(projects, 10.0);
        let mut guard = ui.open(projects);
        for i in 0..9 {
            guard
                .leaf(FixedElement::new(140.0 + (i % 3) as f32 * 20.0, 100.0))
                .build();
        }
    });

    for width in [1280.0, 900.0, 600.0] {
        ui.notify_resized(page, Size::ZERO, Size::new(width, 800.0));
        ui.notify_shown(page);

        // Drive the debounce the way a host event loop would.
        let mut now = Instant::now();
        while let Some(deadline) = ui.tree().next_deadline() {
            now = now.max(deadline);
            ui.pump(now);
            now += Duration::from_millis(1);
        }

        println!("== width {width} ==");
        print_tree(ui.tree(), page, 0);
    }

    let notified = ui.toggle_theme();
    println!("theme is now {:?}, {notified} subscribers notified", ui.tree().theme_mode());
}
