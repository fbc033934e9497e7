#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Trellis: declarative UI composition with responsive layout.
//!
//! Application code opens container scopes and builds nodes inside them;
//! each node attaches itself to the innermost open container. Containers
//! lay out their children with one of four strategies (24-column grid,
//! flow, group, stacked pages), re-running after a short debounce whenever
//! their children, settings or width change.
//!
//! # Quick Start
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Composer::new();
//! let row = ui.grid().build();
//! ui.set_gutter(row, 10.0);
//!
//! let cards: Vec<NodeId> = ui.scope(row, |ui| {
//!     (0..3)
//!         .map(|_| ui.leaf(FixedElement::new(200.0, 120.0)).span(8).build())
//!         .collect()
//! });
//!
//! ui.notify_resized(row, Size::ZERO, Size::new(960.0, 600.0));
//! ui.flush();
//!
//! let frame = ui.tree().frame(cards[2]).unwrap();
//! assert!((frame.right() - 960.0).abs() < 0.01);
//! ```

mod composer;
mod context;
mod error;
mod tree;

pub use composer::{Composer, NodeBuilder, ScopeGuard};
pub use context::AttachmentStack;
pub use error::TreeError;
pub use tree::UiTree;

pub use trellis_core as core;
pub use trellis_layout as layout;

/// Commonly used types.
pub mod prelude {
    pub use crate::{Composer, ScopeGuard, TreeError, UiTree};
    pub use trellis_core::{
        Element, FixedElement, NodeId, Point, Rect, Size, ThemeEvent, ThemeMode,
    };
    pub use trellis_layout::{
        Align, Breakpoint, Container, ContainerKind, GridPlacement, Justify, LayoutConfig,
        ResponsiveOverride,
    };
}
