#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::doc_markdown)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layout engine for Trellis.
//!
//! Pure layout algorithms over [`NodeId`](trellis_core::NodeId)s, with child
//! sizes supplied through the [`Measure`] trait:
//!
//! - **Grid**: 24-column responsive rows with span, offset, per-breakpoint
//!   overrides, gutter, justify and align ([`GridContainer`])
//! - **Flow**: greedy left-to-right line packing ([`FlowContainer`])
//! - **Group** and **Stacked**: vertical stack and pages
//!   ([`GroupContainer`], [`StackedContainer`])
//!
//! [`RelayoutScheduler`] coalesces invalidations per container and
//! [`MeasureCache`] memoizes nested height-for-width queries.

mod breakpoint;
mod cache;
mod config;
mod container;
mod error;
mod flow;
mod grid;
mod scheduler;
mod stack;
mod strategy;

pub use breakpoint::{Breakpoint, BreakpointTable};
pub use cache::{MeasureCache, MeasureKey};
pub use config::{FlowDefaults, GridDefaults, LayoutConfig, DEFAULT_MAX_FLUSH_PASSES};
pub use container::{Container, ContainerKind};
pub use error::LayoutError;
pub use flow::{compute_flow_layout, FlowContainer, FlowItem, FlowLayout, FlowSpec, DEFAULT_FLOW_SPACING};
pub use grid::{
    compute_grid_layout, pack_lines, Align, GridChild, GridContainer, GridLayout, GridLine,
    GridPlacement, GridSpec, Justify, ResolvedPlacement, ResponsiveOverride, GRID_COLUMNS,
};
pub use scheduler::{RelayoutScheduler, DEFAULT_DEBOUNCE};
pub use stack::{GroupContainer, StackedContainer};
pub use strategy::{
    Arrangement, LayoutStrategy, Measure, SizeTable, DEFAULT_CONTAINER_WIDTH, DEFAULT_FALLBACK_SIZE,
};
