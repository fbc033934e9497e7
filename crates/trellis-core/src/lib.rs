#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Core types for the Trellis composition layer.
//!
//! This crate provides the vocabulary shared by layout and composition:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Node identity: [`NodeId`]
//! - The host interface every node is backed by: [`Element`]
//! - Theme change broadcasting: [`ThemeBus`]

mod geometry;
mod node;
mod theme;

pub use geometry::{Point, Rect, Size};
pub use node::{Element, FixedElement, NodeId};
pub use theme::{SubscriptionId, ThemeBus, ThemeCallback, ThemeEvent, ThemeMode};
