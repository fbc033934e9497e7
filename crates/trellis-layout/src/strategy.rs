//! The layout strategy interface shared by every container kind.

use crate::grid::GridPlacement;
use std::collections::{HashMap, HashSet};
use trellis_core::{NodeId, Rect, Size};

/// Width assumed for a container whose measured width is zero or unknown.
pub const DEFAULT_CONTAINER_WIDTH: f32 = 800.0;

/// Size substituted for missing, zero or negative size hints.
pub const DEFAULT_FALLBACK_SIZE: Size = Size::new(50.0, 50.0);

/// Source of child measurements during a layout pass.
pub trait Measure {
    /// Size hint for `node`.
    ///
    /// `width` is the width the container is about to assign, when the
    /// algorithm already knows it; containers use it to answer with their
    /// height-for-width. Leaf hints are never zero, negative or non-finite;
    /// an empty container may report a zero height.
    fn size_hint(&mut self, node: NodeId, width: Option<f32>) -> Size;

    /// Size hint for `node` when the container only bounds its width.
    ///
    /// Leaves keep their own width and may overflow `max_width`. Nested
    /// containers take their own width capped at `max_width`, or
    /// `max_width` itself when they have none.
    fn size_hint_within(&mut self, node: NodeId, max_width: f32) -> Size {
        self.size_hint(node, Some(max_width))
    }

    /// Whether `node` takes part in layout.
    fn is_visible(&self, node: NodeId) -> bool;

    /// Width to use when a container has no usable width of its own.
    fn fallback_width(&self) -> f32 {
        DEFAULT_CONTAINER_WIDTH
    }
}

/// Replace an unusable width with `fallback`.
pub(crate) fn effective_width(width: f32, fallback: f32) -> f32 {
    if width.is_finite() && width > 0.0 {
        width
    } else if fallback.is_finite() && fallback > 0.0 {
        fallback
    } else {
        DEFAULT_CONTAINER_WIDTH
    }
}

/// Geometry produced by one layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arrangement {
    /// Frame for every placed child, relative to the container, in child order.
    pub frames: Vec<(NodeId, Rect)>,
    /// Height the container needs; reported to its own parent as minimum height.
    pub height: f32,
}

impl Arrangement {
    /// Frame assigned to `node`, if it was placed.
    #[must_use]
    pub fn frame_of(&self, node: NodeId) -> Option<Rect> {
        self.frames
            .iter()
            .find(|(id, _)| *id == node)
            .map(|&(_, frame)| frame)
    }
}

/// A container layout algorithm.
pub trait LayoutStrategy {
    /// Append a child.
    ///
    /// `placement` is the child's column scale; only grids consume it.
    fn add_child(&mut self, node: NodeId, placement: Option<&GridPlacement>);

    /// Remove a child. Returns false if it was not a child.
    fn remove_child(&mut self, node: NodeId) -> bool;

    /// Children in insertion order.
    fn children(&self) -> Vec<NodeId>;

    /// Whether `node` is a direct child.
    fn contains(&self, node: NodeId) -> bool {
        self.children().contains(&node)
    }

    /// Lay out children for `width`, updating derived state.
    fn arrange(&mut self, width: f32, measure: &mut dyn Measure) -> Arrangement;

    /// Height the container would need at `width`, without touching any state.
    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32;
}

/// A [`Measure`] backed by a fixed table of sizes.
///
/// Nodes missing from the table measure as the fallback size. Useful for
/// query-only layout and for tests.
#[derive(Debug, Clone, Default)]
pub struct SizeTable {
    sizes: HashMap<NodeId, Size>,
    hidden: HashSet<NodeId>,
    fallback: Option<Size>,
    fallback_width: Option<f32>,
}

impl SizeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the size hint of `node`.
    pub fn insert(&mut self, node: NodeId, size: Size) -> &mut Self {
        self.sizes.insert(node, size);
        self
    }

    /// Mark `node` hidden or visible.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) -> &mut Self {
        if hidden {
            self.hidden.insert(node);
        } else {
            self.hidden.remove(&node);
        }
        self
    }

    /// Override the fallback size.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: Size) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Override the fallback container width.
    #[must_use]
    pub const fn with_fallback_width(mut self, width: f32) -> Self {
        self.fallback_width = Some(width);
        self
    }
}

impl Measure for SizeTable {
    fn size_hint(&mut self, node: NodeId, _width: Option<f32>) -> Size {
        let fallback = self.fallback.unwrap_or(DEFAULT_FALLBACK_SIZE);
        self.sizes
            .get(&node)
            .copied()
            .unwrap_or(fallback)
            .or_fallback(fallback)
    }

    fn is_visible(&self, node: NodeId) -> bool {
        !self.hidden.contains(&node)
    }

    fn fallback_width(&self) -> f32 {
        self.fallback_width.unwrap_or(DEFAULT_CONTAINER_WIDTH)
    }
}
