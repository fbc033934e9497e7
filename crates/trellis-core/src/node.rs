//! Node identity and the host element interface.
//!
//! The core never renders anything itself. Every node is backed by an
//! [`Element`] supplied by the host UI runtime; the core only asks it for a
//! size hint and visibility, and hands it the geometry it computed.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle to a node in a composition tree.
///
/// The generation is bumped whenever a slot is reused, so a handle kept
/// after its node was destroyed never resolves to the slot's new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Create a node ID from raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Host-side element backing a node.
///
/// Implementations are supplied by the host runtime (buttons, cards,
/// labels, or the host widgets that visually represent containers).
pub trait Element: Send {
    /// Preferred size of the element.
    ///
    /// Either dimension may be zero or negative when the host has no
    /// opinion; layout substitutes a fallback in that case.
    fn measure_intrinsic_size(&self) -> Size;

    /// Whether the element currently takes part in layout.
    fn is_visible(&self) -> bool {
        true
    }

    /// Receive the geometry computed for this element, relative to its
    /// owning container.
    fn set_geometry(&mut self, frame: Rect);
}

/// An element with a fixed preferred size.
///
/// Useful for spacers, for hosts that size elements up front, and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedElement {
    size: Size,
    visible: bool,
    frame: Rect,
}

impl FixedElement {
    /// Create a visible element with the given preferred size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            visible: true,
            frame: Rect::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Create an element that reports no size hint at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Set visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Last geometry received.
    #[must_use]
    pub const fn frame(&self) -> Rect {
        self.frame
    }
}

impl Element for FixedElement {
    fn measure_intrinsic_size(&self) -> Size {
        self.size
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_geometry(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_parts() {
        let id = NodeId::new(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_eq!(id.to_string(), "#7v3");
    }

    #[test]
    fn test_node_id_generation_distinguishes() {
        assert_ne!(NodeId::new(1, 0), NodeId::new(1, 1));
    }

    #[test]
    fn test_fixed_element_records_geometry() {
        let mut element = FixedElement::new(100.0, 30.0);
        assert!(element.is_visible());
        assert_eq!(element.measure_intrinsic_size(), Size::new(100.0, 30.0));

        element.set_geometry(Rect::new(5.0, 6.0, 100.0, 30.0));
        assert_eq!(element.frame(), Rect::new(5.0, 6.0, 100.0, 30.0));
    }

    #[test]
    fn test_fixed_element_hidden() {
        let element = FixedElement::new(10.0, 10.0).with_visible(false);
        assert!(!element.is_visible());
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(FixedElement::empty().measure_intrinsic_size(), Size::ZERO);
    }
}
