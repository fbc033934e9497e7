//! Vertical group and stacked-pages containers.

use crate::grid::GridPlacement;
use crate::strategy::{effective_width, Arrangement, LayoutStrategy, Measure};
use trellis_core::{NodeId, Rect};

fn sanitize(spacing: f32) -> f32 {
    if spacing.is_finite() {
        spacing.max(0.0)
    } else {
        0.0
    }
}

/// Children stacked top to bottom at full width.
#[derive(Debug, Clone, Default)]
pub struct GroupContainer {
    spacing: f32,
    children: Vec<NodeId>,
}

impl GroupContainer {
    /// Create an empty group with `spacing` between children.
    #[must_use]
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing: sanitize(spacing),
            children: Vec::new(),
        }
    }

    /// Space between consecutive children.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Set the space between consecutive children.
    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = sanitize(spacing);
    }

    fn compute(&self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        let width = effective_width(width, measure.fallback_width());
        let mut frames = Vec::with_capacity(self.children.len());
        let mut y = 0.0;

        for &node in &self.children {
            if !measure.is_visible(node) {
                continue;
            }
            if !frames.is_empty() {
                y += self.spacing;
            }
            let h = measure.size_hint(node, Some(width)).height;
            frames.push((node, Rect::new(0.0, y, width, h)));
            y += h;
        }

        Arrangement { frames, height: y }
    }
}

impl LayoutStrategy for GroupContainer {
    fn add_child(&mut self, node: NodeId, _placement: Option<&GridPlacement>) {
        self.children.push(node);
    }

    fn remove_child(&mut self, node: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|&c| c != node);
        self.children.len() != before
    }

    fn children(&self) -> Vec<NodeId> {
        self.children.clone()
    }

    fn arrange(&mut self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        self.compute(width, measure)
    }

    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32 {
        self.compute(width, measure).height
    }
}

/// Pages sharing one frame; only the current page sizes the container.
#[derive(Debug, Clone, Default)]
pub struct StackedContainer {
    children: Vec<NodeId>,
    current: usize,
}

impl StackedContainer {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the current page.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The current page, if any.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.children.get(self.current).copied()
    }

    /// Switch pages. Out-of-range indices are ignored.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.children.len() {
            self.current = index;
            true
        } else {
            tracing::debug!(index, pages = self.children.len(), "ignoring out-of-range page");
            false
        }
    }

    fn compute(&self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        let width = effective_width(width, measure.fallback_width());
        let height = match self.current() {
            Some(node) if measure.is_visible(node) => measure.size_hint(node, Some(width)).height,
            _ => 0.0,
        };
        let frame = Rect::new(0.0, 0.0, width, height);

        Arrangement {
            frames: self
                .children
                .iter()
                .filter(|&&node| measure.is_visible(node))
                .map(|&node| (node, frame))
                .collect(),
            height,
        }
    }
}

impl LayoutStrategy for StackedContainer {
    fn add_child(&mut self, node: NodeId, _placement: Option<&GridPlacement>) {
        self.children.push(node);
    }

    fn remove_child(&mut self, node: NodeId) -> bool {
        let Some(pos) = self.children.iter().position(|&c| c == node) else {
            return false;
        };
        self.children.remove(pos);
        if pos < self.current || self.current >= self.children.len() {
            self.current = self.current.saturating_sub(1);
        }
        true
    }

    fn children(&self) -> Vec<NodeId> {
        self.children.clone()
    }

    fn arrange(&mut self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        self.compute(width, measure)
    }

    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32 {
        self.compute(width, measure).height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SizeTable;
    use trellis_core::Size;

    fn node(i: u32) -> NodeId {
        NodeId::new(i, 0)
    }

    #[test]
    fn test_group_stacks_vertically() {
        let mut group = GroupContainer::new(5.0);
        group.add_child(node(0), None);
        group.add_child(node(1), None);
        let mut measure = SizeTable::new();
        measure.insert(node(0), Size::new(10.0, 20.0));
        measure.insert(node(1), Size::new(10.0, 30.0));

        let arrangement = group.arrange(300.0, &mut measure);
        assert_eq!(arrangement.frame_of(node(0)), Some(Rect::new(0.0, 0.0, 300.0, 20.0)));
        assert_eq!(arrangement.frame_of(node(1)), Some(Rect::new(0.0, 25.0, 300.0, 30.0)));
        assert_eq!(arrangement.height, 55.0);
    }

    #[test]
    fn test_group_skips_hidden() {
        let mut group = GroupContainer::new(5.0);
        for i in 0..3 {
            group.add_child(node(i), None);
        }
        let mut measure = SizeTable::new();
        measure.set_hidden(node(1), true);

        let arrangement = group.arrange(100.0, &mut measure);
        assert_eq!(arrangement.frames.len(), 2);
        assert_eq!(arrangement.height, 105.0);
    }

    #[test]
    fn test_empty_group() {
        let mut group = GroupContainer::new(5.0);
        assert_eq!(group.arrange(100.0, &mut SizeTable::new()).height, 0.0);
    }

    #[test]
    fn test_stacked_current_sizes_container() {
        let mut pages = StackedContainer::new();
        pages.add_child(node(0), None);
        pages.add_child(node(1), None);
        let mut measure = SizeTable::new();
        measure.insert(node(0), Size::new(10.0, 100.0));
        measure.insert(node(1), Size::new(10.0, 300.0));

        let first = pages.arrange(400.0, &mut measure);
        assert_eq!(first.height, 100.0);
        assert_eq!(first.frame_of(node(1)), Some(Rect::new(0.0, 0.0, 400.0, 100.0)));

        assert!(pages.set_current(1));
        assert_eq!(pages.height_for_width(400.0, &mut measure), 300.0);
        assert!(!pages.set_current(5));
        assert_eq!(pages.current(), Some(node(1)));
    }

    #[test]
    fn test_stacked_remove_adjusts_current() {
        let mut pages = StackedContainer::new();
        for i in 0..3 {
            pages.add_child(node(i), None);
        }
        pages.set_current(2);
        assert!(pages.remove_child(node(0)));
        assert_eq!(pages.current(), Some(node(2)));
        assert!(pages.remove_child(node(2)));
        assert_eq!(pages.current(), Some(node(1)));
        assert!(!pages.remove_child(node(7)));
    }

    #[test]
    fn test_empty_stacked() {
        let mut pages = StackedContainer::new();
        assert_eq!(pages.current(), None);
        assert_eq!(pages.arrange(100.0, &mut SizeTable::new()).height, 0.0);
    }
}
