//! The closed set of container kinds.

use crate::flow::FlowContainer;
use crate::grid::{GridContainer, GridPlacement};
use crate::stack::{GroupContainer, StackedContainer};
use crate::strategy::{Arrangement, LayoutStrategy, Measure};
use std::fmt;
use trellis_core::NodeId;

/// Discriminant of a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// 24-column responsive grid
    Grid,
    /// Line-packing flow
    Flow,
    /// Vertical stack
    Group,
    /// Stacked pages
    Stacked,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grid => "grid",
            Self::Flow => "flow",
            Self::Group => "group",
            Self::Stacked => "stacked",
        })
    }
}

/// A container's layout strategy.
#[derive(Debug, Clone)]
pub enum Container {
    /// Row / Column grid
    Grid(GridContainer),
    /// Flow
    Flow(FlowContainer),
    /// Group
    Group(GroupContainer),
    /// Stacked pages
    Stacked(StackedContainer),
}

impl Container {
    /// Which kind of container this is.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        match self {
            Self::Grid(_) => ContainerKind::Grid,
            Self::Flow(_) => ContainerKind::Flow,
            Self::Group(_) => ContainerKind::Group,
            Self::Stacked(_) => ContainerKind::Stacked,
        }
    }

    /// The grid, if this is one.
    pub fn as_grid_mut(&mut self) -> Option<&mut GridContainer> {
        match self {
            Self::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    /// The flow, if this is one.
    pub fn as_flow_mut(&mut self) -> Option<&mut FlowContainer> {
        match self {
            Self::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    /// The group, if this is one.
    pub fn as_group_mut(&mut self) -> Option<&mut GroupContainer> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    /// The page stack, if this is one.
    pub fn as_stacked_mut(&mut self) -> Option<&mut StackedContainer> {
        match self {
            Self::Stacked(pages) => Some(pages),
            _ => None,
        }
    }

    fn strategy(&self) -> &dyn LayoutStrategy {
        match self {
            Self::Grid(c) => c,
            Self::Flow(c) => c,
            Self::Group(c) => c,
            Self::Stacked(c) => c,
        }
    }

    fn strategy_mut(&mut self) -> &mut dyn LayoutStrategy {
        match self {
            Self::Grid(c) => c,
            Self::Flow(c) => c,
            Self::Group(c) => c,
            Self::Stacked(c) => c,
        }
    }
}

impl From<GridContainer> for Container {
    fn from(c: GridContainer) -> Self {
        Self::Grid(c)
    }
}

impl From<FlowContainer> for Container {
    fn from(c: FlowContainer) -> Self {
        Self::Flow(c)
    }
}

impl From<GroupContainer> for Container {
    fn from(c: GroupContainer) -> Self {
        Self::Group(c)
    }
}

impl From<StackedContainer> for Container {
    fn from(c: StackedContainer) -> Self {
        Self::Stacked(c)
    }
}

impl LayoutStrategy for Container {
    fn add_child(&mut self, node: NodeId, placement: Option<&GridPlacement>) {
        self.strategy_mut().add_child(node, placement);
    }

    fn remove_child(&mut self, node: NodeId) -> bool {
        self.strategy_mut().remove_child(node)
    }

    fn children(&self) -> Vec<NodeId> {
        self.strategy().children()
    }

    fn arrange(&mut self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        self.strategy_mut().arrange(width, measure)
    }

    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32 {
        self.strategy().height_for_width(width, measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowSpec;
    use crate::grid::GridSpec;
    use crate::strategy::SizeTable;

    #[test]
    fn test_kind_and_accessors() {
        let mut grid = Container::from(GridContainer::new(GridSpec::new()));
        assert_eq!(grid.kind(), ContainerKind::Grid);
        assert!(grid.as_grid_mut().is_some());
        assert!(grid.as_flow_mut().is_none());

        let mut flow = Container::from(FlowContainer::new(FlowSpec::default()));
        assert_eq!(flow.kind().to_string(), "flow");
        assert!(flow.as_group_mut().is_none());
        assert!(flow.as_stacked_mut().is_none());
    }

    #[test]
    fn test_delegates_to_variant() {
        let a = NodeId::new(0, 0);
        let b = NodeId::new(1, 0);
        let mut group = Container::from(GroupContainer::new(0.0));
        group.add_child(a, None);
        group.add_child(b, Some(&GridPlacement::span(4)));
        assert_eq!(group.children(), vec![a, b]);
        assert!(group.contains(b));

        let mut measure = SizeTable::new();
        assert_eq!(group.height_for_width(100.0, &mut measure), 100.0);
        assert_eq!(group.arrange(100.0, &mut measure).frames.len(), 2);

        assert!(group.remove_child(a));
        assert!(!group.contains(a));
    }

    #[test]
    fn test_only_grid_consumes_placement() {
        let node = NodeId::new(0, 0);
        let mut grid = Container::from(GridContainer::new(GridSpec::new()));
        grid.add_child(node, Some(&GridPlacement::span(6)));
        let placement = grid.as_grid_mut().and_then(|g| g.placement(node).cloned());
        assert_eq!(placement, Some(GridPlacement::span(6)));
    }
}
