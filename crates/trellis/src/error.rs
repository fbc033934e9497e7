//! Tree error types.

use thiserror::Error;
use trellis_core::NodeId;
use trellis_layout::ContainerKind;

/// Errors returned by [`UiTree`](crate::UiTree) mutators.
///
/// The composition API logs and drops these; they are returned from the
/// tree so hosts that manipulate it directly can react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle refers to a destroyed node.
    #[error("node {0} no longer exists")]
    StaleNode(NodeId),

    /// The node is a leaf but a container was required.
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),

    /// The container is of a different kind than the operation needs.
    #[error("node {node} is not a {expected} container")]
    WrongContainer {
        /// Offending node
        node: NodeId,
        /// Kind the operation needs
        expected: ContainerKind,
    },

    /// The node already has an owner; nodes are attached at most once.
    #[error("node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// The node is not a child of the given container.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Container
        parent: NodeId,
        /// Supposed child
        child: NodeId,
    },

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} to {parent} would create a cycle")]
    Cycle {
        /// Container
        parent: NodeId,
        /// Child
        child: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let a = NodeId::new(1, 0);
        let b = NodeId::new(2, 3);
        assert_eq!(TreeError::StaleNode(a).to_string(), "node #1v0 no longer exists");
        assert_eq!(
            TreeError::WrongContainer {
                node: a,
                expected: ContainerKind::Grid
            }
            .to_string(),
            "node #1v0 is not a grid container"
        );
        assert_eq!(
            TreeError::Cycle { parent: a, child: b }.to_string(),
            "attaching #2v3 to #1v0 would create a cycle"
        );
    }
}
