//! The stack of open container scopes.

use trellis_core::NodeId;

/// Containers whose scopes are currently open, innermost last.
///
/// Scopes nest strictly: only the innermost scope can be closed.
#[derive(Debug, Clone, Default)]
pub struct AttachmentStack {
    scopes: Vec<NodeId>,
}

impl AttachmentStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope for `container`.
    pub fn push(&mut self, container: NodeId) -> NodeId {
        self.scopes.push(container);
        container
    }

    /// Close the scope for `container` if it is the innermost one.
    ///
    /// Returns false, leaving the stack unchanged, otherwise.
    pub fn pop_if_top(&mut self, container: NodeId) -> bool {
        if self.scopes.last() == Some(&container) {
            self.scopes.pop();
            true
        } else {
            false
        }
    }

    /// Innermost open container.
    #[must_use]
    pub fn top(&self) -> Option<NodeId> {
        self.scopes.last().copied()
    }

    /// Number of open scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Whether `container` has an open scope at any depth.
    #[must_use]
    pub fn contains(&self, container: NodeId) -> bool {
        self.scopes.contains(&container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let a = NodeId::new(0, 0);
        let b = NodeId::new(1, 0);
        let mut stack = AttachmentStack::new();
        assert_eq!(stack.top(), None);

        assert_eq!(stack.push(a), a);
        stack.push(b);
        assert_eq!(stack.top(), Some(b));
        assert_eq!(stack.depth(), 2);

        assert!(stack.pop_if_top(b));
        assert_eq!(stack.top(), Some(a));
    }

    #[test]
    fn test_out_of_order_pop_is_noop() {
        let a = NodeId::new(0, 0);
        let b = NodeId::new(1, 0);
        let mut stack = AttachmentStack::new();
        stack.push(a);
        stack.push(b);

        assert!(!stack.pop_if_top(a));
        assert_eq!(stack.depth(), 2);
        assert!(stack.contains(a));
        assert!(!AttachmentStack::new().pop_if_top(a));
    }
}
