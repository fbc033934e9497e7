//! Debounced relayout scheduling.
//!
//! The scheduler does not own a timer. The host loop asks it which
//! containers are due ([`RelayoutScheduler::take_due`]) and when it next
//! needs to be woken ([`RelayoutScheduler::next_deadline`]).

use std::collections::HashMap;
use std::time::{Duration, Instant};
use trellis_core::NodeId;

/// Default coalescing window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Per-container debounce timers.
///
/// At most one relayout is pending per container. Marking a container that
/// is already pending restarts its window, so a burst of signals fires
/// once, `debounce` after the last one.
#[derive(Debug, Clone)]
pub struct RelayoutScheduler {
    debounce: Duration,
    pending: HashMap<NodeId, Instant>,
}

impl Default for RelayoutScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RelayoutScheduler {
    /// Create a scheduler with the given coalescing window.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: HashMap::new(),
        }
    }

    /// Coalescing window.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Arm (or re-arm) the timer for `container`.
    pub fn mark_dirty(&mut self, container: NodeId, now: Instant) {
        let deadline = now + self.debounce;
        if self.pending.insert(container, deadline).is_some() {
            tracing::trace!(%container, "relayout coalesced");
        }
    }

    /// Drop the pending relayout for `container`.
    pub fn cancel(&mut self, container: NodeId) -> bool {
        self.pending.remove(&container).is_some()
    }

    /// Whether a relayout is pending for `container`.
    #[must_use]
    pub fn is_pending(&self, container: NodeId) -> bool {
        self.pending.contains_key(&container)
    }

    /// Number of pending relayouts.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every container whose deadline has passed.
    ///
    /// Returned in deadline order; ties break on node id so the order is
    /// deterministic.
    pub fn take_due(&mut self, now: Instant) -> Vec<NodeId> {
        let mut due: Vec<(Instant, NodeId)> = self
            .pending
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&node, &deadline)| (deadline, node))
            .collect();
        due.sort();
        for (_, node) in &due {
            self.pending.remove(node);
        }
        due.into_iter().map(|(_, node)| node).collect()
    }

    /// Remove and return every pending container regardless of deadline.
    pub fn take_all(&mut self) -> Vec<NodeId> {
        let mut all: Vec<(Instant, NodeId)> =
            self.pending.drain().map(|(node, deadline)| (deadline, node)).collect();
        all.sort();
        all.into_iter().map(|(_, node)| node).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: u32) -> NodeId {
        NodeId::new(i, 0)
    }

    #[test]
    fn test_not_due_before_window() {
        let mut s = RelayoutScheduler::default();
        let t0 = Instant::now();
        s.mark_dirty(node(0), t0);
        assert!(s.take_due(t0 + Duration::from_millis(9)).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(10)), vec![node(0)]);
        assert!(!s.is_pending(node(0)));
    }

    #[test]
    fn test_burst_coalesces_to_one() {
        let mut s = RelayoutScheduler::default();
        let t0 = Instant::now();
        for ms in 0..5 {
            s.mark_dirty(node(0), t0 + Duration::from_millis(ms * 4));
        }
        assert_eq!(s.pending_count(), 1);
        // Window restarted by the last mark at 16ms.
        assert!(s.take_due(t0 + Duration::from_millis(20)).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(26)), vec![node(0)]);
        assert!(s.take_due(t0 + Duration::from_millis(100)).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut s = RelayoutScheduler::default();
        let t0 = Instant::now();
        s.mark_dirty(node(3), t0);
        assert!(s.cancel(node(3)));
        assert!(!s.cancel(node(3)));
        assert!(s.take_due(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_due_order_is_deterministic() {
        let mut s = RelayoutScheduler::new(Duration::ZERO);
        let t0 = Instant::now();
        s.mark_dirty(node(5), t0);
        s.mark_dirty(node(2), t0);
        s.mark_dirty(node(9), t0 - Duration::from_millis(1));
        assert_eq!(s.take_due(t0), vec![node(9), node(2), node(5)]);
    }

    #[test]
    fn test_next_deadline_and_take_all() {
        let mut s = RelayoutScheduler::default();
        assert_eq!(s.next_deadline(), None);
        let t0 = Instant::now();
        s.mark_dirty(node(1), t0 + Duration::from_millis(5));
        s.mark_dirty(node(0), t0);
        assert_eq!(s.next_deadline(), Some(t0 + DEFAULT_DEBOUNCE));
        assert_eq!(s.take_all(), vec![node(0), node(1)]);
        assert_eq!(s.pending_count(), 0);
    }
}
