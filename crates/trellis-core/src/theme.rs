//! Theme change notifications.
//!
//! Nodes that care about the active theme subscribe explicitly when they are
//! built. A toggle is a single broadcast over the subscriber list; nothing
//! walks the node tree looking for restylable descendants.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light appearance
    #[default]
    Light,
    /// Dark appearance
    Dark,
}

impl ThemeMode {
    /// The opposite mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Event passed to theme subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeEvent {
    /// Mode now in effect.
    pub mode: ThemeMode,
    /// Mode in effect before the change.
    pub previous: ThemeMode,
}

/// A theme callback.
pub type ThemeCallback = Box<dyn FnMut(NodeId, ThemeEvent) + Send>;

/// Unique ID for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

struct Subscription {
    node: NodeId,
    callback: ThemeCallback,
}

/// Broadcasts theme changes to subscribed nodes.
pub struct ThemeBus {
    next_id: u64,
    mode: ThemeMode,
    /// Kept ordered by subscription so delivery order is deterministic.
    order: Vec<SubscriptionId>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    by_node: HashMap<NodeId, Vec<SubscriptionId>>,
}

impl ThemeBus {
    /// Create a bus starting in `mode`.
    #[must_use]
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            next_id: 0,
            mode,
            order: Vec::new(),
            subscriptions: HashMap::new(),
            by_node: HashMap::new(),
        }
    }

    /// Currently active mode.
    #[must_use]
    pub const fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Subscribe `node` to theme changes.
    pub fn subscribe(&mut self, node: NodeId, callback: ThemeCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.subscriptions.insert(id, Subscription { node, callback });
        self.order.push(id);
        self.by_node.entry(node).or_default().push(id);
        id
    }

    /// Remove one subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(subscription) = self.subscriptions.remove(&id) else {
            return false;
        };
        self.order.retain(|&s| s != id);
        if let Some(ids) = self.by_node.get_mut(&subscription.node) {
            ids.retain(|&s| s != id);
            if ids.is_empty() {
                self.by_node.remove(&subscription.node);
            }
        }
        true
    }

    /// Remove every subscription held by `node`.
    pub fn unsubscribe_node(&mut self, node: NodeId) {
        if let Some(ids) = self.by_node.remove(&node) {
            for id in &ids {
                self.subscriptions.remove(id);
            }
            self.order.retain(|s| !ids.contains(s));
        }
    }

    /// Switch to `mode`, notifying every subscriber once.
    ///
    /// Returns the number of callbacks invoked. Setting the mode already in
    /// effect notifies nobody.
    pub fn broadcast(&mut self, mode: ThemeMode) -> usize {
        if mode == self.mode {
            return 0;
        }
        let event = ThemeEvent {
            mode,
            previous: self.mode,
        };
        self.mode = mode;

        let mut delivered = 0;
        for id in &self.order {
            if let Some(subscription) = self.subscriptions.get_mut(id) {
                (subscription.callback)(subscription.node, event);
                delivered += 1;
            }
        }
        tracing::debug!(?mode, delivered, "theme broadcast");
        delivered
    }

    /// Flip between light and dark.
    pub fn toggle(&mut self) -> usize {
        self.broadcast(self.mode.toggled())
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether `node` holds any subscription.
    #[must_use]
    pub fn has_subscriptions(&self, node: NodeId) -> bool {
        self.by_node.get(&node).is_some_and(|ids| !ids.is_empty())
    }
}

impl Default for ThemeBus {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl std::fmt::Debug for ThemeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeBus")
            .field("mode", &self.mode)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<(NodeId, ThemeMode)>>>, ThemeCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let callback: ThemeCallback = Box::new(move |node, event| {
            sink.lock().unwrap().push((node, event.mode));
        });
        (log, callback)
    }

    #[test]
    fn test_theme_mode_toggled() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }

    #[test]
    fn test_broadcast_reaches_subscribers_in_order() {
        let mut bus = ThemeBus::default();
        let (log, cb1) = recorder();
        let sink = Arc::clone(&log);
        let cb2: ThemeCallback = Box::new(move |node, event| {
            sink.lock().unwrap().push((node, event.mode));
        });

        bus.subscribe(NodeId::new(1, 0), cb1);
        bus.subscribe(NodeId::new(2, 0), cb2);

        assert_eq!(bus.broadcast(ThemeMode::Dark), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (NodeId::new(1, 0), ThemeMode::Dark),
                (NodeId::new(2, 0), ThemeMode::Dark)
            ]
        );
    }

    #[test]
    fn test_broadcast_same_mode_is_silent() {
        let mut bus = ThemeBus::new(ThemeMode::Dark);
        let (log, cb) = recorder();
        bus.subscribe(NodeId::new(1, 0), cb);

        assert_eq!(bus.broadcast(ThemeMode::Dark), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_toggle_flips_mode() {
        let mut bus = ThemeBus::default();
        bus.toggle();
        assert_eq!(bus.mode(), ThemeMode::Dark);
        bus.toggle();
        assert_eq!(bus.mode(), ThemeMode::Light);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = ThemeBus::default();
        let (log, cb) = recorder();
        let id = bus.subscribe(NodeId::new(1, 0), cb);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.toggle(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_node_drops_all() {
        let mut bus = ThemeBus::default();
        let node = NodeId::new(4, 1);
        let (_, cb1) = recorder();
        let (_, cb2) = recorder();
        bus.subscribe(node, cb1);
        bus.subscribe(node, cb2);
        assert!(bus.has_subscriptions(node));

        bus.unsubscribe_node(node);
        assert!(!bus.has_subscriptions(node));
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn test_event_carries_previous_mode() {
        let mut bus = ThemeBus::default();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        bus.subscribe(
            NodeId::new(0, 0),
            Box::new(move |_, event| *sink.lock().unwrap() = Some(event)),
        );
        bus.toggle();
        assert_eq!(
            *seen.lock().unwrap(),
            Some(ThemeEvent {
                mode: ThemeMode::Dark,
                previous: ThemeMode::Light
            })
        );
    }
}
