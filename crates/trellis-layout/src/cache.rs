//! Memoization of nested-container height queries.

use std::collections::HashMap;
use trellis_core::NodeId;

/// Cache key: a container and the width it was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureKey {
    /// Container queried
    pub node: NodeId,
    /// Bit pattern of the queried width
    pub width_bits: u32,
}

impl MeasureKey {
    /// Key for `node` at `width`.
    #[must_use]
    pub fn new(node: NodeId, width: f32) -> Self {
        Self {
            node,
            width_bits: width.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    height: f32,
    last_used_frame: u64,
}

/// Height-for-width results keyed by (container, width).
///
/// Entries unused for two frames are evicted by [`MeasureCache::advance_frame`].
/// Callers clear the cache whenever layout-affecting state changes.
#[derive(Debug, Default)]
pub struct MeasureCache {
    entries: HashMap<MeasureKey, CacheEntry>,
    current_frame: u64,
    hits: usize,
    misses: usize,
}

impl MeasureCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached height.
    pub fn get(&mut self, key: MeasureKey) -> Option<f32> {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used_frame = self.current_frame;
            self.hits += 1;
            Some(entry.height)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Record a computed height.
    pub fn insert(&mut self, key: MeasureKey, height: f32) {
        self.entries.insert(
            key,
            CacheEntry {
                height,
                last_used_frame: self.current_frame,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Cache hits since creation.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Cache misses since creation.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Advance to the next frame and evict stale entries.
    pub fn advance_frame(&mut self) {
        self.current_frame += 1;

        let threshold = self.current_frame.saturating_sub(2);
        self.entries
            .retain(|_, entry| entry.last_used_frame >= threshold);
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: u32, width: f32) -> MeasureKey {
        MeasureKey::new(NodeId::new(i, 0), width)
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = MeasureCache::new();
        assert_eq!(cache.get(key(1, 100.0)), None);
        cache.insert(key(1, 100.0), 42.0);
        assert_eq!(cache.get(key(1, 100.0)), Some(42.0));
        assert_eq!(cache.get(key(1, 101.0)), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_generation_is_part_of_key() {
        let mut cache = MeasureCache::new();
        cache.insert(key(1, 100.0), 42.0);
        let reused = MeasureKey::new(NodeId::new(1, 1), 100.0);
        assert_eq!(cache.get(reused), None);
    }

    #[test]
    fn test_clear() {
        let mut cache = MeasureCache::new();
        cache.insert(key(0, 1.0), 1.0);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_after_two_frames() {
        let mut cache = MeasureCache::new();
        cache.insert(key(0, 1.0), 1.0);
        cache.insert(key(1, 1.0), 1.0);

        cache.advance_frame();
        cache.advance_frame();
        let _ = cache.get(key(1, 1.0));
        assert_eq!(cache.len(), 2);

        cache.advance_frame();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(key(1, 1.0)).is_some());
    }
}
