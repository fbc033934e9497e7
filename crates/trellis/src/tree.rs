//! Node arena and relayout driver.
//!
//! [`UiTree`] owns every node of one composition tree in a generational
//! arena. Containers carry their [`Container`] strategy; the tree measures
//! children through the host [`Element`]s, runs the strategy when the
//! [`RelayoutScheduler`] says a container is due, and writes the resulting
//! geometry back to the elements.

use crate::error::TreeError;
use std::fmt;
use std::time::Instant;
use trellis_core::{
    Element, NodeId, Rect, Size, SubscriptionId, ThemeBus, ThemeCallback, ThemeMode,
};
use trellis_layout::{
    Container, ContainerKind, FlowContainer, GridContainer, GridPlacement, GroupContainer,
    LayoutConfig, LayoutStrategy, Measure, MeasureCache, MeasureKey, RelayoutScheduler,
    StackedContainer,
};

struct NodeEntry {
    element: Box<dyn Element>,
    parent: Option<NodeId>,
    /// `None` for leaves, and for containers while they are being laid out.
    container: Option<Container>,
    kind: Option<ContainerKind>,
    placement: Option<GridPlacement>,
    fixed_size: Option<Size>,
    frame: Option<Rect>,
    laid_out_width: Option<f32>,
    content_height: f32,
    shown: bool,
    attached_once: bool,
}

struct Slot {
    generation: u32,
    entry: Option<NodeEntry>,
}

fn lookup(slots: &[Slot], id: NodeId) -> Option<&NodeEntry> {
    slots
        .get(id.index() as usize)
        .filter(|slot| slot.generation == id.generation())
        .and_then(|slot| slot.entry.as_ref())
}

fn lookup_mut(slots: &mut [Slot], id: NodeId) -> Option<&mut NodeEntry> {
    slots
        .get_mut(id.index() as usize)
        .filter(|slot| slot.generation == id.generation())
        .and_then(|slot| slot.entry.as_mut())
}

/// Measures children through their host elements.
///
/// Nested containers answer with their height for the offered width,
/// memoized in the tree's [`MeasureCache`].
struct TreeMeasure<'a> {
    slots: &'a [Slot],
    cache: &'a mut MeasureCache,
    config: &'a LayoutConfig,
}

impl TreeMeasure<'_> {
    /// `width` is assigned outright; `cap` only bounds a container's own width.
    fn hint(&mut self, node: NodeId, width: Option<f32>, cap: Option<f32>) -> Size {
        let fallback = self.config.fallback_size;
        let slots = self.slots;
        let Some(entry) = lookup(slots, node) else {
            return fallback;
        };
        if let Some(fixed) = entry.fixed_size {
            return fixed.or_fallback(fallback);
        }

        let intrinsic = entry.element.measure_intrinsic_size();
        match (&entry.container, entry.kind) {
            (Some(container), _) => {
                let usable = |w: &f32| w.is_finite() && *w > 0.0;
                let cap = cap.filter(usable);
                let own = Some(intrinsic.width)
                    .filter(usable)
                    .map(|w| cap.map_or(w, |c| w.min(c)));
                let width = width
                    .filter(usable)
                    .or(own)
                    .or(cap)
                    .unwrap_or(self.config.default_width);
                let key = MeasureKey::new(node, width);
                let height = match self.cache.get(key) {
                    Some(height) => height,
                    None => {
                        let height = container.height_for_width(width, self);
                        self.cache.insert(key, height);
                        height
                    }
                };
                Size::new(width, height)
            }
            (None, Some(kind)) => {
                tracing::warn!(%node, %kind, "container measured during its own layout");
                intrinsic.or_fallback(fallback)
            }
            (None, None) => intrinsic.or_fallback(fallback),
        }
    }
}

impl Measure for TreeMeasure<'_> {
    fn size_hint(&mut self, node: NodeId, width: Option<f32>) -> Size {
        self.hint(node, width, None)
    }

    fn size_hint_within(&mut self, node: NodeId, max_width: f32) -> Size {
        self.hint(node, None, Some(max_width))
    }

    fn is_visible(&self, node: NodeId) -> bool {
        lookup(self.slots, node).is_some_and(|entry| entry.element.is_visible())
    }

    fn fallback_width(&self) -> f32 {
        self.config.default_width
    }
}

/// Arena of nodes making up one composition tree.
pub struct UiTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    scheduler: RelayoutScheduler,
    cache: MeasureCache,
    theme: ThemeBus,
    config: LayoutConfig,
}

impl Default for UiTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UiTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiTree")
            .field("nodes", &self.live)
            .field("pending_relayouts", &self.scheduler.pending_count())
            .field("theme", &self.theme.mode())
            .finish_non_exhaustive()
    }
}

impl UiTree {
    /// Create an empty tree with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create an empty tree.
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            scheduler: RelayoutScheduler::new(config.debounce()),
            cache: MeasureCache::new(),
            theme: ThemeBus::new(ThemeMode::default()),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        lookup(&self.slots, id).is_some()
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry, TreeError> {
        lookup(&self.slots, id).ok_or(TreeError::StaleNode(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut NodeEntry, TreeError> {
        lookup_mut(&mut self.slots, id).ok_or(TreeError::StaleNode(id))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add an unattached leaf.
    pub fn insert_leaf(&mut self, element: Box<dyn Element>) -> NodeId {
        self.insert(element, None)
    }

    /// Add an unattached container backed by `element`.
    pub fn insert_container(&mut self, element: Box<dyn Element>, container: Container) -> NodeId {
        self.insert(element, Some(container))
    }

    fn insert(&mut self, element: Box<dyn Element>, container: Option<Container>) -> NodeId {
        let entry = NodeEntry {
            element,
            parent: None,
            kind: container.as_ref().map(Container::kind),
            container,
            placement: None,
            fixed_size: None,
            frame: None,
            laid_out_width: None,
            content_height: 0.0,
            shown: false,
            attached_once: false,
        };
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            NodeId::new(index, 0)
        }
    }

    /// A grid using the configured defaults.
    #[must_use]
    pub fn new_grid(&self) -> Container {
        GridContainer::new(self.config.grid_spec()).into()
    }

    /// A flow using the configured defaults.
    #[must_use]
    pub fn new_flow(&self) -> Container {
        FlowContainer::new(self.config.flow_spec()).into()
    }

    /// A group with no spacing.
    #[must_use]
    pub fn new_group(&self) -> Container {
        GroupContainer::new(0.0).into()
    }

    /// An empty page stack.
    #[must_use]
    pub fn new_stacked(&self) -> Container {
        StackedContainer::new().into()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Container kind of `id`, or `None` for leaves and stale handles.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<ContainerKind> {
        lookup(&self.slots, id).and_then(|entry| entry.kind)
    }

    /// Owning container of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        lookup(&self.slots, id).and_then(|entry| entry.parent)
    }

    /// Children of `id` in layout order; empty for leaves.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        lookup(&self.slots, id)
            .and_then(|entry| entry.container.as_ref())
            .map(LayoutStrategy::children)
            .unwrap_or_default()
    }

    /// Live nodes without an owner, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.entry
                    .as_ref()
                    .filter(|entry| entry.parent.is_none())
                    .map(|_| NodeId::new(index as u32, slot.generation))
            })
            .collect()
    }

    /// Geometry last written to `id`, relative to its owner.
    #[must_use]
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        lookup(&self.slots, id).and_then(|entry| entry.frame)
    }

    /// Height the container reported in its last layout pass.
    #[must_use]
    pub fn content_height(&self, id: NodeId) -> Option<f32> {
        lookup(&self.slots, id)
            .filter(|entry| entry.kind.is_some())
            .map(|entry| entry.content_height)
    }

    /// Container strategy of `id`.
    #[must_use]
    pub fn container(&self, id: NodeId) -> Option<&Container> {
        lookup(&self.slots, id).and_then(|entry| entry.container.as_ref())
    }

    /// Grid placement recorded for `id`.
    #[must_use]
    pub fn placement(&self, id: NodeId) -> Option<&GridPlacement> {
        lookup(&self.slots, id).and_then(|entry| entry.placement.as_ref())
    }

    /// Measurement cache statistics.
    #[must_use]
    pub const fn measure_cache(&self) -> &MeasureCache {
        &self.cache
    }

    // =========================================================================
    // Structure
    // =========================================================================

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.parent(node) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Make `child` a child of the container `parent`.
    ///
    /// A node can be attached once in its lifetime.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.entry(parent)?.kind.is_none() {
            return Err(TreeError::NotAContainer(parent));
        }
        let child_entry = self.entry(child)?;
        if child_entry.attached_once {
            return Err(TreeError::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        let placement = child_entry.placement.clone();

        let container = self
            .entry_mut(parent)?
            .container
            .as_mut()
            .ok_or(TreeError::NotAContainer(parent))?;
        container.add_child(child, placement.as_ref());

        let child_entry = self.entry_mut(child)?;
        child_entry.parent = Some(parent);
        child_entry.attached_once = true;

        tracing::trace!(%parent, %child, "attached");
        self.cache.clear();
        self.schedule(parent, Instant::now());
        Ok(())
    }

    /// Take `child` out of `parent`'s layout.
    ///
    /// The child stays alive as a root but cannot be attached again.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.entry(parent)?;
        if self.entry(child)?.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        if let Some(container) = self.entry_mut(parent)?.container.as_mut() {
            container.remove_child(child);
        }
        self.entry_mut(child)?.parent = None;
        self.cache.clear();
        self.schedule(parent, Instant::now());
        Ok(())
    }

    /// Destroy `id` and its whole subtree.
    ///
    /// Pending relayouts and theme subscriptions of the removed nodes are
    /// dropped. Returns the number of nodes removed.
    pub fn destroy(&mut self, id: NodeId) -> Result<usize, TreeError> {
        if let Some(parent) = self.entry(id)?.parent {
            if let Some(container) = lookup_mut(&mut self.slots, parent).and_then(|e| e.container.as_mut()) {
                container.remove_child(id);
            }
            self.schedule(parent, Instant::now());
        }

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(node) = stack.pop() {
            let Some(slot) = self.slots.get_mut(node.index() as usize) else {
                continue;
            };
            if slot.generation != node.generation() {
                continue;
            }
            let Some(entry) = slot.entry.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index());

            if let Some(container) = &entry.container {
                stack.extend(container.children());
            }
            self.scheduler.cancel(node);
            self.theme.unsubscribe_node(node);
            removed += 1;
        }

        self.live -= removed;
        self.cache.clear();
        tracing::debug!(%id, removed, "destroyed subtree");
        Ok(removed)
    }

    // =========================================================================
    // Node settings
    // =========================================================================

    /// Override (or with `None`, restore) the size hint of `id`.
    pub fn set_fixed_size(&mut self, id: NodeId, size: Option<Size>) -> Result<(), TreeError> {
        let entry = self.entry_mut(id)?;
        entry.fixed_size = size;
        let parent = entry.parent;
        self.invalidate_parent(parent);
        Ok(())
    }

    /// Edit the grid placement of `id`.
    ///
    /// The node gets a default placement first if it has none. If it already
    /// sits in a grid, the grid picks up the change on its next pass.
    pub fn update_placement(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut GridPlacement),
    ) -> Result<(), TreeError> {
        let entry = self.entry_mut(id)?;
        let placement = entry.placement.get_or_insert_with(GridPlacement::default);
        f(placement);
        let placement = placement.clone();
        let parent = entry.parent;

        if let Some(parent) = parent {
            if let Some(Container::Grid(grid)) =
                lookup_mut(&mut self.slots, parent).and_then(|e| e.container.as_mut())
            {
                if let Some(slot) = grid.placement_mut(id) {
                    *slot = placement;
                }
            }
        }
        self.invalidate_parent(parent);
        Ok(())
    }

    fn invalidate_parent(&mut self, parent: Option<NodeId>) {
        self.cache.clear();
        if let Some(parent) = parent {
            self.schedule(parent, Instant::now());
        }
    }

    /// Report that the host changed something affecting the size hint of `id`.
    pub fn invalidate(&mut self, id: NodeId) -> Result<(), TreeError> {
        let entry = self.entry(id)?;
        let (parent, is_container) = (entry.parent, entry.kind.is_some());
        if is_container {
            self.schedule(id, Instant::now());
        }
        self.invalidate_parent(parent);
        Ok(())
    }

    /// Edit the strategy of container `id` and schedule a relayout.
    pub fn update_container<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Container) -> R,
    ) -> Result<R, TreeError> {
        let container = self
            .entry_mut(id)?
            .container
            .as_mut()
            .ok_or(TreeError::NotAContainer(id))?;
        let result = f(container);
        self.cache.clear();
        self.schedule(id, Instant::now());
        Ok(result)
    }

    fn expect_kind(&self, id: NodeId, expected: ContainerKind) -> Result<(), TreeError> {
        match self.entry(id)?.kind {
            None => Err(TreeError::NotAContainer(id)),
            Some(kind) if kind == expected => Ok(()),
            Some(_) => Err(TreeError::WrongContainer { node: id, expected }),
        }
    }

    /// Edit grid `id`.
    pub fn with_grid<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut GridContainer) -> R,
    ) -> Result<R, TreeError> {
        self.expect_kind(id, ContainerKind::Grid)?;
        self.update_container(id, |c| c.as_grid_mut().map(f))?
            .ok_or(TreeError::WrongContainer {
                node: id,
                expected: ContainerKind::Grid,
            })
    }

    /// Edit flow `id`.
    pub fn with_flow<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut FlowContainer) -> R,
    ) -> Result<R, TreeError> {
        self.expect_kind(id, ContainerKind::Flow)?;
        self.update_container(id, |c| c.as_flow_mut().map(f))?
            .ok_or(TreeError::WrongContainer {
                node: id,
                expected: ContainerKind::Flow,
            })
    }

    /// Edit group `id`.
    pub fn with_group<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut GroupContainer) -> R,
    ) -> Result<R, TreeError> {
        self.expect_kind(id, ContainerKind::Group)?;
        self.update_container(id, |c| c.as_group_mut().map(f))?
            .ok_or(TreeError::WrongContainer {
                node: id,
                expected: ContainerKind::Group,
            })
    }

    /// Edit page stack `id`.
    pub fn with_stacked<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut StackedContainer) -> R,
    ) -> Result<R, TreeError> {
        self.expect_kind(id, ContainerKind::Stacked)?;
        self.update_container(id, |c| c.as_stacked_mut().map(f))?
            .ok_or(TreeError::WrongContainer {
                node: id,
                expected: ContainerKind::Stacked,
            })
    }

    // =========================================================================
    // Theme
    // =========================================================================

    /// Call `callback` on every theme change until `id` is destroyed.
    pub fn subscribe_theme(
        &mut self,
        id: NodeId,
        callback: ThemeCallback,
    ) -> Result<SubscriptionId, TreeError> {
        self.entry(id)?;
        Ok(self.theme.subscribe(id, callback))
    }

    /// Drop one theme subscription.
    pub fn unsubscribe_theme(&mut self, subscription: SubscriptionId) -> bool {
        self.theme.unsubscribe(subscription)
    }

    /// Active theme mode.
    #[must_use]
    pub const fn theme_mode(&self) -> ThemeMode {
        self.theme.mode()
    }

    /// Switch theme mode. Returns the number of subscribers notified.
    pub fn set_theme(&mut self, mode: ThemeMode) -> usize {
        self.theme.broadcast(mode)
    }

    /// Flip between light and dark.
    pub fn toggle_theme(&mut self) -> usize {
        self.theme.toggle()
    }

    // =========================================================================
    // Relayout
    // =========================================================================

    fn schedule(&mut self, id: NodeId, now: Instant) {
        if lookup(&self.slots, id).is_some_and(|entry| entry.kind.is_some()) {
            self.scheduler.mark_dirty(id, now);
        } else {
            tracing::debug!(%id, "not scheduling relayout for a leaf or destroyed node");
        }
    }

    /// Schedule a relayout of container `id` one debounce window from now.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.mark_dirty_at(id, Instant::now())
    }

    /// Schedule a relayout of container `id` one debounce window after `now`.
    pub fn mark_dirty_at(&mut self, id: NodeId, now: Instant) -> Result<(), TreeError> {
        if self.entry(id)?.kind.is_none() {
            return Err(TreeError::NotAContainer(id));
        }
        self.scheduler.mark_dirty(id, now);
        Ok(())
    }

    /// Whether a relayout of `id` is pending.
    #[must_use]
    pub fn is_layout_pending(&self, id: NodeId) -> bool {
        self.scheduler.is_pending(id)
    }

    /// Number of pending relayouts.
    #[must_use]
    pub fn pending_relayouts(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// When the host loop should next call [`UiTree::pump`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// The host realized `id`. Containers lay out immediately the first time.
    pub fn notify_shown(&mut self, id: NodeId) -> Result<(), TreeError> {
        let entry = self.entry_mut(id)?;
        if entry.shown {
            return Ok(());
        }
        entry.shown = true;
        if entry.kind.is_some() {
            self.scheduler.cancel(id);
            self.relayout(id)?;
        }
        Ok(())
    }

    /// The host resized `id`.
    ///
    /// Containers whose width differs from the width they were last laid
    /// out at are scheduled for relayout.
    pub fn notify_resized(&mut self, id: NodeId, old: Size, new: Size) -> Result<(), TreeError> {
        let entry = self.entry_mut(id)?;
        let origin = entry.frame.map(|f| f.origin()).unwrap_or_default();
        entry.frame = Some(Rect::new(origin.x, origin.y, new.width, new.height));
        let stale = entry.kind.is_some() && entry.laid_out_width != Some(new.width);

        tracing::trace!(%id, ?old, ?new, stale, "resized");
        if stale {
            self.scheduler.mark_dirty(id, Instant::now());
        }
        Ok(())
    }

    /// Lay out container `id` now.
    ///
    /// Writes geometry to every placed child and returns the container's
    /// content height. Children whose width changed and owners whose
    /// content height changed are scheduled in turn.
    pub fn relayout(&mut self, id: NodeId) -> Result<f32, TreeError> {
        let entry = self.entry_mut(id)?;
        if entry.kind.is_none() {
            return Err(TreeError::NotAContainer(id));
        }
        let Some(mut container) = entry.container.take() else {
            tracing::warn!(%id, "ignoring reentrant relayout");
            return Ok(entry.content_height);
        };
        let width = entry.frame.map_or(0.0, |f| f.width);

        let arrangement = {
            let mut measure = TreeMeasure {
                slots: &self.slots,
                cache: &mut self.cache,
                config: &self.config,
            };
            container.arrange(width, &mut measure)
        };
        let children = container.children();

        let now = Instant::now();
        let parent = {
            let entry = self.entry_mut(id)?;
            entry.container = Some(container);
            entry.laid_out_width = Some(width);
            let changed = entry.content_height != arrangement.height;
            entry.content_height = arrangement.height;
            entry.parent.filter(|_| changed)
        };

        for &(child, frame) in &arrangement.frames {
            let Some(entry) = lookup_mut(&mut self.slots, child) else {
                continue;
            };
            entry.frame = Some(frame);
            entry.element.set_geometry(frame);
            if entry.kind.is_some() && entry.laid_out_width != Some(frame.width) {
                self.scheduler.mark_dirty(child, now);
            }
        }
        for child in children {
            if arrangement.frame_of(child).is_some() {
                continue;
            }
            if let Some(entry) = lookup_mut(&mut self.slots, child) {
                entry.frame = None;
            }
        }
        if let Some(parent) = parent {
            self.schedule(parent, now);
        }

        tracing::debug!(
            %id,
            width,
            children = arrangement.frames.len(),
            height = arrangement.height,
            "relayout"
        );
        Ok(arrangement.height)
    }

    fn run_scheduled(&mut self, id: NodeId) -> usize {
        match self.relayout(id) {
            Ok(_) => 1,
            Err(err) => {
                tracing::debug!(%id, %err, "skipping scheduled relayout");
                0
            }
        }
    }

    /// Run every relayout whose debounce window has elapsed at `now`.
    ///
    /// Returns the number of containers laid out.
    pub fn pump(&mut self, now: Instant) -> usize {
        self.cache.advance_frame();
        self.scheduler
            .take_due(now)
            .into_iter()
            .map(|id| self.run_scheduled(id))
            .sum()
    }

    /// Run all pending relayouts now, including the ones they cascade into.
    ///
    /// Stops after the configured number of passes if layout keeps
    /// invalidating itself.
    pub fn flush(&mut self) -> usize {
        self.cache.advance_frame();
        let mut ran = 0;
        for _ in 0..self.config.max_flush_passes {
            let pending = self.scheduler.take_all();
            if pending.is_empty() {
                return ran;
            }
            for id in pending {
                ran += self.run_scheduled(id);
            }
        }
        let pending = self.scheduler.pending_count();
        if pending > 0 {
            tracing::warn!(
                pending,
                passes = self.config.max_flush_passes,
                "relayout did not settle"
            );
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use trellis_core::FixedElement;

    /// Leaf whose visibility the test flips after layout.
    struct Toggle {
        size: Size,
        visible: Arc<AtomicBool>,
    }

    impl Element for Toggle {
        fn measure_intrinsic_size(&self) -> Size {
            self.size
        }

        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::Relaxed)
        }

        fn set_geometry(&mut self, _frame: Rect) {}
    }

    fn leaf(tree: &mut UiTree, w: f32, h: f32) -> NodeId {
        tree.insert_leaf(Box::new(FixedElement::new(w, h)))
    }

    fn grid(tree: &mut UiTree) -> NodeId {
        let container = tree.new_grid();
        tree.insert_container(Box::new(FixedElement::empty()), container)
    }

    fn flow(tree: &mut UiTree) -> NodeId {
        let container = tree.new_flow();
        tree.insert_container(Box::new(FixedElement::empty()), container)
    }

    fn resize(tree: &mut UiTree, id: NodeId, width: f32) {
        tree.notify_resized(id, Size::ZERO, Size::new(width, 600.0))
            .unwrap();
    }

    #[test]
    fn test_insert_and_destroy_reuses_slot() {
        let mut tree = UiTree::new();
        let a = leaf(&mut tree, 10.0, 10.0);
        assert!(tree.contains(a));
        assert_eq!(tree.len(), 1);

        assert_eq!(tree.destroy(a).unwrap(), 1);
        assert!(!tree.contains(a));
        assert!(tree.is_empty());

        let b = leaf(&mut tree, 10.0, 10.0);
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert_eq!(tree.destroy(a), Err(TreeError::StaleNode(a)));
    }

    #[test]
    fn test_attach_errors() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let inner = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);

        assert_eq!(tree.attach(a, row), Err(TreeError::NotAContainer(a)));
        tree.attach(row, a).unwrap();
        assert_eq!(tree.attach(inner, a), Err(TreeError::AlreadyAttached(a)));
        assert_eq!(
            tree.attach(row, row),
            Err(TreeError::Cycle {
                parent: row,
                child: row
            })
        );

        tree.attach(row, inner).unwrap();
        let outer = grid(&mut tree);
        tree.attach(outer, row).unwrap();
        assert_eq!(tree.parent(a), Some(row));
        assert_eq!(tree.children(row), vec![a, inner]);
    }

    #[test]
    fn test_cycle_detected_for_unattached_ancestor() {
        let mut tree = UiTree::new();
        let outer = grid(&mut tree);
        let inner = grid(&mut tree);
        tree.attach(outer, inner).unwrap();
        assert_eq!(
            tree.attach(inner, outer),
            Err(TreeError::Cycle {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn test_attach_is_debounced() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        resize(&mut tree, row, 960.0);
        tree.flush();

        let before = Instant::now();
        let a = leaf(&mut tree, 10.0, 30.0);
        tree.attach(row, a).unwrap();
        assert!(tree.is_layout_pending(row));

        assert_eq!(tree.pump(before), 0);
        assert_eq!(tree.frame(a), None);

        let later = Instant::now() + Duration::from_millis(50);
        assert_eq!(tree.pump(later), 1);
        assert_eq!(tree.frame(a), Some(Rect::new(0.0, 0.0, 960.0, 30.0)));
        assert_eq!(tree.content_height(row), Some(30.0));
    }

    #[test]
    fn test_many_adds_coalesce() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        for _ in 0..20 {
            let a = leaf(&mut tree, 10.0, 10.0);
            tree.attach(row, a).unwrap();
        }
        assert_eq!(tree.pending_relayouts(), 1);
        assert_eq!(tree.flush(), 1);
    }

    #[test]
    fn test_destroy_before_fire_is_noop() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);
        tree.attach(row, a).unwrap();
        assert!(tree.is_layout_pending(row));

        assert_eq!(tree.destroy(row).unwrap(), 2);
        assert!(!tree.contains(a));
        assert_eq!(tree.pending_relayouts(), 0);
        assert_eq!(tree.pump(Instant::now() + Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_stale_scheduled_id_skipped() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        tree.mark_dirty(row).unwrap();
        assert!(tree.relayout(NodeId::new(row.index(), row.generation() + 1)).is_err());
    }

    #[test]
    fn test_notify_shown_lays_out_eagerly_once() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 20.0);
        tree.attach(row, a).unwrap();
        resize(&mut tree, row, 480.0);

        tree.notify_shown(row).unwrap();
        assert_eq!(tree.frame(a), Some(Rect::new(0.0, 0.0, 480.0, 20.0)));
        assert!(!tree.is_layout_pending(row));

        tree.notify_shown(row).unwrap();
        assert!(!tree.is_layout_pending(row));
    }

    #[test]
    fn test_unsized_root_uses_default_width() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 20.0);
        tree.attach(row, a).unwrap();
        tree.flush();
        assert_eq!(tree.frame(a).map(|f| f.width), Some(800.0));
    }

    #[test]
    fn test_resize_schedules_only_on_width_change() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        resize(&mut tree, row, 500.0);
        tree.flush();
        assert!(!tree.is_layout_pending(row));

        tree.notify_resized(row, Size::new(500.0, 600.0), Size::new(500.0, 700.0))
            .unwrap();
        assert!(!tree.is_layout_pending(row));

        resize(&mut tree, row, 700.0);
        assert!(tree.is_layout_pending(row));
    }

    #[test]
    fn test_nested_flow_sizes_grid_line() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let cards = flow(&mut tree);
        tree.update_placement(cards, |p| p.set_span(12)).unwrap();
        tree.attach(row, cards).unwrap();
        for _ in 0..6 {
            let card = leaf(&mut tree, 100.0, 40.0);
            tree.attach(cards, card).unwrap();
        }
        resize(&mut tree, row, 960.0);
        tree.flush();

        // Flow is 480 wide: four cards per line, two lines.
        assert_eq!(tree.frame(cards), Some(Rect::new(0.0, 0.0, 480.0, 88.0)));
        assert_eq!(tree.content_height(cards), Some(88.0));
        assert_eq!(tree.content_height(row), Some(88.0));
        let fifth = tree.children(cards)[4];
        assert_eq!(tree.frame(fifth), Some(Rect::new(0.0, 48.0, 100.0, 40.0)));
    }

    #[test]
    fn test_child_growth_propagates_to_parent() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let cards = flow(&mut tree);
        tree.attach(row, cards).unwrap();
        resize(&mut tree, row, 300.0);
        let card = leaf(&mut tree, 100.0, 40.0);
        tree.attach(cards, card).unwrap();
        tree.flush();
        assert_eq!(tree.content_height(row), Some(40.0));

        let card = leaf(&mut tree, 250.0, 40.0);
        tree.attach(cards, card).unwrap();
        tree.flush();
        assert_eq!(tree.content_height(cards), Some(88.0));
        assert_eq!(tree.content_height(row), Some(88.0));
    }

    #[test]
    fn test_fixed_size_overrides_hint() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        let a = leaf(&mut tree, 100.0, 40.0);
        tree.attach(cards, a).unwrap();
        tree.set_fixed_size(a, Some(Size::new(30.0, 70.0))).unwrap();
        tree.flush();
        assert_eq!(tree.frame(a), Some(Rect::new(0.0, 0.0, 30.0, 70.0)));
    }

    #[test]
    fn test_zero_hint_uses_fallback() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        let a = tree.insert_leaf(Box::new(FixedElement::empty()));
        tree.attach(cards, a).unwrap();
        tree.flush();
        assert_eq!(tree.frame(a), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_hidden_child_gets_no_frame() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        let hidden = tree.insert_leaf(Box::new(FixedElement::new(10.0, 10.0).with_visible(false)));
        let shown = leaf(&mut tree, 10.0, 10.0);
        tree.attach(cards, hidden).unwrap();
        tree.attach(cards, shown).unwrap();
        tree.flush();
        assert_eq!(tree.frame(hidden), None);
        assert_eq!(tree.frame(shown).map(|f| f.x), Some(0.0));
    }

    #[test]
    fn test_child_hidden_after_layout_loses_frame() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        let visible = Arc::new(AtomicBool::new(true));
        let card = tree.insert_leaf(Box::new(Toggle {
            size: Size::new(40.0, 20.0),
            visible: Arc::clone(&visible),
        }));
        tree.attach(cards, card).unwrap();
        tree.flush();
        assert_eq!(tree.frame(card), Some(Rect::new(0.0, 0.0, 40.0, 20.0)));

        visible.store(false, Ordering::Relaxed);
        tree.invalidate(card).unwrap();
        tree.flush();
        assert_eq!(tree.frame(card), None);
        assert_eq!(tree.content_height(cards), Some(0.0));
    }

    #[test]
    fn test_container_in_flow_is_capped_at_flow_width() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        resize(&mut tree, cards, 300.0);
        let group = tree.new_group();
        let inner = tree.insert_container(Box::new(FixedElement::empty()), group);
        tree.attach(cards, inner).unwrap();
        let card = leaf(&mut tree, 40.0, 20.0);
        tree.attach(inner, card).unwrap();
        tree.flush();

        assert_eq!(tree.frame(inner), Some(Rect::new(0.0, 0.0, 300.0, 20.0)));
        assert_eq!(tree.frame(card), Some(Rect::new(0.0, 0.0, 300.0, 20.0)));
    }

    #[test]
    fn test_sized_container_in_flow_keeps_narrower_width() {
        let mut tree = UiTree::new();
        let cards = flow(&mut tree);
        resize(&mut tree, cards, 300.0);
        let group = tree.new_group();
        let inner = tree.insert_container(Box::new(FixedElement::new(120.0, 0.0)), group);
        tree.attach(cards, inner).unwrap();
        let card = leaf(&mut tree, 40.0, 20.0);
        tree.attach(inner, card).unwrap();
        tree.flush();

        assert_eq!(tree.frame(inner), Some(Rect::new(0.0, 0.0, 120.0, 20.0)));
    }

    #[test]
    fn test_update_placement_reaches_grid() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);
        tree.attach(row, a).unwrap();
        resize(&mut tree, row, 480.0);
        tree.flush();
        assert_eq!(tree.frame(a).map(|f| f.width), Some(480.0));

        tree.update_placement(a, |p| p.set_span(6)).unwrap();
        assert!(tree.is_layout_pending(row));
        tree.flush();
        assert_eq!(tree.frame(a).map(|f| f.width), Some(120.0));
    }

    #[test]
    fn test_typed_container_access() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);

        tree.with_grid(row, |g| g.set_gutter(12.0)).unwrap();
        assert!(tree.is_layout_pending(row));
        assert_eq!(
            tree.with_flow(row, |f| f.set_spacing(1.0)),
            Err(TreeError::WrongContainer {
                node: row,
                expected: ContainerKind::Flow
            })
        );
        assert_eq!(tree.with_group(a, |_| ()), Err(TreeError::NotAContainer(a)));
    }

    #[test]
    fn test_detach() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let other = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);
        tree.attach(row, a).unwrap();

        assert_eq!(
            tree.detach(other, a),
            Err(TreeError::NotAChild {
                parent: other,
                child: a
            })
        );
        tree.detach(row, a).unwrap();
        assert!(tree.children(row).is_empty());
        assert_eq!(tree.attach(other, a), Err(TreeError::AlreadyAttached(a)));
        assert!(tree.roots().contains(&a));
    }

    #[test]
    fn test_destroy_removes_from_parent_and_unsubscribes() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        let a = leaf(&mut tree, 10.0, 10.0);
        tree.attach(row, a).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tree.subscribe_theme(
            a,
            Box::new(move |node, event| sink.lock().unwrap().push((node, event.mode))),
        )
        .unwrap();

        assert_eq!(tree.toggle_theme(), 1);
        tree.destroy(a).unwrap();
        assert_eq!(tree.toggle_theme(), 0);
        assert!(tree.children(row).is_empty());
        assert!(tree.is_layout_pending(row));
        assert_eq!(*seen.lock().unwrap(), vec![(a, ThemeMode::Dark)]);
    }

    #[test]
    fn test_relayout_is_idempotent() {
        let mut tree = UiTree::new();
        let row = grid(&mut tree);
        resize(&mut tree, row, 777.0);
        let mut kids = Vec::new();
        for i in 0..7 {
            let a = leaf(&mut tree, 10.0, 10.0 + i as f32);
            tree.update_placement(a, |p| p.set_span(5)).unwrap();
            tree.attach(row, a).unwrap();
            kids.push(a);
        }
        tree.relayout(row).unwrap();
        let first: Vec<_> = kids.iter().map(|&k| tree.frame(k)).collect();
        tree.relayout(row).unwrap();
        let second: Vec<_> = kids.iter().map(|&k| tree.frame(k)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_measure_cache_used_for_nested_containers() {
        let mut tree = UiTree::new();
        let outer = grid(&mut tree);
        let inner = flow(&mut tree);
        tree.attach(outer, inner).unwrap();
        tree.relayout(outer).unwrap();
        tree.relayout(outer).unwrap();
        assert!(tree.measure_cache().hits() >= 1);
    }
}
