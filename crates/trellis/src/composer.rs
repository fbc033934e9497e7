//! Scoped composition.
//!
//! A [`Composer`] pairs a [`UiTree`] with the stack of open container
//! scopes. Nodes built without an explicit parent attach to the innermost
//! open scope:
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut ui = Composer::new();
//! let page = ui.group().build();
//! ui.scope(page, |ui| {
//!     let row = ui.grid().build();
//!     ui.scope(row, |ui| {
//!         ui.leaf(FixedElement::new(120.0, 40.0)).span(8).build();
//!         ui.leaf(FixedElement::new(120.0, 40.0)).span(16).build();
//!     });
//! });
//! assert_eq!(ui.tree().children(page).len(), 1);
//! ```
//!
//! Misuse (closing a scope out of order, building into a destroyed
//! container, unknown mode names) is logged and otherwise ignored.

use crate::context::AttachmentStack;
use crate::error::TreeError;
use crate::tree::UiTree;
use std::ops::{Deref, DerefMut};
use std::time::Instant;
use trellis_core::{Element, FixedElement, NodeId, Size, ThemeCallback, ThemeEvent, ThemeMode};
use trellis_layout::{
    Align, Breakpoint, Container, GridPlacement, Justify, LayoutConfig, ResponsiveOverride,
};

/// Log a tree error that the composition API tolerates.
fn tolerate<T>(op: &'static str, result: Result<T, TreeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(op, %err, "ignored");
            None
        }
    }
}

/// Builds a tree through nested container scopes.
#[derive(Debug, Default)]
pub struct Composer {
    tree: UiTree,
    stack: AttachmentStack,
}

impl Composer {
    /// Create a composer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer.
    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            tree: UiTree::with_config(config),
            stack: AttachmentStack::new(),
        }
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &UiTree {
        &self.tree
    }

    /// Mutable access to the tree.
    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    /// Finish composing and keep the tree.
    #[must_use]
    pub fn into_tree(self) -> UiTree {
        if !self.stack.is_empty() {
            tracing::warn!(open = self.stack.depth(), "composer dropped with open scopes");
        }
        self.tree
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Open a scope for `container`; nodes built until it closes attach to it.
    pub fn enter_scope(&mut self, container: NodeId) -> NodeId {
        if self.tree.kind(container).is_none() {
            tracing::warn!(%container, "scope opened on a node that is not a live container");
        }
        self.stack.push(container)
    }

    /// Close the scope for `container`.
    ///
    /// Only the innermost scope can be closed; anything else is ignored.
    pub fn exit_scope(&mut self, container: NodeId) -> bool {
        let closed = self.stack.pop_if_top(container);
        if !closed {
            tracing::warn!(%container, top = ?self.stack.top(), "ignoring out-of-order scope exit");
        }
        closed
    }

    /// Innermost open container.
    #[must_use]
    pub fn current_scope(&self) -> Option<NodeId> {
        self.stack.top()
    }

    /// Number of open scopes.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Run `f` with a scope open for `container`.
    ///
    /// The scope closes when `f` returns, including by unwinding.
    pub fn scope<R>(&mut self, container: NodeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.open(container);
        f(&mut guard)
    }

    /// Open a scope that closes when the guard is dropped.
    pub fn open(&mut self, container: NodeId) -> ScopeGuard<'_> {
        self.enter_scope(container);
        ScopeGuard {
            composer: self,
            container,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Start a leaf backed by `element`.
    pub fn leaf(&mut self, element: impl Element + 'static) -> NodeBuilder<'_> {
        NodeBuilder::new(self, Box::new(element), None)
    }

    /// Start a 24-column grid (a row).
    pub fn grid(&mut self) -> NodeBuilder<'_> {
        let container = self.tree.new_grid();
        self.container(container)
    }

    /// Start a flow.
    pub fn flow(&mut self) -> NodeBuilder<'_> {
        let container = self.tree.new_flow();
        self.container(container)
    }

    /// Start a vertical group.
    pub fn group(&mut self) -> NodeBuilder<'_> {
        let container = self.tree.new_group();
        self.container(container)
    }

    /// Start a page stack.
    pub fn stacked(&mut self) -> NodeBuilder<'_> {
        let container = self.tree.new_stacked();
        self.container(container)
    }

    /// Start a container with an explicit strategy.
    pub fn container(&mut self, container: Container) -> NodeBuilder<'_> {
        NodeBuilder::new(self, Box::new(FixedElement::empty()), Some(container))
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Set the gutter of grid `row`.
    pub fn set_gutter(&mut self, row: NodeId, gutter: f32) {
        tolerate("set_gutter", self.tree.with_grid(row, |g| g.set_gutter(gutter)));
    }

    /// Set the justify mode of grid `row`.
    pub fn set_justify(&mut self, row: NodeId, justify: Justify) {
        tolerate("set_justify", self.tree.with_grid(row, |g| g.set_justify(justify)));
    }

    /// Set the justify mode of grid `row` by name; unknown names are ignored.
    pub fn set_justify_named(&mut self, row: NodeId, justify: &str) {
        match justify.parse() {
            Ok(justify) => self.set_justify(row, justify),
            Err(err) => tracing::warn!(%row, %err, "keeping previous justify"),
        }
    }

    /// Set the align mode of grid `row`.
    pub fn set_align(&mut self, row: NodeId, align: Align) {
        tolerate("set_align", self.tree.with_grid(row, |g| g.set_align(align)));
    }

    /// Set the align mode of grid `row` by name; unknown names are ignored.
    pub fn set_align_named(&mut self, row: NodeId, align: &str) {
        match align.parse() {
            Ok(align) => self.set_align(row, align),
            Err(err) => tracing::warn!(%row, %err, "keeping previous align"),
        }
    }

    /// Set the spacing of a flow or group.
    pub fn set_spacing(&mut self, container: NodeId, spacing: f32) {
        let result = self.tree.update_container(container, |c| {
            if let Some(flow) = c.as_flow_mut() {
                flow.set_spacing(spacing);
                true
            } else if let Some(group) = c.as_group_mut() {
                group.set_spacing(spacing);
                true
            } else {
                false
            }
        });
        if tolerate("set_spacing", result) == Some(false) {
            tracing::warn!(%container, "spacing applies to flows and groups only");
        }
    }

    /// Show page `index` of a page stack.
    pub fn set_current_page(&mut self, pages: NodeId, index: usize) {
        tolerate("set_current_page", self.tree.with_stacked(pages, |s| s.set_current(index)));
    }

    /// Set the base span of `node`, clamped to 1..=24.
    pub fn set_span(&mut self, node: NodeId, span: u32) {
        tolerate("set_span", self.tree.update_placement(node, |p| p.set_span(span)));
    }

    /// Set the base offset of `node`.
    pub fn set_offset(&mut self, node: NodeId, offset: u32) {
        tolerate("set_offset", self.tree.update_placement(node, |p| p.set_offset(offset)));
    }

    /// Set the span/offset used by `node` at `breakpoint`.
    pub fn set_override(&mut self, node: NodeId, breakpoint: Breakpoint, value: ResponsiveOverride) {
        tolerate(
            "set_override",
            self.tree
                .update_placement(node, |p| p.set_override(breakpoint, value)),
        );
    }

    /// Set a breakpoint override by name; unknown names are ignored.
    pub fn set_override_named(&mut self, node: NodeId, breakpoint: &str, value: ResponsiveOverride) {
        match breakpoint.parse() {
            Ok(breakpoint) => self.set_override(node, breakpoint, value),
            Err(err) => tracing::warn!(%node, %err, "ignoring override"),
        }
    }

    /// Destroy `node` and its subtree.
    pub fn destroy(&mut self, node: NodeId) {
        tolerate("destroy", self.tree.destroy(node));
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Forward a "shown" notification from the host.
    pub fn notify_shown(&mut self, node: NodeId) {
        tolerate("notify_shown", self.tree.notify_shown(node));
    }

    /// Forward a resize notification from the host.
    pub fn notify_resized(&mut self, node: NodeId, old: Size, new: Size) {
        tolerate("notify_resized", self.tree.notify_resized(node, old, new));
    }

    /// Run relayouts that are due at `now`.
    pub fn pump(&mut self, now: Instant) -> usize {
        self.tree.pump(now)
    }

    /// Run every pending relayout now.
    pub fn flush(&mut self) -> usize {
        self.tree.flush()
    }

    /// Switch theme mode.
    pub fn set_theme(&mut self, mode: ThemeMode) -> usize {
        self.tree.set_theme(mode)
    }

    /// Flip between light and dark.
    pub fn toggle_theme(&mut self) -> usize {
        self.tree.toggle_theme()
    }
}

/// An open scope; closes on drop.
///
/// Derefs to the [`Composer`], so nodes can be built through the guard.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    composer: &'a mut Composer,
    container: NodeId,
}

impl ScopeGuard<'_> {
    /// Container this scope belongs to.
    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Composer;

    fn deref(&self) -> &Composer {
        self.composer
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Composer {
        self.composer
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.composer.exit_scope(self.container);
    }
}

/// Configures a node before it is added to the tree.
#[must_use = "nodes are only created by `build`"]
pub struct NodeBuilder<'a> {
    composer: &'a mut Composer,
    element: Box<dyn Element>,
    container: Option<Container>,
    parent: Option<NodeId>,
    placement: Option<GridPlacement>,
    fixed_size: Option<Size>,
    on_theme: Vec<ThemeCallback>,
}

impl<'a> NodeBuilder<'a> {
    fn new(composer: &'a mut Composer, element: Box<dyn Element>, container: Option<Container>) -> Self {
        Self {
            composer,
            element,
            container,
            parent: None,
            placement: None,
            fixed_size: None,
            on_theme: Vec::new(),
        }
    }

    /// Back a container with a host element instead of an empty one.
    pub fn element(mut self, element: impl Element + 'static) -> Self {
        self.element = Box::new(element);
        self
    }

    /// Attach to `parent` instead of the innermost open scope.
    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    fn placement_mut(&mut self) -> &mut GridPlacement {
        self.placement.get_or_insert_with(GridPlacement::default)
    }

    /// Full grid placement.
    pub fn placement(mut self, placement: GridPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Columns spanned in a grid, clamped to 1..=24.
    pub fn span(mut self, span: u32) -> Self {
        self.placement_mut().set_span(span);
        self
    }

    /// Empty columns before the node in a grid.
    pub fn offset(mut self, offset: u32) -> Self {
        self.placement_mut().set_offset(offset);
        self
    }

    /// Span/offset at one breakpoint.
    pub fn at(mut self, breakpoint: Breakpoint, value: ResponsiveOverride) -> Self {
        self.placement_mut().set_override(breakpoint, value);
        self
    }

    /// Breakpoint override by name; unknown names are logged and ignored.
    pub fn at_named(mut self, breakpoint: &str, value: ResponsiveOverride) -> Self {
        if let Err(err) = self.placement_mut().set_override_named(breakpoint, value) {
            tracing::warn!(%err, "ignoring override");
        }
        self
    }

    /// Use a fixed size instead of the element's size hint.
    pub fn fixed_size(mut self, width: f32, height: f32) -> Self {
        self.fixed_size = Some(Size::new(width, height));
        self
    }

    /// Be notified of theme changes while the node lives.
    pub fn on_theme(mut self, callback: impl FnMut(NodeId, ThemeEvent) + Send + 'static) -> Self {
        self.on_theme.push(Box::new(callback));
        self
    }

    /// Add the node to the tree and attach it.
    ///
    /// Without an explicit parent the node attaches to the innermost open
    /// scope, or stays a root if none is open.
    pub fn build(self) -> NodeId {
        let Self {
            composer,
            element,
            container,
            parent,
            placement,
            fixed_size,
            on_theme,
        } = self;
        let tree = &mut composer.tree;

        let id = match container {
            Some(container) => tree.insert_container(element, container),
            None => tree.insert_leaf(element),
        };
        if let Some(placement) = placement {
            tolerate("placement", tree.update_placement(id, |p| *p = placement));
        }
        if fixed_size.is_some() {
            tolerate("fixed_size", tree.set_fixed_size(id, fixed_size));
        }
        for callback in on_theme {
            tolerate("on_theme", tree.subscribe_theme(id, callback));
        }

        if let Some(owner) = parent.or_else(|| composer.stack.top()) {
            if let Err(err) = tree.attach(owner, id) {
                tracing::warn!(node = %id, %owner, %err, "node left unattached");
            }
        }
        id
    }
}
