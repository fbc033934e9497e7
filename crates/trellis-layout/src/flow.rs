//! Line-packing flow container.
//!
//! Children are packed left to right at their own size, wrapping to a new
//! line when the next child would cross the right edge. There is no column
//! abstraction; all arithmetic is in pixels.

use crate::grid::GridPlacement;
use crate::strategy::{effective_width, Arrangement, LayoutStrategy, Measure};
use serde::{Deserialize, Serialize};
use trellis_core::{NodeId, Rect, Size};

/// Default spacing between flow children.
pub const DEFAULT_FLOW_SPACING: f32 = 8.0;

/// Flow container settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSpec {
    /// Space between children on a line
    pub horizontal_spacing: f32,
    /// Space between lines
    pub vertical_spacing: f32,
}

impl Default for FlowSpec {
    fn default() -> Self {
        Self::uniform(DEFAULT_FLOW_SPACING)
    }
}

impl FlowSpec {
    /// Same spacing in both directions.
    #[must_use]
    pub fn uniform(spacing: f32) -> Self {
        let spacing = sanitize_spacing(spacing, 0.0);
        Self {
            horizontal_spacing: spacing,
            vertical_spacing: spacing,
        }
    }

    /// Set the spacing between children on a line.
    #[must_use]
    pub fn with_horizontal(mut self, spacing: f32) -> Self {
        self.horizontal_spacing = sanitize_spacing(spacing, self.horizontal_spacing);
        self
    }

    /// Set the spacing between lines.
    #[must_use]
    pub fn with_vertical(mut self, spacing: f32) -> Self {
        self.vertical_spacing = sanitize_spacing(spacing, self.vertical_spacing);
        self
    }
}

fn sanitize_spacing(spacing: f32, previous: f32) -> f32 {
    if spacing.is_finite() {
        spacing.max(0.0)
    } else {
        tracing::warn!(spacing, "ignoring non-finite flow spacing");
        previous
    }
}

/// Input to [`compute_flow_layout`]: a child's size, or `None` if hidden.
pub type FlowItem = Option<Size>;

/// Result of a flow pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    /// Frame per item; `None` for hidden items
    pub frames: Vec<Option<Rect>>,
    /// Item indices per line, top to bottom
    pub lines: Vec<Vec<usize>>,
    /// Bottom of the last line
    pub height: f32,
}

/// Pack `items` into lines no wider than `width`.
///
/// The first item on a line is never wrapped, so a single item wider than
/// the container overflows its line instead of producing an empty one.
#[must_use]
pub fn compute_flow_layout(spec: &FlowSpec, width: f32, items: &[FlowItem]) -> FlowLayout {
    let right = width.max(0.0);
    let mut frames = Vec::with_capacity(items.len());
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    let mut x = 0.0_f32;
    let mut y = 0.0_f32;
    let mut line_height = 0.0_f32;

    for (i, item) in items.iter().enumerate() {
        let Some(size) = item else {
            frames.push(None);
            continue;
        };
        let (w, h) = (size.width.max(0.0), size.height.max(0.0));

        if x > 0.0 && x + w > right {
            x = 0.0;
            y += line_height + spec.vertical_spacing;
            line_height = 0.0;
            lines.push(std::mem::take(&mut current));
        }

        frames.push(Some(Rect::new(x, y, w, h)));
        current.push(i);
        x += w + spec.horizontal_spacing;
        line_height = line_height.max(h);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    FlowLayout {
        frames,
        lines,
        height: y + line_height,
    }
}

/// Flow container state.
#[derive(Debug, Clone, Default)]
pub struct FlowContainer {
    spec: FlowSpec,
    children: Vec<NodeId>,
    lines: Vec<Vec<NodeId>>,
}

impl FlowContainer {
    /// Create an empty flow.
    #[must_use]
    pub fn new(spec: FlowSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn spec(&self) -> &FlowSpec {
        &self.spec
    }

    /// Set both spacings.
    pub fn set_spacing(&mut self, spacing: f32) {
        self.spec = self
            .spec
            .with_horizontal(spacing)
            .with_vertical(spacing);
    }

    /// Replace the settings.
    pub fn set_spec(&mut self, spec: FlowSpec) {
        self.spec = spec;
    }

    /// Lines produced by the last layout pass.
    #[must_use]
    pub fn lines(&self) -> &[Vec<NodeId>] {
        &self.lines
    }

    fn compute(&self, width: f32, measure: &mut dyn Measure) -> FlowLayout {
        let width = effective_width(width, measure.fallback_width());
        let items: Vec<FlowItem> = self
            .children
            .iter()
            .map(|&node| {
                measure
                    .is_visible(node)
                    .then(|| measure.size_hint_within(node, width))
            })
            .collect();
        compute_flow_layout(&self.spec, width, &items)
    }
}

impl LayoutStrategy for FlowContainer {
    fn add_child(&mut self, node: NodeId, placement: Option<&GridPlacement>) {
        if placement.is_some() {
            tracing::trace!(%node, "flow ignores grid placement");
        }
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
        let layout = self.compute(width, measure);
        self.lines = layout
            .lines
            .iter()
            .map(|line| line.iter().map(|&i| self.children[i]).collect())
            .collect();

        Arrangement {
            frames: self
                .children
                .iter()
                .zip(layout.frames)
                .filter_map(|(&node, frame)| frame.map(|f| (node, f)))
                .collect(),
            height: layout.height,
        }
    }

    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32 {
        self.compute(width, measure).height
    }
}
