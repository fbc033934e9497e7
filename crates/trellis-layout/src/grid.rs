//! Responsive 24-column grid (Row / Column).
//!
//! Children declare a `span` (columns occupied) and an `offset` (empty
//! columns before them), optionally per breakpoint. A row wraps its
//! children into as many lines as needed, each line holding at most 24
//! columns, and places every line according to the row's justify and
//! align modes.
//!
//! Column pitch is `(width + gutter) / 24`. A child spanning `n` columns is
//! `n * pitch - gutter` wide, so a full line of children sits flush with
//! both edges with exactly one gutter between neighbours.

use crate::breakpoint::{Breakpoint, BreakpointTable};
use crate::error::LayoutError;
use crate::strategy::{effective_width, Arrangement, LayoutStrategy, Measure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use trellis_core::{NodeId, Rect};

/// Number of columns in one grid line.
pub const GRID_COLUMNS: u32 = 24;

/// Horizontal distribution of a line's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    /// Pack at the left edge
    #[default]
    Start,
    /// Pack at the right edge
    End,
    /// Center the line
    Center,
    /// First and last flush to the edges, free space between
    SpaceBetween,
    /// Equal space around each child (half at the edges)
    SpaceAround,
    /// Equal space before, between and after children
    SpaceEvenly,
}

impl fmt::Display for Justify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Center => "center",
            Self::SpaceBetween => "space-between",
            Self::SpaceAround => "space-around",
            Self::SpaceEvenly => "space-evenly",
        })
    }
}

impl FromStr for Justify {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "center" => Ok(Self::Center),
            "space-between" => Ok(Self::SpaceBetween),
            "space-around" => Ok(Self::SpaceAround),
            "space-evenly" => Ok(Self::SpaceEvenly),
            _ => Err(LayoutError::UnknownJustify(s.to_string())),
        }
    }
}

/// Vertical placement of a child within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Top of the line
    #[default]
    Top,
    /// Vertically centered
    Middle,
    /// Bottom of the line
    Bottom,
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        })
    }
}

impl FromStr for Align {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            _ => Err(LayoutError::UnknownAlign(s.to_string())),
        }
    }
}

fn clamp_span(span: u32) -> u32 {
    span.clamp(1, GRID_COLUMNS)
}

/// Span/offset replacement applied at one breakpoint.
///
/// Either field may be left unset to inherit the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponsiveOverride {
    /// Span at this breakpoint (clamped to 1..=24)
    pub span: Option<u32>,
    /// Offset at this breakpoint
    pub offset: Option<u32>,
}

impl ResponsiveOverride {
    /// Override the span only.
    #[must_use]
    pub fn span(span: u32) -> Self {
        Self {
            span: Some(clamp_span(span)),
            offset: None,
        }
    }

    /// Override the offset only.
    #[must_use]
    pub const fn offset(offset: u32) -> Self {
        Self {
            span: None,
            offset: Some(offset),
        }
    }

    /// Also override the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    fn clamped(self) -> Self {
        Self {
            span: self.span.map(clamp_span),
            offset: self.offset,
        }
    }
}

/// Span and offset in effect at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPlacement {
    /// Columns occupied
    pub span: u32,
    /// Empty columns before the child
    pub offset: u32,
}

impl ResolvedPlacement {
    /// Columns consumed on a line: `span + offset`.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.span.saturating_add(self.offset)
    }
}

/// Column placement of a grid child (its column scale).
///
/// The span always lies in `1..=24`; setters clamp. `span + offset` may
/// exceed 24, in which case the child gets a line of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlacementFields")]
pub struct GridPlacement {
    span: u32,
    offset: u32,
    overrides: BTreeMap<Breakpoint, ResponsiveOverride>,
}

/// Unchecked serialized form of [`GridPlacement`].
#[derive(Deserialize)]
struct PlacementFields {
    #[serde(default = "full_span")]
    span: u32,
    #[serde(default)]
    offset: u32,
    #[serde(default)]
    overrides: BTreeMap<Breakpoint, ResponsiveOverride>,
}

const fn full_span() -> u32 {
    GRID_COLUMNS
}

impl From<PlacementFields> for GridPlacement {
    fn from(fields: PlacementFields) -> Self {
        Self {
            span: clamp_span(fields.span),
            offset: fields.offset,
            overrides: fields
                .overrides
                .into_iter()
                .map(|(breakpoint, value)| (breakpoint, value.clamped()))
                .collect(),
        }
    }
}

impl Default for GridPlacement {
    fn default() -> Self {
        Self {
            span: GRID_COLUMNS,
            offset: 0,
            overrides: BTreeMap::new(),
        }
    }
}

impl GridPlacement {
    /// Full-width placement (span 24, offset 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placement spanning `span` columns.
    #[must_use]
    pub fn span(span: u32) -> Self {
        Self {
            span: clamp_span(span),
            ..Self::default()
        }
    }

    /// Set the base offset.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Add an override for `breakpoint`.
    #[must_use]
    pub fn at(mut self, breakpoint: Breakpoint, value: ResponsiveOverride) -> Self {
        self.set_override(breakpoint, value);
        self
    }

    /// Base span.
    #[must_use]
    pub const fn base_span(&self) -> u32 {
        self.span
    }

    /// Base offset.
    #[must_use]
    pub const fn base_offset(&self) -> u32 {
        self.offset
    }

    /// Override registered for `breakpoint`.
    #[must_use]
    pub fn override_for(&self, breakpoint: Breakpoint) -> Option<ResponsiveOverride> {
        self.overrides.get(&breakpoint).copied()
    }

    /// Set the base span, clamped to `1..=24`.
    pub fn set_span(&mut self, span: u32) {
        self.span = clamp_span(span);
    }

    /// Set the base offset.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Set or replace the override for `breakpoint`.
    pub fn set_override(&mut self, breakpoint: Breakpoint, value: ResponsiveOverride) {
        self.overrides.insert(breakpoint, value.clamped());
    }

    /// Set an override by breakpoint name.
    ///
    /// Unknown names leave the placement untouched.
    pub fn set_override_named(
        &mut self,
        breakpoint: &str,
        value: ResponsiveOverride,
    ) -> Result<(), LayoutError> {
        let breakpoint = breakpoint.parse()?;
        self.set_override(breakpoint, value);
        Ok(())
    }

    /// Remove the override for `breakpoint`.
    pub fn clear_override(&mut self, breakpoint: Breakpoint) -> bool {
        self.overrides.remove(&breakpoint).is_some()
    }

    /// Span and offset in effect at `breakpoint`.
    #[must_use]
    pub fn resolve(&self, breakpoint: Breakpoint) -> ResolvedPlacement {
        let value = self.overrides.get(&breakpoint);
        ResolvedPlacement {
            span: value.and_then(|o| o.span).unwrap_or(self.span),
            offset: value.and_then(|o| o.offset).unwrap_or(self.offset),
        }
    }
}

/// Row-level grid settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSpec {
    /// Pixels between neighbouring children and between lines
    pub gutter: f32,
    /// Horizontal distribution per line
    pub justify: Justify,
    /// Vertical placement within a line
    pub align: Align,
    /// Breakpoint thresholds
    pub breakpoints: BreakpointTable,
}

impl GridSpec {
    /// Create a spec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gutter.
    #[must_use]
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = sanitize_gutter(gutter, 0.0);
        self
    }

    /// Set the justify mode.
    #[must_use]
    pub const fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    /// Set the align mode.
    #[must_use]
    pub const fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Set the breakpoint table.
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: BreakpointTable) -> Self {
        self.breakpoints = breakpoints;
        self
    }
}

fn sanitize_gutter(gutter: f32, previous: f32) -> f32 {
    if gutter.is_finite() {
        gutter.max(0.0)
    } else {
        tracing::warn!(gutter, "ignoring non-finite gutter");
        previous
    }
}

/// One wrapped line of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    /// Indices of the children on this line
    pub items: Range<usize>,
    /// Top of the line
    pub y: f32,
    /// Tallest child on the line
    pub height: f32,
    /// Distance from the left edge to the first child's slot
    pub lead: f32,
    /// Space inserted between consecutive children
    pub gap: f32,
    /// Extent from the first child's slot to the last child's right edge
    pub width: f32,
}

/// Result of laying out a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    /// Width laid out against
    pub width: f32,
    /// Column pitch
    pub unit: f32,
    /// Wrapped lines, top to bottom
    pub lines: Vec<GridLine>,
    /// One frame per child, in child order
    pub frames: Vec<Rect>,
    /// Total height: line heights plus a gutter between lines
    pub height: f32,
}

/// Greedily split children into lines of at most 24 columns.
///
/// A child that does not fit starts a new line unless the current line is
/// empty; a child whose own `span + offset` exceeds 24 therefore sits
/// alone. Children are never split or reordered.
#[must_use]
pub fn pack_lines(placements: &[ResolvedPlacement]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used: u32 = 0;

    for (i, placement) in placements.iter().enumerate() {
        let columns = placement.columns();
        if i > start && used.saturating_add(columns) > GRID_COLUMNS {
            lines.push(start..i);
            start = i;
            used = 0;
        }
        used = used.saturating_add(columns);
    }
    if start < placements.len() {
        lines.push(start..placements.len());
    }
    lines
}

/// Leading space and inter-child gap for a line.
///
/// `content` is the summed width of children and their offsets.
fn distribute(justify: Justify, width: f32, content: f32, count: usize, gutter: f32) -> (f32, f32) {
    let n = count as f32;
    let natural = content + gutter * (n - 1.0).max(0.0);
    let free = width - content;

    match justify {
        Justify::Start => (0.0, gutter),
        Justify::End => ((width - natural).max(0.0), gutter),
        Justify::Center => (((width - natural) / 2.0).max(0.0), gutter),
        Justify::SpaceBetween if count >= 2 && free >= 0.0 => (0.0, free / (n - 1.0)),
        Justify::SpaceAround if count >= 1 && free >= 0.0 => (free / n / 2.0, free / n),
        Justify::SpaceEvenly if count >= 1 && free >= 0.0 => {
            let gap = free / (n + 1.0);
            (gap, gap)
        }
        // Single-child space-between and overflowing lines pack at the start.
        Justify::SpaceBetween | Justify::SpaceAround | Justify::SpaceEvenly => (0.0, gutter),
    }
}

fn non_negative(value: f32) -> f32 {
    // f32::max discards NaN.
    value.max(0.0)
}

/// Lay out already-resolved placements.
///
/// `height_of(index, width)` returns the height hint of the child at
/// `index` once it is `width` pixels wide.
pub fn compute_grid_layout(
    spec: &GridSpec,
    width: f32,
    placements: &[ResolvedPlacement],
    mut height_of: impl FnMut(usize, f32) -> f32,
) -> GridLayout {
    let width = non_negative(width);
    let gutter = non_negative(spec.gutter);
    let unit = (width + gutter) / GRID_COLUMNS as f32;

    let widths: Vec<f32> = placements
        .iter()
        .map(|p| non_negative(p.span as f32 * unit - gutter))
        .collect();
    let heights: Vec<f32> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| non_negative(height_of(i, w)))
        .collect();

    let mut frames = vec![Rect::default(); placements.len()];
    let mut lines = Vec::new();
    let mut y = 0.0;

    for items in pack_lines(placements) {
        let content: f32 = items
            .clone()
            .map(|i| widths[i] + placements[i].offset as f32 * unit)
            .sum();
        let count = items.len();
        let (lead, gap) = distribute(spec.justify, width, content, count, gutter);
        let line_height = items.clone().map(|i| heights[i]).fold(0.0, f32::max);

        let mut x = lead;
        for i in items.clone() {
            x += placements[i].offset as f32 * unit;
            let h = heights[i];
            let dy = match spec.align {
                Align::Top => 0.0,
                Align::Middle => (line_height - h) / 2.0,
                Align::Bottom => line_height - h,
            };
            frames[i] = Rect::new(x, y + dy, widths[i], h);
            x += widths[i] + gap;
        }

        lines.push(GridLine {
            items,
            y,
            height: line_height,
            lead,
            gap,
            width: content + gap * (count as f32 - 1.0),
        });
        y += line_height + gutter;
    }

    let height = if lines.is_empty() { 0.0 } else { y - gutter };

    GridLayout {
        width,
        unit,
        lines,
        frames,
        height,
    }
}

/// A child of a grid container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridChild {
    /// The child node
    pub node: NodeId,
    /// Its column placement
    pub placement: GridPlacement,
}

/// Grid container state.
#[derive(Debug, Clone, Default)]
pub struct GridContainer {
    spec: GridSpec,
    children: Vec<GridChild>,
    current: Breakpoint,
    lines: Vec<Vec<NodeId>>,
}

struct GridPass {
    breakpoint: Breakpoint,
    nodes: Vec<NodeId>,
    layout: GridLayout,
}

impl GridContainer {
    /// Create an empty grid.
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    /// Row settings.
    #[must_use]
    pub const fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Set the gutter. Negative values clamp to zero; non-finite ones are ignored.
    pub fn set_gutter(&mut self, gutter: f32) {
        self.spec.gutter = sanitize_gutter(gutter, self.spec.gutter);
    }

    /// Set the justify mode.
    pub fn set_justify(&mut self, justify: Justify) {
        self.spec.justify = justify;
    }

    /// Set the align mode.
    pub fn set_align(&mut self, align: Align) {
        self.spec.align = align;
    }

    /// Replace the breakpoint table.
    pub fn set_breakpoints(&mut self, breakpoints: BreakpointTable) {
        self.spec.breakpoints = breakpoints;
    }

    /// Append a child with an explicit placement.
    pub fn push(&mut self, node: NodeId, placement: GridPlacement) {
        self.children.push(GridChild { node, placement });
    }

    /// Children with their placements.
    #[must_use]
    pub fn grid_children(&self) -> &[GridChild] {
        &self.children
    }

    /// Placement of `node`.
    #[must_use]
    pub fn placement(&self, node: NodeId) -> Option<&GridPlacement> {
        self.children
            .iter()
            .find(|c| c.node == node)
            .map(|c| &c.placement)
    }

    /// Mutable placement of `node`.
    pub fn placement_mut(&mut self, node: NodeId) -> Option<&mut GridPlacement> {
        self.children
            .iter_mut()
            .find(|c| c.node == node)
            .map(|c| &mut c.placement)
    }

    /// Breakpoint resolved by the last layout pass.
    #[must_use]
    pub const fn current_breakpoint(&self) -> Breakpoint {
        self.current
    }

    /// Lines produced by the last layout pass.
    #[must_use]
    pub fn lines(&self) -> &[Vec<NodeId>] {
        &self.lines
    }

    fn compute(&self, width: f32, measure: &mut dyn Measure) -> GridPass {
        let width = effective_width(width, measure.fallback_width());
        let breakpoint = self.spec.breakpoints.resolve(width);

        let visible: Vec<&GridChild> = self
            .children
            .iter()
            .filter(|c| measure.is_visible(c.node))
            .collect();
        let resolved: Vec<ResolvedPlacement> = visible
            .iter()
            .map(|c| c.placement.resolve(breakpoint))
            .collect();

        let layout = compute_grid_layout(&self.spec, width, &resolved, |i, w| {
            measure.size_hint(visible[i].node, Some(w)).height
        });

        GridPass {
            breakpoint,
            nodes: visible.iter().map(|c| c.node).collect(),
            layout,
        }
    }
}

impl LayoutStrategy for GridContainer {
    fn add_child(&mut self, node: NodeId, placement: Option<&GridPlacement>) {
        self.push(node, placement.cloned().unwrap_or_default());
    }

    fn remove_child(&mut self, node: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.node != node);
        self.children.len() != before
    }

    fn children(&self) -> Vec<NodeId> {
        self.children.iter().map(|c| c.node).collect()
    }

    fn arrange(&mut self, width: f32, measure: &mut dyn Measure) -> Arrangement {
        let pass = self.compute(width, measure);

        if pass.breakpoint != self.current {
            tracing::debug!(from = %self.current, to = %pass.breakpoint, "grid breakpoint changed");
        }
        self.current = pass.breakpoint;
        self.lines = pass
            .layout
            .lines
            .iter()
            .map(|line| line.items.clone().map(|i| pass.nodes[i]).collect())
            .collect();

        Arrangement {
            frames: pass.nodes.into_iter().zip(pass.layout.frames).collect(),
            height: pass.layout.height,
        }
    }

    fn height_for_width(&self, width: f32, measure: &mut dyn Measure) -> f32 {
        self.compute(width, measure).layout.height
    }
}
