//! Layout configuration.

use crate::breakpoint::BreakpointTable;
use crate::error::LayoutError;
use crate::flow::{FlowSpec, DEFAULT_FLOW_SPACING};
use crate::grid::{Align, GridSpec, Justify};
use crate::scheduler::DEFAULT_DEBOUNCE;
use crate::strategy::{DEFAULT_CONTAINER_WIDTH, DEFAULT_FALLBACK_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trellis_core::Size;

/// Default bound on cascaded relayout passes per flush.
pub const DEFAULT_MAX_FLUSH_PASSES: usize = 64;

/// Defaults applied to newly created grids.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDefaults {
    /// Gutter in pixels
    pub gutter: f32,
    /// Justify mode
    pub justify: Justify,
    /// Align mode
    pub align: Align,
}

/// Defaults applied to newly created flows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowDefaults {
    /// Spacing in both directions
    pub spacing: f32,
}

impl Default for FlowDefaults {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_FLOW_SPACING,
        }
    }
}

/// Tunables for layout and relayout scheduling.
///
/// ```toml
/// debounce_ms = 16
/// default_width = 1024.0
///
/// [breakpoints]
/// sm = 600.0
///
/// [grid]
/// gutter = 12.0
/// justify = "space-between"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Relayout coalescing window in milliseconds
    pub debounce_ms: u64,
    /// Width assumed for containers that have not been sized yet
    pub default_width: f32,
    /// Substituted for unusable size hints, per dimension
    pub fallback_size: Size,
    /// Bound on cascaded relayout passes in one flush
    pub max_flush_passes: usize,
    /// Breakpoint thresholds
    pub breakpoints: BreakpointTable,
    /// Grid defaults
    pub grid: GridDefaults,
    /// Flow defaults
    pub flow: FlowDefaults,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            default_width: DEFAULT_CONTAINER_WIDTH,
            fallback_size: DEFAULT_FALLBACK_SIZE,
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
            breakpoints: BreakpointTable::default(),
            grid: GridDefaults::default(),
            flow: FlowDefaults::default(),
        }
    }
}

impl LayoutConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, LayoutError> {
        let config: Self = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Coalescing window as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Grid settings for a new grid.
    #[must_use]
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec::new()
            .with_gutter(self.grid.gutter)
            .with_justify(self.grid.justify)
            .with_align(self.grid.align)
            .with_breakpoints(self.breakpoints.clone())
    }

    /// Flow settings for a new flow.
    #[must_use]
    pub fn flow_spec(&self) -> FlowSpec {
        FlowSpec::uniform(self.flow.spacing)
    }

    /// Replace unusable numeric values with their defaults.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.default_width.is_finite() && self.default_width > 0.0) {
            tracing::warn!(value = self.default_width, "invalid default_width, using default");
            self.default_width = defaults.default_width;
        }
        if !self.fallback_size.is_usable() {
            tracing::warn!(value = ?self.fallback_size, "invalid fallback_size, using default");
            self.fallback_size = self.fallback_size.or_fallback(defaults.fallback_size);
        }
        if self.max_flush_passes == 0 {
            tracing::warn!("max_flush_passes must be at least 1");
            self.max_flush_passes = 1;
        }
        if !(self.grid.gutter.is_finite() && self.grid.gutter >= 0.0) {
            tracing::warn!(value = self.grid.gutter, "invalid grid gutter, using 0");
            self.grid.gutter = 0.0;
        }
        if !(self.flow.spacing.is_finite() && self.flow.spacing >= 0.0) {
            tracing::warn!(value = self.flow.spacing, "invalid flow spacing, using default");
            self.flow.spacing = defaults.flow.spacing;
        }
        self
    }
}
