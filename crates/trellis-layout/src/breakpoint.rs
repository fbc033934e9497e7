//! Responsive breakpoints.
//!
//! A breakpoint is a named container-width threshold. Resolution picks the
//! breakpoint with the greatest threshold that does not exceed the width.

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named breakpoint, ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    /// Extra small (phones)
    #[default]
    Xs,
    /// Small (tablets)
    Sm,
    /// Medium (laptops)
    Md,
    /// Large (desktops)
    Lg,
    /// Extra large (wide screens)
    Xl,
}

impl Breakpoint {
    /// All breakpoints, narrowest first.
    pub const ALL: [Self; 5] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl];

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }

    /// Default minimum width for this breakpoint.
    #[must_use]
    pub const fn default_threshold(self) -> f32 {
        match self {
            Self::Xs => 0.0,
            Self::Sm => 768.0,
            Self::Md => 992.0,
            Self::Lg => 1200.0,
            Self::Xl => 1920.0,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Breakpoint {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xs" => Ok(Self::Xs),
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            "xl" => Ok(Self::Xl),
            _ => Err(LayoutError::UnknownBreakpoint(s.to_string())),
        }
    }
}

/// Threshold table mapping widths to breakpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Breakpoint, f32>", into = "BTreeMap<Breakpoint, f32>")]
pub struct BreakpointTable {
    /// Sorted ascending by threshold.
    thresholds: Vec<(f32, Breakpoint)>,
}

impl BreakpointTable {
    /// Build a table from explicit thresholds.
    ///
    /// Breakpoints missing from `overrides` keep their default threshold.
    /// Non-finite thresholds are ignored.
    #[must_use]
    pub fn with_thresholds(overrides: impl IntoIterator<Item = (Breakpoint, f32)>) -> Self {
        let mut map: BTreeMap<Breakpoint, f32> = Breakpoint::ALL
            .iter()
            .map(|&bp| (bp, bp.default_threshold()))
            .collect();
        for (bp, threshold) in overrides {
            if threshold.is_finite() {
                map.insert(bp, threshold.max(0.0));
            } else {
                tracing::warn!(breakpoint = %bp, threshold, "ignoring non-finite breakpoint threshold");
            }
        }
        let mut thresholds: Vec<(f32, Breakpoint)> =
            map.into_iter().map(|(bp, threshold)| (threshold, bp)).collect();
        // Equal thresholds keep the wider breakpoint last so it wins resolution.
        thresholds.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Self { thresholds }
    }

    /// Resolve the breakpoint for a container `width`.
    ///
    /// Widths below every threshold resolve to the narrowest breakpoint.
    #[must_use]
    pub fn resolve(&self, width: f32) -> Breakpoint {
        self.thresholds
            .iter()
            .rev()
            .find(|(threshold, _)| *threshold <= width)
            .or_else(|| self.thresholds.first())
            .map_or(Breakpoint::Xs, |&(_, bp)| bp)
    }

    /// Threshold registered for `breakpoint`.
    #[must_use]
    pub fn threshold(&self, breakpoint: Breakpoint) -> f32 {
        self.thresholds
            .iter()
            .find(|(_, bp)| *bp == breakpoint)
            .map_or_else(|| breakpoint.default_threshold(), |&(t, _)| t)
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::with_thresholds(std::iter::empty())
    }
}

/// Partial maps override only the breakpoints they name.
impl From<BTreeMap<Breakpoint, f32>> for BreakpointTable {
    fn from(map: BTreeMap<Breakpoint, f32>) -> Self {
        Self::with_thresholds(map)
    }
}

impl From<BreakpointTable> for BTreeMap<Breakpoint, f32> {
    fn from(table: BreakpointTable) -> Self {
        table
            .thresholds
            .into_iter()
            .map(|(threshold, bp)| (bp, threshold))
            .collect()
    }
}
