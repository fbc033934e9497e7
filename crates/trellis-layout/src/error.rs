//! Layout error types.

use thiserror::Error;

/// Errors raised while interpreting layout configuration.
///
/// None of these abort a layout pass; callers that receive one keep the
/// previous setting.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Breakpoint name not in `xs`, `sm`, `md`, `lg`, `xl`.
    #[error("unknown breakpoint: {0}")]
    UnknownBreakpoint(String),

    /// Justify mode not recognised.
    #[error("unknown justify mode: {0}")]
    UnknownJustify(String),

    /// Align mode not recognised.
    #[error("unknown align mode: {0}")]
    UnknownAlign(String),

    /// Configuration text could not be parsed.
    #[error("invalid layout config: {0}")]
    Config(#[from] toml::de::Error),
}
