//! Unified error types for the seat heater core.
//!
//! The control algorithm itself has no error path: sensor faults are state
//! transitions, not `Err` values. What remains here are contract violations
//! caught at construction time (bad channel or control ids) and bad
//! configuration. All variants are `Copy` so they can be passed around
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A channel index outside `0..CHANNEL_COUNT`.
    InvalidChannel(u8),
    /// A control index that maps to no physical control.
    InvalidControl(u8),
    /// Configuration failed validation.
    /// The `&'static str` names the field and the rule it broke.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(index) => write!(f, "invalid channel id {index}"),
            Self::InvalidControl(index) => write!(f, "invalid control id {index}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
