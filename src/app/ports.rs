//! Port traits: the boundary between the control core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ tasks / SeatHeaterService (domain)
//! ```
//!
//! Driven adapters (sensors, indicators, clocks, event sinks, config files)
//! implement these traits. The per-channel tasks consume them via generics,
//! so the core never touches hardware directly.
//!
//! Every method takes `&self`: one adapter instance is shared by all tasks
//! on the executor, so implementations use interior mutability where they
//! need state. Calls are synchronous and must not block.

use crate::config::SystemConfig;
use crate::state::{ChannelId, HeaterState};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for seat temperature.
pub trait SensorPort {
    /// Current seat temperature in whole °C. Side-effect free.
    ///
    /// May return anything, including values far outside the valid range;
    /// that is the fault trigger, not an error.
    fn read_raw_temperature(&self, channel: ChannelId) -> i16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the heater and fault indicators. Both are idempotent.
pub trait ActuatorPort {
    /// Drive the heater intensity output.
    fn set_heater_indicator(&self, channel: ChannelId, state: HeaterState);

    /// Light or clear the fault indicator.
    fn set_fault_indicator(&self, channel: ChannelId, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock used to timestamp failure records.
pub trait TimePort {
    /// Milliseconds since an arbitrary fixed origin (usually boot).
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The reporters emit structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations must reject invalid values with
/// [`ConfigError::ValidationFailed`] rather than clamp them.
pub trait ConfigPort {
    /// Load configuration. Returns [`SystemConfig::default()`] if no stored
    /// config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The named config source does not exist.
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
