//! System configuration parameters
//!
//! All tunable parameters for the seat heater system. Values can be
//! overridden from a JSON file (see [`crate::adapters::file_config`]);
//! anything the file leaves out keeps its default.
//!
//! The level → desired-temperature mapping is deliberately not here: it is
//! a fixed table in [`crate::state::HeatingLevel`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Sensor sampling period (milliseconds)
    pub sensor_period_ms: u32,
    /// Heater intensity controller period (milliseconds)
    pub heater_period_ms: u32,
    /// Status report period (milliseconds)
    pub status_period_ms: u32,
    /// CPU load report period (milliseconds)
    pub load_report_period_ms: u32,

    // --- Sensor validity ---
    /// Lowest plausible seat temperature (°C, inclusive)
    pub valid_min_c: i16,
    /// Highest plausible seat temperature (°C, inclusive)
    pub valid_max_c: i16,

    // --- Heater thresholds (desired − current, °C) ---
    /// Smallest difference that turns the heater on at Low
    pub diff_low_c: i16,
    /// Smallest difference that selects Medium
    pub diff_medium_c: i16,
    /// Smallest difference that selects High
    pub diff_high_c: i16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            sensor_period_ms: 100,       // 10 Hz
            heater_period_ms: 250,       // 4 Hz
            status_period_ms: 500,       // 2 Hz
            load_report_period_ms: 5000, // every 5 s

            // Sensor validity
            valid_min_c: 5,
            valid_max_c: 40,

            // Heater thresholds
            diff_low_c: 2,
            diff_medium_c: 5,
            diff_high_c: 10,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the control core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sensor_period_ms == 0
            || self.heater_period_ms == 0
            || self.status_period_ms == 0
            || self.load_report_period_ms == 0
        {
            return Err(Error::Config("task periods must be non-zero"));
        }
        if self.valid_min_c >= self.valid_max_c {
            return Err(Error::Config("valid_min_c must be below valid_max_c"));
        }
        if self.diff_low_c <= 0 {
            return Err(Error::Config("diff_low_c must be positive"));
        }
        if self.diff_low_c >= self.diff_medium_c || self.diff_medium_c >= self.diff_high_c {
            return Err(Error::Config("heater thresholds must be strictly increasing"));
        }
        Ok(())
    }
}
