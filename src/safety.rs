//! Fault detector.
//!
//! Pure range validation plus an edge-triggered latch, one instance per
//! channel, owned by that channel's sensor sampler.
//!
//! ## Fault lifecycle
//!
//! 1. A reading leaves `[valid_min_c, valid_max_c]`.
//! 2. If the latch was clear, [`FaultDetector::evaluate`] returns
//!    [`FaultTransition::Raised`] and the latch sets. Further bad readings
//!    return `Unchanged`, so a stuck sensor raises exactly once.
//! 3. The first in-range reading returns [`FaultTransition::Cleared`] and
//!    the latch clears.

use log::{error, info};

use crate::config::SystemConfig;
use crate::diagnostics::FailureKind;

/// Outcome of feeding one reading to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    /// Rising edge: the channel just became faulted.
    Raised(FailureKind),
    /// Falling edge: the channel just recovered.
    Cleared,
    /// No edge.
    Unchanged,
}

/// Range check with a one-bit latch.
#[derive(Debug, Clone)]
pub struct FaultDetector {
    min_c: i16,
    max_c: i16,
    active: bool,
}

impl FaultDetector {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_c: config.valid_min_c,
            max_c: config.valid_max_c,
            active: false,
        }
    }

    /// Classify a reading without touching the latch. Bounds are inclusive.
    pub fn classify(&self, celsius: i16) -> Option<FailureKind> {
        if celsius > self.max_c {
            Some(FailureKind::OverRange)
        } else if celsius < self.min_c {
            Some(FailureKind::UnderRange)
        } else {
            None
        }
    }

    /// Feed one reading and report the latch edge, if any.
    pub fn evaluate(&mut self, celsius: i16) -> FaultTransition {
        match (self.classify(celsius), self.active) {
            (Some(kind), false) => {
                error!("SAFETY FAULT SET: {kind:?} at {celsius} C");
                self.active = true;
                FaultTransition::Raised(kind)
            }
            (None, true) => {
                info!("SAFETY FAULT CLEARED at {celsius} C");
                self.active = false;
                FaultTransition::Cleared
            }
            _ => FaultTransition::Unchanged,
        }
    }

    /// Whether the latch is currently set.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
