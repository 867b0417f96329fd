//! Closed-loop control.

pub mod heater;
