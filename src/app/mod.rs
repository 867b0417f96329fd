//! Application core: domain wiring, zero direct I/O.
//!
//! The service owns the shared state and builds the tasks. All interaction
//! with hardware happens through the **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
