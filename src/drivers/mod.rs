//! Interrupt sources, timers, and host simulation peripherals.

pub mod button;
pub mod periodic;
pub mod sim_pin;
pub mod sim_plant;
