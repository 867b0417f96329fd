//! Dual-seat heater control core.
//!
//! Exposes every module for integration testing and for the host
//! simulation binary. Hardware is reached only through the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod reporter;
pub mod runtime;
pub mod safety;
pub mod selector;
pub mod state;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
