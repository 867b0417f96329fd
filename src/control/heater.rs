//! Heater intensity controller.
//!
//! Discrete four-band thresholding on `desired − current`, no hysteresis:
//!
//! | condition                      | heater |
//! |--------------------------------|--------|
//! | fault active, or level Off     | Off    |
//! | desired < current              | Off    |
//! | diff < low                     | Off    |
//! | low ≤ diff < medium            | Low    |
//! | medium ≤ diff < high           | Medium |
//! | diff ≥ high                    | High   |
//!
//! The actuator is written only on change, plus once on every fault edge so
//! the Off command is guaranteed to land.

use log::debug;

use crate::app::ports::ActuatorPort;
use crate::config::SystemConfig;
use crate::drivers::periodic::Periodic;
use crate::state::{ChannelId, ChannelStore, HeaterState, HeatingLevel, LevelSetting};

/// Band edges in °C of `desired − current`. Each edge belongs to the
/// higher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low: i16,
    pub medium: i16,
    pub high: i16,
}

impl Thresholds {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            low: config.diff_low_c,
            medium: config.diff_medium_c,
            high: config.diff_high_c,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

/// The decision rule, free of any state.
pub fn decide_heater_state(
    setting: LevelSetting,
    current_c: i16,
    fault_active: bool,
    thresholds: &Thresholds,
) -> HeaterState {
    if fault_active || setting.level() == HeatingLevel::Off {
        return HeaterState::Off;
    }
    let desired = setting.desired_c();
    if desired < current_c {
        return HeaterState::Off;
    }
    // i32 so extreme sensor readings cannot overflow.
    let diff = i32::from(desired) - i32::from(current_c);
    if diff < i32::from(thresholds.low) {
        HeaterState::Off
    } else if diff < i32::from(thresholds.medium) {
        HeaterState::Low
    } else if diff < i32::from(thresholds.high) {
        HeaterState::Medium
    } else {
        HeaterState::High
    }
}

/// Per-channel periodic task.
pub struct HeaterController<'a, A> {
    channel: ChannelId,
    store: &'a ChannelStore,
    actuator: &'a A,
    thresholds: Thresholds,
    period_ms: u32,
    /// Shadow of the last actuator write; suppresses redundant writes.
    last_commanded: Option<HeaterState>,
    /// Fault flag seen on the previous cycle, for edge detection.
    fault_seen: bool,
}

impl<'a, A: ActuatorPort> HeaterController<'a, A> {
    pub fn new(
        channel: ChannelId,
        config: &SystemConfig,
        store: &'a ChannelStore,
        actuator: &'a A,
    ) -> Self {
        Self {
            channel,
            store,
            actuator,
            thresholds: Thresholds::from_config(config),
            period_ms: config.heater_period_ms,
            last_commanded: None,
            fault_seen: false,
        }
    }

    /// One control cycle. Returns the heater state now in the store.
    pub async fn step(&mut self) -> HeaterState {
        let (state, previous, fault_edge) = {
            let mut g = self.store.lock_all(self.channel).await;
            let previous = *g.heater;
            let fault = *g.fault;
            let state = decide_heater_state(*g.setting, *g.temperature, fault, &self.thresholds);
            *g.heater = state;
            let fault_edge = fault && !self.fault_seen;
            self.fault_seen = fault;
            (state, previous, fault_edge)
        };

        // `previous != state` catches a forced Off by the fault logger that
        // this controller never commanded.
        if self.last_commanded != Some(state) || previous != state || fault_edge {
            debug!("HEAT | {} -> {:?}", self.channel, state);
            self.actuator.set_heater_indicator(self.channel, state);
            self.last_commanded = Some(state);
        }
        state
    }

    pub async fn run(mut self) {
        let mut periodic = Periodic::new(self.period_ms);
        loop {
            self.step().await;
            periodic.tick().await;
        }
    }
}
