//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO registers. Readings and the clock
//! are set by the test.

use std::cell::{Cell, RefCell};

use seatheat::app::events::AppEvent;
use seatheat::app::ports::{ActuatorPort, EventSink, SensorPort, TimePort};
use seatheat::state::{CHANNEL_COUNT, ChannelId, HeaterState};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Heater(ChannelId, HeaterState),
    Fault(ChannelId, bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    readings: [Cell<i16>; CHANNEL_COUNT],
    now_ms: Cell<u64>,
    pub calls: RefCell<Vec<ActuatorCall>>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            readings: core::array::from_fn(|_| Cell::new(20)),
            now_ms: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn set_reading(&self, channel: ChannelId, celsius: i16) {
        self.readings[channel.index()].set(celsius);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn calls_for(&self, channel: ChannelId) -> Vec<ActuatorCall> {
        self.calls
            .borrow()
            .iter()
            .copied()
            .filter(|c| match c {
                ActuatorCall::Heater(ch, _) | ActuatorCall::Fault(ch, _) => *ch == channel,
            })
            .collect()
    }

    /// Every fault-indicator write for `channel`, in order.
    pub fn fault_writes(&self, channel: ChannelId) -> Vec<bool> {
        self.calls_for(channel)
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::Fault(_, on) => Some(on),
                ActuatorCall::Heater(..) => None,
            })
            .collect()
    }

    /// Last heater state written for `channel`.
    pub fn heater_output(&self, channel: ChannelId) -> Option<HeaterState> {
        self.calls_for(channel).into_iter().rev().find_map(|c| match c {
            ActuatorCall::Heater(_, s) => Some(s),
            ActuatorCall::Fault(..) => None,
        })
    }

    /// Last fault-indicator level for `channel` (false if never written).
    pub fn fault_output(&self, channel: ChannelId) -> bool {
        self.fault_writes(channel).last().copied().unwrap_or(false)
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_raw_temperature(&self, channel: ChannelId) -> i16 {
        self.readings[channel.index()].get()
    }
}

impl ActuatorPort for MockHardware {
    fn set_heater_indicator(&self, channel: ChannelId, state: HeaterState) {
        self.calls
            .borrow_mut()
            .push(ActuatorCall::Heater(channel, state));
    }

    fn set_fault_indicator(&self, channel: ChannelId, on: bool) {
        self.calls.borrow_mut().push(ActuatorCall::Fault(channel, on));
    }
}

impl TimePort for MockHardware {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<AppEvent>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
