//! Hardware adapter: bridges seat peripherals to the domain port traits.
//!
//! Each seat has three indicator outputs and one LM35 sensor:
//!
//! | Output | Meaning                                  |
//! |--------|------------------------------------------|
//! | green  | heater code bit 0 (Low, High)            |
//! | blue   | heater code bit 1 (Medium, High)         |
//! | red    | sensor fault                             |
//!
//! Pins are generic over [`embedded_hal::digital::OutputPin`], so the same
//! adapter drives real GPIO or the in-memory [`SimPin`](crate::drivers::sim_pin::SimPin).
//! A failing pin write is logged and otherwise ignored: the port contract
//! has no error return.

use core::cell::RefCell;

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, trace, warn};

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::sensors::temperature::TemperatureSensor;
use crate::state::{CHANNEL_COUNT, ChannelId, HeaterState};

/// The three indicator outputs of one seat.
pub struct SeatIndicators<P> {
    pub green: P,
    pub blue: P,
    pub red: P,
}

/// Concrete adapter that combines all seat hardware behind port traits.
pub struct HardwareAdapter<P> {
    indicators: [RefCell<SeatIndicators<P>>; CHANNEL_COUNT],
    sensors: [TemperatureSensor; CHANNEL_COUNT],
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(indicators: [SeatIndicators<P>; CHANNEL_COUNT]) -> Self {
        Self {
            indicators: indicators.map(RefCell::new),
            sensors: ChannelId::ALL.map(TemperatureSensor::new),
        }
    }

    /// Run `f` on one seat's pins. Returns `None` if the pins are already
    /// borrowed, which only happens on re-entrant use.
    fn with_pins<R>(
        &self,
        channel: ChannelId,
        f: impl FnOnce(&mut SeatIndicators<P>) -> R,
    ) -> Option<R> {
        match self.indicators[channel.index()].try_borrow_mut() {
            Ok(mut pins) => Some(f(&mut pins)),
            Err(_) => {
                warn!("HW: {} indicator pins busy, write dropped", channel);
                None
            }
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool, channel: ChannelId, name: &str) {
    if let Err(e) = pin.set_state(PinState::from(on)) {
        warn!("HW: {} {} pin write failed: {:?}", channel, name, e);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P> SensorPort for HardwareAdapter<P> {
    fn read_raw_temperature(&self, channel: ChannelId) -> i16 {
        let reading = self.sensors[channel.index()].read();
        trace!("HW: {} adc {} -> {} C", channel, reading.raw, reading.celsius);
        reading.celsius
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set_heater_indicator(&self, channel: ChannelId, state: HeaterState) {
        let code = state.code();
        debug!("HW: {} heater code 0b{:02b}", channel, code);
        self.with_pins(channel, |pins| {
            drive(&mut pins.green, code & 0b01 != 0, channel, "green");
            drive(&mut pins.blue, code & 0b10 != 0, channel, "blue");
        });
    }

    fn set_fault_indicator(&self, channel: ChannelId, on: bool) {
        debug!("HW: {} fault indicator {}", channel, if on { "on" } else { "off" });
        self.with_pins(channel, |pins| drive(&mut pins.red, on, channel, "red"));
    }
}
