//! First-order thermal model of the seats, for host simulation.
//!
//! Each seat warms in proportion to the heater code on its green/blue
//! indicator pins and loses heat toward ambient. The result is written to
//! the LM35 injection cell, so the control core sees it as a sensor
//! reading. An override pins the reading to a fixed value, which is how
//! the simulation injects sensor faults.

use crate::drivers::sim_pin::SimPin;
use crate::sensors::temperature::sim_set_celsius;
use crate::state::{CHANNEL_COUNT, ChannelId};

/// °C per second gained per heater code step.
const HEAT_RATE_C_PER_S: f32 = 0.6;
/// Fraction of the difference to ambient lost per second.
const COOLING_PER_S: f32 = 0.05;

struct SeatModel {
    temp_c: f32,
    green: SimPin,
    blue: SimPin,
    override_c: Option<i16>,
}

pub struct ThermalPlant {
    ambient_c: f32,
    seats: [SeatModel; CHANNEL_COUNT],
}

impl ThermalPlant {
    /// `probes[i]` are the (green, blue) pins of seat `i`.
    pub fn new(ambient_c: f32, probes: [(SimPin, SimPin); CHANNEL_COUNT]) -> Self {
        let seats = probes.map(|(green, blue)| SeatModel {
            temp_c: ambient_c,
            green,
            blue,
            override_c: None,
        });
        let plant = Self { ambient_c, seats };
        plant.publish();
        plant
    }

    /// Pin a seat's reading to `celsius`, or release it with `None`.
    pub fn set_override(&mut self, channel: ChannelId, celsius: Option<i16>) {
        self.seats[channel.index()].override_c = celsius;
        self.publish();
    }

    pub fn temperature(&self, channel: ChannelId) -> f32 {
        self.seats[channel.index()].temp_c
    }

    /// Advance the model by `dt_s` seconds and publish the readings.
    pub fn step(&mut self, dt_s: f32) {
        for seat in &mut self.seats {
            let code = u8::from(seat.green.is_high()) | (u8::from(seat.blue.is_high()) << 1);
            let heating = f32::from(code) * HEAT_RATE_C_PER_S;
            let cooling = (seat.temp_c - self.ambient_c) * COOLING_PER_S;
            seat.temp_c += (heating - cooling) * dt_s;
        }
        self.publish();
    }

    fn publish(&self) {
        for (ch, seat) in ChannelId::ALL.into_iter().zip(&self.seats) {
            let shown = seat.override_c.unwrap_or(seat.temp_c.round() as i16);
            sim_set_celsius(ch, shown);
        }
    }
}
