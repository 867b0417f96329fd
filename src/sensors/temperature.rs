//! LM35 seat temperature sensor.
//!
//! Linear output of 10 mV/°C, read through a 12-bit ADC against a 3.3 V
//! reference, so one count is roughly 0.08 °C and full scale is 330 °C.
//!
//! ## Host injection
//!
//! There is no ADC on the host. Each channel reads from a static
//! `AtomicU16` that tests and the simulated thermal plant write through
//! [`sim_set_adc`] / [`sim_set_celsius`].

use core::sync::atomic::{AtomicU16, Ordering};

use crate::state::{CHANNEL_COUNT, ChannelId};

const ADC_MAX: u32 = 4095;
const V_REF_MV: u32 = 3300;
const MV_PER_C: u32 = 10;

/// Power-on reading: about 20 °C.
const SIM_BOOT_ADC: u16 = 248;

static SIM_TEMP_ADC: [AtomicU16; CHANNEL_COUNT] =
    [const { AtomicU16::new(SIM_BOOT_ADC) }; CHANNEL_COUNT];

pub fn sim_set_adc(channel: ChannelId, raw: u16) {
    SIM_TEMP_ADC[channel.index()].store(raw.min(ADC_MAX as u16), Ordering::Relaxed);
}

/// Inject a temperature. Values below 0 °C clamp to 0, the LM35 floor in
/// this wiring.
pub fn sim_set_celsius(channel: ChannelId, celsius: i16) {
    sim_set_adc(channel, celsius_to_adc(celsius));
}

/// Counts → whole °C, rounding down.
pub fn adc_to_celsius(raw: u16) -> i16 {
    let millivolts = u32::from(raw) * V_REF_MV / ADC_MAX;
    (millivolts / MV_PER_C) as i16
}

/// Whole °C → the smallest count that reads back as that temperature.
pub fn celsius_to_adc(celsius: i16) -> u16 {
    let c = u32::from(celsius.max(0).unsigned_abs());
    let counts = (c * MV_PER_C * ADC_MAX).div_ceil(V_REF_MV);
    counts.min(ADC_MAX) as u16
}

#[derive(Debug, Clone, Copy)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: i16,
}

pub struct TemperatureSensor {
    channel: ChannelId,
}

impl TemperatureSensor {
    pub fn new(channel: ChannelId) -> Self {
        Self { channel }
    }

    pub fn read(&self) -> TemperatureReading {
        let raw = self.read_adc();
        TemperatureReading {
            raw,
            celsius: adc_to_celsius(raw),
        }
    }

    fn read_adc(&self) -> u16 {
        SIM_TEMP_ADC[self.channel.index()].load(Ordering::Relaxed)
    }
}
