//! Sensor subsystem: the LM35 driver and the per-channel [`SensorSampler`].
//!
//! Each sampler cycle:
//!
//! 1. read the raw temperature through [`SensorPort`],
//! 2. store it under the channel's temperature domain,
//! 3. feed it to the channel's [`FaultDetector`] and act on the edge:
//!    - raised: latch `fault_active`, then hand a [`FailureRecord`] to the
//!      logger (waits if the handoff queue is full)
//!    - cleared: drop `fault_active` and clear the fault indicator directly

pub mod temperature;

use log::debug;

use crate::app::ports::{ActuatorPort, SensorPort, TimePort};
use crate::config::SystemConfig;
use crate::diagnostics::{FailureRecord, FaultLink};
use crate::drivers::periodic::Periodic;
use crate::safety::{FaultDetector, FaultTransition};
use crate::state::{ChannelId, ChannelStore};

pub struct SensorSampler<'a, S, A, T> {
    channel: ChannelId,
    store: &'a ChannelStore,
    link: &'a FaultLink,
    detector: FaultDetector,
    sensor: &'a S,
    actuator: &'a A,
    clock: &'a T,
    period_ms: u32,
}

impl<'a, S, A, T> SensorSampler<'a, S, A, T>
where
    S: SensorPort,
    A: ActuatorPort,
    T: TimePort,
{
    pub fn new(
        channel: ChannelId,
        config: &SystemConfig,
        store: &'a ChannelStore,
        link: &'a FaultLink,
        sensor: &'a S,
        actuator: &'a A,
        clock: &'a T,
    ) -> Self {
        Self {
            channel,
            store,
            link,
            detector: FaultDetector::new(config),
            sensor,
            actuator,
            clock,
            period_ms: config.sensor_period_ms,
        }
    }

    /// One sampling cycle. Returns the reading and the fault edge it caused.
    pub async fn step(&mut self) -> (i16, FaultTransition) {
        let celsius = self.sensor.read_raw_temperature(self.channel);
        self.store.store_temperature(self.channel, celsius).await;

        let transition = self.detector.evaluate(celsius);
        match transition {
            FaultTransition::Raised(kind) => {
                let level = self.store.level_setting(self.channel).await.level();
                let record = FailureRecord::new(self.clock.now_ms(), kind, self.channel, level);
                // Latched first so the controller holds Off even while the
                // push below is waiting for queue space.
                self.store.set_fault_active(self.channel, true).await;
                self.link.report(record).await;
            }
            FaultTransition::Cleared => {
                self.store.set_fault_active(self.channel, false).await;
                self.actuator.set_fault_indicator(self.channel, false);
            }
            FaultTransition::Unchanged => {}
        }

        debug!("SENSE | {} {} C", self.channel, celsius);
        (celsius, transition)
    }

    pub async fn run(mut self) {
        let mut periodic = Periodic::new(self.period_ms);
        loop {
            self.step().await;
            periodic.tick().await;
        }
    }
}
