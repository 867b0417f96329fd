//! Level selector.
//!
//! ```text
//!  button edge ──▶ on_control_edge()          (interrupt context)
//!                    │  atomic level += 1 mod 4
//!                    │  signal(channel)
//!                    ▼
//!                 LevelSelector::step()        (task context)
//!                    commit level + desired °C under the setting domain
//! ```
//!
//! Signals coalesce: several edges before the selector runs produce one
//! wake, and the selector commits whatever the counter says now.

use log::info;
use serde::Serialize;

use crate::error::Error;
use crate::state::{ChannelId, ChannelStore, LevelSetting};

/// Physical controls. Two of them drive the same seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ControlId {
    /// Button on the driver seat.
    DriverSeat = 0,
    /// Button on the steering wheel, also driver.
    DriverWheel = 1,
    /// Button on the passenger seat.
    PassengerSeat = 2,
}

impl ControlId {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::DriverSeat, Self::DriverWheel, Self::PassengerSeat];

    /// The channel this control adjusts.
    pub const fn channel(self) -> ChannelId {
        match self {
            Self::DriverSeat | Self::DriverWheel => ChannelId::DRIVER,
            Self::PassengerSeat => ChannelId::PASSENGER,
        }
    }
}

impl TryFrom<u8> for ControlId {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::DriverSeat),
            1 => Ok(Self::DriverWheel),
            2 => Ok(Self::PassengerSeat),
            other => Err(Error::InvalidControl(other)),
        }
    }
}

/// Interrupt-context entry point: bump the level and wake the selector.
///
/// Lock-free and bounded; never waits on anything.
pub fn on_control_edge(store: &ChannelStore, control: ControlId) {
    let channel = control.channel();
    store.bump_level_from_isr(channel);
    store.level_changed(channel).signal(control);
}

/// Per-channel task that turns level signals into committed settings.
pub struct LevelSelector<'a> {
    store: &'a ChannelStore,
    channel: ChannelId,
}

impl<'a> LevelSelector<'a> {
    pub fn new(store: &'a ChannelStore, channel: ChannelId) -> Self {
        Self { store, channel }
    }

    /// Wait for one (possibly coalesced) level signal and commit it.
    pub async fn step(&mut self) -> LevelSetting {
        let control = self.store.level_changed(self.channel).wait().await;
        let level = self.store.pending_level(self.channel);
        let setting = self.store.commit_level(self.channel, level).await;
        info!(
            "LEVEL | {} -> {:?} ({} C) via {:?}",
            self.channel,
            setting.level(),
            setting.desired_c(),
            control
        );
        setting
    }

    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }
}
