//! Channel state store.
//!
//! One [`ChannelCell`] per seat, indexed by [`ChannelId`]. Each field group
//! sits behind its own async mutex (its *exclusion domain*) and has exactly
//! one writer role:
//!
//! | Domain        | Field(s)                    | Writer              |
//! |---------------|-----------------------------|---------------------|
//! | setting       | heating level + desired °C  | level selector      |
//! | temperature   | current °C                  | sensor sampler      |
//! | fault         | fault active flag           | sensor sampler      |
//! | heater        | heater state                | heater controller (logger may force Off) |
//!
//! The interrupt layer never takes a domain. It bumps a lock-free level
//! counter and raises the channel's level signal; the selector commits the
//! new level and its desired temperature together under the setting domain.
//!
//! ## Lock order
//!
//! Any code holding more than one domain must take them in the order
//! `setting → temperature → fault → heater` and release in reverse.
//! [`ChannelStore::lock_all`] is the only place that does this.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::selector::ControlId;

/// Number of seats served by one store.
pub const CHANNEL_COUNT: usize = 2;

// ── Identifiers and value types ───────────────────────────────

/// Stable, bounds-checked seat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChannelId(u8);

impl ChannelId {
    pub const DRIVER: Self = Self(0);
    pub const PASSENGER: Self = Self(1);
    pub const ALL: [Self; CHANNEL_COUNT] = [Self::DRIVER, Self::PASSENGER];

    /// Validate a raw index. Out-of-range ids never reach the store.
    pub fn new(index: u8) -> Result<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Ok(Self(index))
        } else {
            Err(Error::InvalidChannel(index))
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "driver",
            _ => "passenger",
        }
    }

    /// Seat code carried in diagnostic dumps (0x66 driver, 0x77 passenger).
    pub const fn fault_code(self) -> u8 {
        0x66 + 0x11 * self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// User-selected intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum HeatingLevel {
    #[default]
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl HeatingLevel {
    pub const COUNT: u8 = 4;

    /// Decode a counter value; wraps modulo [`Self::COUNT`].
    pub const fn from_raw(raw: u8) -> Self {
        match raw % Self::COUNT {
            0 => Self::Off,
            1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }

    /// The level one control press away.
    pub const fn next(self) -> Self {
        Self::from_raw(self as u8 + 1)
    }

    /// Fixed level → desired temperature table (°C).
    pub const fn desired_temperature_c(self) -> i16 {
        match self {
            Self::Off => 0,
            Self::Low => 25,
            Self::Medium => 30,
            Self::High => 35,
        }
    }
}

/// Controller-derived actuator intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[repr(u8)]
pub enum HeaterState {
    #[default]
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl HeaterState {
    /// Two-bit intensity code: bit 0 = green, bit 1 = blue.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Heating level together with the desired temperature derived from it.
///
/// Only constructible from a level, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LevelSetting {
    level: HeatingLevel,
    desired_c: i16,
}

impl LevelSetting {
    pub const fn for_level(level: HeatingLevel) -> Self {
        Self {
            level,
            desired_c: level.desired_temperature_c(),
        }
    }

    pub const fn level(self) -> HeatingLevel {
        self.level
    }

    pub const fn desired_c(self) -> i16 {
        self.desired_c
    }
}

/// Read-only, consistent copy of one channel for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    pub channel: ChannelId,
    pub level: HeatingLevel,
    pub desired_c: i16,
    pub current_c: i16,
    pub fault_active: bool,
    pub heater: HeaterState,
}

// ── Per-channel cell ──────────────────────────────────────────

type Domain<T> = Mutex<CriticalSectionRawMutex, T>;

struct ChannelCell {
    /// Interrupt-side level counter (always < `HeatingLevel::COUNT`).
    level_counter: AtomicU8,
    /// Raised by the interrupt layer, consumed by the level selector.
    level_changed: Signal<CriticalSectionRawMutex, ControlId>,
    setting: Domain<LevelSetting>,
    temperature: Domain<i16>,
    fault: Domain<bool>,
    heater: Domain<HeaterState>,
}

impl ChannelCell {
    fn new() -> Self {
        Self {
            level_counter: AtomicU8::new(HeatingLevel::Off as u8),
            level_changed: Signal::new(),
            setting: Mutex::new(LevelSetting::default()),
            temperature: Mutex::new(0),
            fault: Mutex::new(false),
            heater: Mutex::new(HeaterState::Off),
        }
    }
}

/// All four domains of one channel, held together.
///
/// Fields are declared in release order (Rust drops in declaration order),
/// which is the reverse of the acquisition order in [`ChannelStore::lock_all`].
pub(crate) struct ChannelGuards<'a> {
    pub heater: MutexGuard<'a, CriticalSectionRawMutex, HeaterState>,
    pub fault: MutexGuard<'a, CriticalSectionRawMutex, bool>,
    pub temperature: MutexGuard<'a, CriticalSectionRawMutex, i16>,
    pub setting: MutexGuard<'a, CriticalSectionRawMutex, LevelSetting>,
}

// ── Store ─────────────────────────────────────────────────────

/// Arena of channel cells; the single source of truth for every task.
pub struct ChannelStore {
    cells: [ChannelCell; CHANNEL_COUNT],
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelStore {
    /// Every channel starts Off, 0 °C, no fault, heater Off.
    pub fn new() -> Self {
        Self {
            cells: core::array::from_fn(|_| ChannelCell::new()),
        }
    }

    fn cell(&self, channel: ChannelId) -> &ChannelCell {
        &self.cells[channel.index()]
    }

    // ── Interrupt side (lock-free) ────────────────────────────

    /// Advance the level counter by one, modulo 4. Returns the new level.
    /// Never blocks; safe from interrupt context.
    pub(crate) fn bump_level_from_isr(&self, channel: ChannelId) -> HeatingLevel {
        let previous = self
            .cell(channel)
            .level_counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Some(HeatingLevel::from_raw(raw).next() as u8)
            })
            .unwrap_or_else(|raw| raw);
        HeatingLevel::from_raw(previous).next()
    }

    /// Level most recently requested by the interrupt layer (may not be
    /// committed yet).
    pub fn pending_level(&self, channel: ChannelId) -> HeatingLevel {
        HeatingLevel::from_raw(self.cell(channel).level_counter.load(Ordering::Acquire))
    }

    pub(crate) fn level_changed(
        &self,
        channel: ChannelId,
    ) -> &Signal<CriticalSectionRawMutex, ControlId> {
        &self.cell(channel).level_changed
    }

    // ── Setting domain ────────────────────────────────────────

    pub async fn level_setting(&self, channel: ChannelId) -> LevelSetting {
        *self.cell(channel).setting.lock().await
    }

    /// Level selector only.
    pub(crate) async fn commit_level(
        &self,
        channel: ChannelId,
        level: HeatingLevel,
    ) -> LevelSetting {
        let setting = LevelSetting::for_level(level);
        *self.cell(channel).setting.lock().await = setting;
        setting
    }

    // ── Temperature domain ────────────────────────────────────

    pub async fn current_temperature(&self, channel: ChannelId) -> i16 {
        *self.cell(channel).temperature.lock().await
    }

    /// Sensor sampler only.
    pub(crate) async fn store_temperature(&self, channel: ChannelId, celsius: i16) {
        *self.cell(channel).temperature.lock().await = celsius;
    }

    // ── Fault domain ──────────────────────────────────────────

    pub async fn fault_active(&self, channel: ChannelId) -> bool {
        *self.cell(channel).fault.lock().await
    }

    /// Sensor sampler only.
    pub(crate) async fn set_fault_active(&self, channel: ChannelId, active: bool) {
        *self.cell(channel).fault.lock().await = active;
    }

    // ── Heater domain ─────────────────────────────────────────

    pub async fn heater_state(&self, channel: ChannelId) -> HeaterState {
        *self.cell(channel).heater.lock().await
    }

    /// Fault logger only.
    pub(crate) async fn force_heater_off(&self, channel: ChannelId) {
        *self.cell(channel).heater.lock().await = HeaterState::Off;
    }

    // ── Multi-domain access ───────────────────────────────────

    /// Take all four domains in the global order.
    pub(crate) async fn lock_all(&self, channel: ChannelId) -> ChannelGuards<'_> {
        let cell = self.cell(channel);
        let setting = cell.setting.lock().await;
        let temperature = cell.temperature.lock().await;
        let fault = cell.fault.lock().await;
        let heater = cell.heater.lock().await;
        ChannelGuards {
            heater,
            fault,
            temperature,
            setting,
        }
    }

    /// Consistent multi-field copy for telemetry readers.
    pub async fn snapshot(&self, channel: ChannelId) -> ChannelSnapshot {
        let guards = self.lock_all(channel).await;
        ChannelSnapshot {
            channel,
            level: guards.setting.level(),
            desired_c: guards.setting.desired_c(),
            current_c: *guards.temperature,
            fault_active: *guards.fault,
            heater: *guards.heater,
        }
    }

    /// Every channel, in id order. Each snapshot is consistent on its own;
    /// channels are taken one after another.
    pub async fn snapshot_all(&self) -> [ChannelSnapshot; CHANNEL_COUNT] {
        let mut out = [self.snapshot(ChannelId::DRIVER).await; CHANNEL_COUNT];
        for &ch in &ChannelId::ALL[1..] {
            out[ch.index()] = self.snapshot(ch).await;
        }
        out
    }
}
