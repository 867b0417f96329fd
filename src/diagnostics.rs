//! Fault diagnostics: failure records, the shared history ring, and the
//! per-channel fault logger.
//!
//! ```text
//!  SensorSampler ──record──▶ FaultLink.queue (depth 3) ──▶ FaultLogger ──▶ DiagnosticHistory
//!                └──wake───▶ FaultLink.wake   ──────────▶      │              (K = 5, shared)
//!                                                             ├─▶ heater forced Off
//!                                                             └─▶ fault indicator on
//! ```
//!
//! The history keeps the newest [`HISTORY_CAPACITY`] records and evicts the
//! oldest on overflow. It is advisory: eviction raises nothing.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::HistoryBuffer;
use log::{info, warn};
use serde::Serialize;

use crate::app::ports::ActuatorPort;
use crate::state::{ChannelId, ChannelStore, HeaterState, HeatingLevel};

/// Records retained by the shared history.
pub const HISTORY_CAPACITY: usize = 5;

/// Depth of each channel's sampler → logger handoff queue.
pub const HANDOFF_DEPTH: usize = 3;

// ── Records ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Reading above the valid range.
    OverRange,
    /// Reading below the valid range.
    UnderRange,
}

impl FailureKind {
    /// Diagnostic code as stored in dumps.
    pub const fn code(self) -> u8 {
        match self {
            Self::OverRange => 0x44,
            Self::UnderRange => 0x55,
        }
    }
}

/// One sensor fault, captured at the rising edge. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    timestamp_ms: u64,
    kind: FailureKind,
    channel: ChannelId,
    heating_level: HeatingLevel,
}

impl FailureRecord {
    pub fn new(
        timestamp_ms: u64,
        kind: FailureKind,
        channel: ChannelId,
        heating_level: HeatingLevel,
    ) -> Self {
        Self {
            timestamp_ms,
            kind,
            channel,
            heating_level,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn heating_level(&self) -> HeatingLevel {
        self.heating_level
    }
}

// ── Shared history ────────────────────────────────────────────

struct HistoryRing {
    records: HistoryBuffer<FailureRecord, HISTORY_CAPACITY>,
    /// Records ever appended, including evicted ones.
    total: u32,
}

/// Bounded, overwrite-oldest history shared by every channel's logger.
pub struct DiagnosticHistory {
    ring: Mutex<CriticalSectionRawMutex, HistoryRing>,
}

impl Default for DiagnosticHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticHistory {
    pub fn new() -> Self {
        Self {
            ring: Mutex::new(HistoryRing {
                records: HistoryBuffer::new(),
                total: 0,
            }),
        }
    }

    /// Append a record, evicting the oldest if the ring is full.
    pub(crate) async fn append(&self, record: FailureRecord) {
        let mut ring = self.ring.lock().await;
        if ring.records.len() == HISTORY_CAPACITY {
            info!("DIAG | history full, evicting oldest record");
        }
        ring.records.write(record);
        ring.total = ring.total.saturating_add(1);
    }

    /// Live records, oldest first.
    pub async fn records(&self) -> heapless::Vec<FailureRecord, HISTORY_CAPACITY> {
        let ring = self.ring.lock().await;
        ring.records.oldest_ordered().copied().collect()
    }

    /// Records appended since start, evicted ones included.
    pub async fn total_logged(&self) -> u32 {
        self.ring.lock().await.total
    }

}

// ── Sampler → logger link ─────────────────────────────────────

/// Per-channel handoff queue plus the logger's wake signal.
pub struct FaultLink {
    queue: Channel<CriticalSectionRawMutex, FailureRecord, HANDOFF_DEPTH>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for FaultLink {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultLink {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            wake: Signal::new(),
        }
    }

    /// Hand a record to the logger. Waits while the queue is full.
    pub(crate) async fn report(&self, record: FailureRecord) {
        self.queue.send(record).await;
        self.wake.signal(());
    }

    /// Records waiting for the logger.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether the logger has an unconsumed wake.
    pub fn wake_pending(&self) -> bool {
        self.wake.signaled()
    }
}

// ── Logger task ───────────────────────────────────────────────

/// Per-channel task that reacts to raised faults.
pub struct FaultLogger<'a, A> {
    channel: ChannelId,
    store: &'a ChannelStore,
    link: &'a FaultLink,
    history: &'a DiagnosticHistory,
    actuator: &'a A,
}

impl<'a, A: ActuatorPort> FaultLogger<'a, A> {
    pub fn new(
        channel: ChannelId,
        store: &'a ChannelStore,
        link: &'a FaultLink,
        history: &'a DiagnosticHistory,
        actuator: &'a A,
    ) -> Self {
        Self {
            channel,
            store,
            link,
            history,
            actuator,
        }
    }

    /// Wait for one wake, then handle exactly one record.
    pub async fn step(&mut self) -> FailureRecord {
        self.link.wake.wait().await;

        // Heater off before the fault becomes visible anywhere.
        self.store.force_heater_off(self.channel).await;
        self.actuator
            .set_heater_indicator(self.channel, HeaterState::Off);

        let record = self.link.queue.receive().await;
        self.history.append(record).await;
        warn!(
            "FAULT | {} {:?} (code 0x{:02X}) at {} ms, level {:?}",
            self.channel,
            record.kind(),
            record.kind().code(),
            record.timestamp_ms(),
            record.heating_level()
        );

        // A fault that already recovered must not leave the indicator lit.
        if self.store.fault_active(self.channel).await {
            self.actuator.set_fault_indicator(self.channel, true);
        }

        // Wakes coalesce; make sure nothing is stranded in the queue.
        if !self.link.queue.is_empty() {
            self.link.wake.signal(());
        }

        record
    }

    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }
}
