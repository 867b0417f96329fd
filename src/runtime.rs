//! Task execution-time accounting and CPU load.
//!
//! Every task future is wrapped in [`instrumented`], which times each poll
//! and charges the elapsed time to the task's [`TaskSlot`]. Load is total
//! busy time over uptime, the same measure a switch-in/switch-out hook
//! would produce on an RTOS.

use core::future::{Future, poll_fn};
use core::pin::pin;
use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::state::{CHANNEL_COUNT, ChannelId};

/// Which bucket a task's busy time is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSlot {
    /// A per-channel task (selector, sampler, logger, controller).
    Channel(ChannelId),
    /// Reporters and anything else not tied to one seat.
    Shared,
}

/// Point-in-time load figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub uptime_ms: u64,
    pub cpu_load_percent: u8,
    pub channel_busy_us: [u64; CHANNEL_COUNT],
    pub shared_busy_us: u64,
}

pub struct RuntimeStats {
    started: Instant,
    channel_busy_us: [AtomicU64; CHANNEL_COUNT],
    shared_busy_us: AtomicU64,
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            channel_busy_us: [const { AtomicU64::new(0) }; CHANNEL_COUNT],
            shared_busy_us: AtomicU64::new(0),
        }
    }

    fn counter(&self, slot: TaskSlot) -> &AtomicU64 {
        match slot {
            TaskSlot::Channel(ch) => &self.channel_busy_us[ch.index()],
            TaskSlot::Shared => &self.shared_busy_us,
        }
    }

    pub fn charge_us(&self, slot: TaskSlot, micros: u64) {
        self.counter(slot).fetch_add(micros, Ordering::Relaxed);
    }

    pub fn busy_us(&self, slot: TaskSlot) -> u64 {
        self.counter(slot).load(Ordering::Relaxed)
    }

    pub fn total_busy_us(&self) -> u64 {
        ChannelId::ALL
            .iter()
            .map(|&ch| self.busy_us(TaskSlot::Channel(ch)))
            .fold(self.busy_us(TaskSlot::Shared), u64::saturating_add)
    }

    pub fn uptime_us(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Busy time over uptime, 0..=100.
    pub fn cpu_load_percent(&self) -> u8 {
        load_percent(self.total_busy_us(), self.uptime_us())
    }

    pub fn report(&self) -> LoadReport {
        LoadReport {
            uptime_ms: self.uptime_us() / 1000,
            cpu_load_percent: self.cpu_load_percent(),
            channel_busy_us: core::array::from_fn(|i| {
                self.channel_busy_us[i].load(Ordering::Relaxed)
            }),
            shared_busy_us: self.busy_us(TaskSlot::Shared),
        }
    }
}

fn load_percent(busy_us: u64, uptime_us: u64) -> u8 {
    if uptime_us == 0 {
        return 0;
    }
    let pct = u128::from(busy_us) * 100 / u128::from(uptime_us);
    pct.min(100) as u8
}

/// Drive `fut`, charging the time spent inside each poll to `slot`.
pub async fn instrumented<F: Future>(stats: &RuntimeStats, slot: TaskSlot, fut: F) -> F::Output {
    let mut fut = pin!(fut);
    poll_fn(|cx| {
        let start = Instant::now();
        let out = fut.as_mut().poll(cx);
        let spent = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        stats.charge_us(slot, spent);
        out
    })
    .await
}
