//! Delay-until periodic timer.
//!
//! Deadlines advance by a fixed period from the previous deadline, not from
//! when the task woke, so per-cycle work does not accumulate as drift. If a
//! task falls more than one period behind, missed deadlines are skipped
//! rather than fired back to back.

use std::time::{Duration, Instant};

pub struct Periodic {
    period: Duration,
    next: Instant,
}

impl Periodic {
    /// First deadline is one period from now.
    pub fn new(period_ms: u32) -> Self {
        let period = Duration::from_millis(u64::from(period_ms));
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    /// Sleep until the next deadline, then schedule the one after.
    pub async fn tick(&mut self) {
        let now = Instant::now();
        if self.next > now {
            async_io_mini::Timer::after(self.next - now).await;
        }
        self.next = advance(self.next, self.period, Instant::now());
    }
}

/// Next deadline after `deadline`, skipping any already in the past.
fn advance(deadline: Instant, period: Duration, now: Instant) -> Instant {
    let mut next = deadline + period;
    if next <= now {
        let behind = now.duration_since(next).as_nanos();
        let skipped = behind / period.as_nanos().max(1) + 1;
        next += period * u32::try_from(skipped).unwrap_or(u32::MAX);
    }
    next
}
