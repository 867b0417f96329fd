//! Outbound application events.
//!
//! The reporters emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them: log to serial, draw on a display, etc.

use serde::Serialize;

use crate::diagnostics::{FailureRecord, HISTORY_CAPACITY};
use crate::runtime::LoadReport;
use crate::state::{CHANNEL_COUNT, ChannelSnapshot};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Serialize)]
pub enum AppEvent {
    /// The service spawned its tasks.
    Started { channels: u8 },

    /// Channel state changed since the last report.
    Status(StatusReport),

    /// Periodic CPU load figures.
    Load(LoadReport),
}

/// Every channel plus the diagnostic history, read at one moment.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub channels: [ChannelSnapshot; CHANNEL_COUNT],
    pub history: heapless::Vec<FailureRecord, HISTORY_CAPACITY>,
    /// Records ever logged, evicted ones included.
    pub faults_logged: u32,
}
