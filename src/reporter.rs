//! Status and load reporters.
//!
//! Read-only consumers of the store, the history and the runtime stats.
//! Neither mutates core state.

use crate::app::events::{AppEvent, StatusReport};
use crate::app::ports::EventSink;
use crate::diagnostics::DiagnosticHistory;
use crate::drivers::periodic::Periodic;
use crate::runtime::{LoadReport, RuntimeStats};
use crate::state::{CHANNEL_COUNT, ChannelStore, HeaterState, HeatingLevel};

/// The fields whose change triggers a status report.
type Watched = (HeatingLevel, i16, HeaterState);

pub struct StatusReporter<'a, E> {
    store: &'a ChannelStore,
    history: &'a DiagnosticHistory,
    sink: &'a E,
    period_ms: u32,
    last: Option<[Watched; CHANNEL_COUNT]>,
}

impl<'a, E: EventSink> StatusReporter<'a, E> {
    pub fn new(
        store: &'a ChannelStore,
        history: &'a DiagnosticHistory,
        sink: &'a E,
        period_ms: u32,
    ) -> Self {
        Self {
            store,
            history,
            sink,
            period_ms,
            last: None,
        }
    }

    /// Emit a report if any channel's level, temperature, or heater state
    /// changed since the last one. The first call always emits.
    pub async fn step(&mut self) -> Option<StatusReport> {
        let channels = self.store.snapshot_all().await;
        let watched = channels.map(|s| (s.level, s.current_c, s.heater));

        if self.last == Some(watched) {
            return None;
        }
        self.last = Some(watched);

        let report = StatusReport {
            channels,
            history: self.history.records().await,
            faults_logged: self.history.total_logged().await,
        };
        self.sink.emit(&AppEvent::Status(report.clone()));
        Some(report)
    }

    pub async fn run(mut self) {
        let mut periodic = Periodic::new(self.period_ms);
        loop {
            self.step().await;
            periodic.tick().await;
        }
    }
}

pub struct LoadReporter<'a, E> {
    stats: &'a RuntimeStats,
    sink: &'a E,
    period_ms: u32,
}

impl<'a, E: EventSink> LoadReporter<'a, E> {
    pub fn new(stats: &'a RuntimeStats, sink: &'a E, period_ms: u32) -> Self {
        Self {
            stats,
            sink,
            period_ms,
        }
    }

    pub fn step(&mut self) -> LoadReport {
        let report = self.stats.report();
        self.sink.emit(&AppEvent::Load(report));
        report
    }

    pub async fn run(mut self) {
        let mut periodic = Periodic::new(self.period_ms);
        loop {
            periodic.tick().await;
            self.step();
        }
    }
}
