//! Application service: the hexagonal core.
//!
//! [`SeatHeaterService`] owns every piece of shared state: the channel
//! store, the diagnostic history, one fault link per channel, and the
//! runtime stats. It builds the per-channel tasks and hands them to an
//! executor. All I/O flows through port traits supplied at spawn time, so
//! the whole pipeline runs against mock adapters in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │      SeatHeaterService        │
//! ActuatorPort ◀──│ selector · sampler · logger   │
//!    TimePort ──▶ │ controller · reporters        │
//!                 └──────────────────────────────┘
//! ```
//!
//! Per channel: level selector, sensor sampler, fault logger, heater
//! controller. Shared: status reporter, load reporter.

use edge_executor::LocalExecutor;
use log::info;

use crate::config::SystemConfig;
use crate::control::heater::HeaterController;
use crate::diagnostics::{DiagnosticHistory, FailureRecord, FaultLink, FaultLogger, HISTORY_CAPACITY};
use crate::error::Result;
use crate::reporter::{LoadReporter, StatusReporter};
use crate::runtime::{RuntimeStats, TaskSlot, instrumented};
use crate::selector::{self, ControlId, LevelSelector};
use crate::sensors::SensorSampler;
use crate::state::{CHANNEL_COUNT, ChannelId, ChannelStore};

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, TimePort};

/// Tasks spawned by [`SeatHeaterService::spawn_tasks`].
pub const TASK_COUNT: usize = 4 * CHANNEL_COUNT + 2;

pub struct SeatHeaterService {
    config: SystemConfig,
    store: ChannelStore,
    history: DiagnosticHistory,
    links: [FaultLink; CHANNEL_COUNT],
    runtime: RuntimeStats,
}

impl SeatHeaterService {
    /// Validate `config` and build the shared state. Every channel starts
    /// Off with no fault.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: ChannelStore::new(),
            history: DiagnosticHistory::new(),
            links: core::array::from_fn(|_| FaultLink::new()),
            runtime: RuntimeStats::new(),
        })
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    pub fn history(&self) -> &DiagnosticHistory {
        &self.history
    }

    pub fn link(&self, channel: ChannelId) -> &FaultLink {
        &self.links[channel.index()]
    }

    pub fn runtime(&self) -> &RuntimeStats {
        &self.runtime
    }

    /// Diagnostic history, oldest first.
    pub async fn fault_history(&self) -> heapless::Vec<FailureRecord, HISTORY_CAPACITY> {
        self.history.records().await
    }

    // ── Interrupt entry ───────────────────────────────────────

    /// Forward a control edge. Non-blocking; safe from interrupt context.
    pub fn on_control_edge(&self, control: ControlId) {
        selector::on_control_edge(&self.store, control);
    }

    // ── Task builders ─────────────────────────────────────────

    pub fn level_selector(&self, channel: ChannelId) -> LevelSelector<'_> {
        LevelSelector::new(&self.store, channel)
    }

    pub fn sensor_sampler<'a, S, A, T>(
        &'a self,
        channel: ChannelId,
        sensor: &'a S,
        actuator: &'a A,
        clock: &'a T,
    ) -> SensorSampler<'a, S, A, T>
    where
        S: SensorPort,
        A: ActuatorPort,
        T: TimePort,
    {
        SensorSampler::new(
            channel,
            &self.config,
            &self.store,
            self.link(channel),
            sensor,
            actuator,
            clock,
        )
    }

    pub fn fault_logger<'a, A: ActuatorPort>(
        &'a self,
        channel: ChannelId,
        actuator: &'a A,
    ) -> FaultLogger<'a, A> {
        FaultLogger::new(
            channel,
            &self.store,
            self.link(channel),
            &self.history,
            actuator,
        )
    }

    pub fn heater_controller<'a, A: ActuatorPort>(
        &'a self,
        channel: ChannelId,
        actuator: &'a A,
    ) -> HeaterController<'a, A> {
        HeaterController::new(channel, &self.config, &self.store, actuator)
    }

    pub fn status_reporter<'a, E: EventSink>(&'a self, sink: &'a E) -> StatusReporter<'a, E> {
        StatusReporter::new(&self.store, &self.history, sink, self.config.status_period_ms)
    }

    pub fn load_reporter<'a, E: EventSink>(&'a self, sink: &'a E) -> LoadReporter<'a, E> {
        LoadReporter::new(&self.runtime, sink, self.config.load_report_period_ms)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Spawn every task onto `executor`. The executor needs room for at
    /// least [`TASK_COUNT`] tasks.
    pub fn spawn_tasks<'a, const C: usize, H, T, E>(
        &'a self,
        executor: &LocalExecutor<'a, C>,
        hw: &'a H,
        clock: &'a T,
        sink: &'a E,
    ) where
        H: SensorPort + ActuatorPort,
        T: TimePort,
        E: EventSink,
    {
        let stats = &self.runtime;
        for ch in ChannelId::ALL {
            let slot = TaskSlot::Channel(ch);
            executor
                .spawn(instrumented(stats, slot, self.level_selector(ch).run()))
                .detach();
            executor
                .spawn(instrumented(
                    stats,
                    slot,
                    self.sensor_sampler(ch, hw, hw, clock).run(),
                ))
                .detach();
            executor
                .spawn(instrumented(stats, slot, self.fault_logger(ch, hw).run()))
                .detach();
            executor
                .spawn(instrumented(
                    stats,
                    slot,
                    self.heater_controller(ch, hw).run(),
                ))
                .detach();
        }
        executor
            .spawn(instrumented(
                stats,
                TaskSlot::Shared,
                self.status_reporter(sink).run(),
            ))
            .detach();
        executor
            .spawn(instrumented(
                stats,
                TaskSlot::Shared,
                self.load_reporter(sink).run(),
            ))
            .detach();

        sink.emit(&AppEvent::Started {
            channels: CHANNEL_COUNT as u8,
        });
        info!(
            "SeatHeaterService started ({} channels, {} tasks)",
            CHANNEL_COUNT, TASK_COUNT
        );
    }
}
