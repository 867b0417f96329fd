//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade. The human-readable line goes out at `info`;
//! the full JSON payload follows at `debug`.

use log::{debug, info, log_enabled, warn, Level};

use crate::app::events::{AppEvent, StatusReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn log_status(report: &StatusReport) {
    for s in &report.channels {
        info!(
            "STATUS | {} | level={:?} desired={}\u{00b0}C current={}\u{00b0}C | heater={:?}{}",
            s.channel,
            s.level,
            s.desired_c,
            s.current_c,
            s.heater,
            if s.fault_active { " | FAULT" } else { "" },
        );
    }
    if report.faults_logged > 0 {
        info!(
            "STATUS | diagnostics: {} live / {} logged",
            report.history.len(),
            report.faults_logged
        );
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Started { channels } => {
                info!("START | channels={}", channels);
            }
            AppEvent::Status(report) => log_status(report),
            AppEvent::Load(load) => {
                info!(
                    "LOAD | cpu={}% | uptime={}ms | busy_us={:?} shared={}",
                    load.cpu_load_percent, load.uptime_ms, load.channel_busy_us, load.shared_busy_us
                );
            }
        }

        if log_enabled!(Level::Debug) {
            match serde_json::to_string(event) {
                Ok(json) => debug!("EVENT | {}", json),
                Err(e) => warn!("EVENT | serialization failed: {}", e),
            }
        }
    }
}
