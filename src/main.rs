//! SeatHeat host simulation: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  "interrupt" thread                                          │
//! │    ButtonBank (debounced edges) · ThermalPlant · fault script│
//! │  ─────────────────── lock-free / atomics ──────────────────  │
//! │  main thread: LocalExecutor                                  │
//! │    per seat: selector · sampler · logger · controller        │
//! │    shared:   status reporter · load reporter                 │
//! │  ─────────────────── Port Trait Boundary ─────────────────   │
//! │  HardwareAdapter<SimPin>  MonotonicClock  LogEventSink       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RUST_LOG` sets verbosity (default `info`), `SEATHEAT_CONFIG` points at
//! an optional JSON config, and `SEATHEAT_RUN_SECS` stops the simulation
//! after that many seconds (runs forever when unset).

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use edge_executor::LocalExecutor;
use log::{info, warn};

use seatheat::adapters::file_config::FileConfig;
use seatheat::adapters::hardware::{HardwareAdapter, SeatIndicators};
use seatheat::adapters::log_sink::LogEventSink;
use seatheat::adapters::time::MonotonicClock;
use seatheat::app::ports::ConfigPort;
use seatheat::app::service::{SeatHeaterService, TASK_COUNT};
use seatheat::config::SystemConfig;
use seatheat::drivers::button::ButtonBank;
use seatheat::drivers::sim_pin::SimPin;
use seatheat::drivers::sim_plant::ThermalPlant;
use seatheat::selector::ControlId;
use seatheat::state::{CHANNEL_COUNT, ChannelId};

const RUN_SECS_ENV: &str = "SEATHEAT_RUN_SECS";

const EXECUTOR_SLOTS: usize = 16;
const _: () = assert!(TASK_COUNT <= EXECUTOR_SLOTS);

/// Simulation step of the thermal plant and script thread.
const SIM_STEP_MS: u64 = 100;

const AMBIENT_C: f32 = 18.0;

/// One scripted stimulus, applied at `at_ms` after start.
#[derive(Debug, Clone, Copy)]
enum Stimulus {
    Press(ControlId),
    Inject(ChannelId, i16),
    Release(ChannelId),
}

const SCRIPT: &[(u64, Stimulus)] = &[
    (500, Stimulus::Press(ControlId::DriverSeat)),
    (700, Stimulus::Press(ControlId::DriverWheel)),
    (900, Stimulus::Press(ControlId::DriverSeat)),
    (1_200, Stimulus::Press(ControlId::PassengerSeat)),
    (1_400, Stimulus::Press(ControlId::PassengerSeat)),
    (8_000, Stimulus::Inject(ChannelId::PASSENGER, 45)),
    (11_000, Stimulus::Release(ChannelId::PASSENGER)),
    (14_000, Stimulus::Inject(ChannelId::DRIVER, 2)),
    (15_000, Stimulus::Release(ChannelId::DRIVER)),
    (20_000, Stimulus::Press(ControlId::DriverSeat)),
];

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("SeatHeat v{} (host simulation)", env!("CARGO_PKG_VERSION"));

    // ── 2. Config (or defaults) ───────────────────────────────
    let config = match FileConfig::from_env().load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Core state ─────────────────────────────────────────
    // Leaked: shared with the interrupt thread for the life of the process.
    let service: &'static SeatHeaterService = Box::leak(Box::new(
        SeatHeaterService::new(config).context("building seat heater service")?,
    ));

    // ── 4. Peripherals ────────────────────────────────────────
    let pins: [[SimPin; 3]; CHANNEL_COUNT] =
        core::array::from_fn(|_| core::array::from_fn(|_| SimPin::new()));
    let plant_probes = core::array::from_fn(|i| (pins[i][0].clone(), pins[i][1].clone()));
    let hw = HardwareAdapter::new(core::array::from_fn(|i| SeatIndicators {
        green: pins[i][0].clone(),
        blue: pins[i][1].clone(),
        red: pins[i][2].clone(),
    }));
    let clock = MonotonicClock::new();
    let sink = LogEventSink::new();

    // ── 5. Interrupt / plant thread ───────────────────────────
    let plant = ThermalPlant::new(AMBIENT_C, plant_probes);
    std::thread::Builder::new()
        .name("sim-irq".into())
        .spawn(move || run_simulation(service, plant))
        .context("spawning simulation thread")?;

    // ── 6. Control executor ───────────────────────────────────
    let executor: LocalExecutor<'_, EXECUTOR_SLOTS> = LocalExecutor::new();
    service.spawn_tasks(&executor, &hw, &clock, &sink);

    let run_for = std::env::var(RUN_SECS_ENV)
        .ok()
        .and_then(|s| s.parse::<u64>().ok());
    futures_lite::future::block_on(executor.run(async {
        match run_for {
            Some(secs) => {
                async_io_mini::Timer::after(Duration::from_secs(secs)).await;
            }
            None => core::future::pending::<()>().await,
        }
    }));

    // ── 7. Diagnostic dump ────────────────────────────────────
    let history = futures_lite::future::block_on(service.fault_history());
    info!("Diagnostic history ({} records):", history.len());
    for r in &history {
        info!(
            "  t={}ms seat=0x{:02X} failure=0x{:02X} level={:?}",
            r.timestamp_ms(),
            r.channel().fault_code(),
            r.kind().code(),
            r.heating_level()
        );
    }
    Ok(())
}

/// Plays [`SCRIPT`] against the button bank and steps the thermal plant.
fn run_simulation(service: &'static SeatHeaterService, mut plant: ThermalPlant) {
    let buttons = ButtonBank::new(service.store());
    let start = Instant::now();
    let mut script = SCRIPT.iter().peekable();
    let dt_s = SIM_STEP_MS as f32 / 1000.0;

    loop {
        let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        while let Some(&&(at_ms, stimulus)) = script.peek() {
            if at_ms > now_ms {
                break;
            }
            script.next();
            info!("SIM | t={}ms {:?}", now_ms, stimulus);
            match stimulus {
                Stimulus::Press(control) => {
                    buttons.on_edge(control, now_ms);
                }
                Stimulus::Inject(channel, celsius) => plant.set_override(channel, Some(celsius)),
                Stimulus::Release(channel) => plant.set_override(channel, None),
            }
        }
        plant.step(dt_s);
        std::thread::sleep(Duration::from_millis(SIM_STEP_MS));
    }
}
