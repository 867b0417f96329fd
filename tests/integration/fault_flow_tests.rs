//! Sampler → handoff queue → logger → history, driven step by step.

use std::pin::pin;

use futures_lite::future::{block_on, poll_once};
use seatheat::app::service::SeatHeaterService;
use seatheat::config::SystemConfig;
use seatheat::diagnostics::{FailureKind, HANDOFF_DEPTH, HISTORY_CAPACITY};
use seatheat::safety::FaultTransition;
use seatheat::selector::ControlId;
use seatheat::state::{ChannelId, HeaterState, HeatingLevel};

use crate::mock_hw::{ActuatorCall, MockHardware, RecordingSink};

fn service() -> SeatHeaterService {
    SeatHeaterService::new(SystemConfig::default()).unwrap()
}

/// Press `control` until its channel reaches `level`, committing each edge.
fn select(svc: &SeatHeaterService, control: ControlId, level: HeatingLevel) {
    let mut selector = svc.level_selector(control.channel());
    while block_on(svc.store().level_setting(control.channel())).level() != level {
        svc.on_control_edge(control);
        block_on(selector.step());
    }
}

#[test]
fn stuck_sensor_raises_exactly_one_record() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);

    hw.set_reading(ch, 45);
    hw.advance_ms(1500);
    block_on(sampler.step());
    block_on(logger.step());

    for _ in 0..50 {
        hw.advance_ms(100);
        let (_, edge) = block_on(sampler.step());
        assert_eq!(edge, FaultTransition::Unchanged);
    }

    let history = block_on(svc.fault_history());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), FailureKind::OverRange);
    assert_eq!(history[0].timestamp_ms(), 1500);
    assert_eq!(history[0].channel(), ch);
    assert_eq!(hw.fault_writes(ch), vec![true]);
    assert_eq!(svc.link(ch).pending(), 0);
    assert!(!svc.link(ch).wake_pending());
}

#[test]
fn logger_forces_heater_off_before_indicator() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::PASSENGER;
    select(&svc, ControlId::PassengerSeat, HeatingLevel::High);

    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);
    let mut ctl = svc.heater_controller(ch, &hw);

    hw.set_reading(ch, 20);
    block_on(sampler.step());
    assert_eq!(block_on(ctl.step()), HeaterState::High);
    hw.clear_calls();

    hw.set_reading(ch, 2);
    block_on(sampler.step());
    let record = block_on(logger.step());

    assert_eq!(record.kind(), FailureKind::UnderRange);
    assert_eq!(record.heating_level(), HeatingLevel::High);
    assert_eq!(block_on(svc.store().heater_state(ch)), HeaterState::Off);
    assert_eq!(
        hw.calls_for(ch),
        vec![
            ActuatorCall::Heater(ch, HeaterState::Off),
            ActuatorCall::Fault(ch, true),
        ]
    );
}

#[test]
fn recovery_clears_without_the_logger() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);

    hw.set_reading(ch, 41);
    block_on(sampler.step());
    assert!(block_on(svc.store().fault_active(ch)));

    hw.set_reading(ch, 40);
    let (_, edge) = block_on(sampler.step());
    assert_eq!(edge, FaultTransition::Cleared);
    assert!(!block_on(svc.store().fault_active(ch)));
    assert_eq!(hw.fault_writes(ch), vec![false]);
}

#[test]
fn recovered_fault_does_not_leave_indicator_lit() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);

    hw.set_reading(ch, 50);
    block_on(sampler.step());
    hw.set_reading(ch, 30);
    block_on(sampler.step());

    // The logger only now gets to run: the record is still logged, but
    // the indicator stays off.
    block_on(logger.step());
    assert_eq!(block_on(svc.fault_history()).len(), 1);
    assert!(!hw.fault_output(ch));
}

#[test]
fn full_queue_back_pressures_the_sampler() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::PASSENGER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);

    // Fill the queue with raise/clear cycles while the logger is stalled.
    for _ in 0..HANDOFF_DEPTH {
        hw.set_reading(ch, 45);
        block_on(sampler.step());
        hw.set_reading(ch, 25);
        block_on(sampler.step());
    }
    assert_eq!(svc.link(ch).pending(), HANDOFF_DEPTH);

    hw.set_reading(ch, 45);
    {
        let mut raise = pin!(sampler.step());
        assert!(block_on(poll_once(&mut raise)).is_none(), "push must wait");
        // Latched before the push, so the controller already sees it.
        assert!(block_on(svc.store().fault_active(ch)));

        block_on(logger.step());
        let (_, edge) = block_on(raise);
        assert!(matches!(edge, FaultTransition::Raised(FailureKind::OverRange)));
    }
    assert_eq!(svc.link(ch).pending(), HANDOFF_DEPTH);

    for _ in 0..HANDOFF_DEPTH {
        block_on(logger.step());
    }
    assert_eq!(svc.link(ch).pending(), 0);
    assert_eq!(block_on(svc.history().total_logged()), HANDOFF_DEPTH as u32 + 1);
}

#[test]
fn coalesced_wake_drains_every_queued_record() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);

    for _ in 0..2 {
        hw.set_reading(ch, 0);
        block_on(sampler.step());
        hw.set_reading(ch, 20);
        block_on(sampler.step());
    }
    // Two records, one coalesced wake.
    block_on(logger.step());
    assert!(svc.link(ch).wake_pending());
    block_on(logger.step());
    assert_eq!(svc.link(ch).pending(), 0);
    assert!(!svc.link(ch).wake_pending());
}

#[test]
fn shared_history_keeps_newest_records_across_channels() {
    let svc = service();
    let hw = MockHardware::new();
    let mut samplers = ChannelId::ALL.map(|ch| svc.sensor_sampler(ch, &hw, &hw, &hw));
    let mut loggers = ChannelId::ALL.map(|ch| svc.fault_logger(ch, &hw));

    for round in 0..4u64 {
        for ch in ChannelId::ALL {
            hw.advance_ms(10);
            hw.set_reading(ch, 99);
            block_on(samplers[ch.index()].step());
            block_on(loggers[ch.index()].step());
            hw.set_reading(ch, 22);
            block_on(samplers[ch.index()].step());
        }
        assert!(block_on(svc.fault_history()).len() <= HISTORY_CAPACITY, "round {round}");
    }

    let history = block_on(svc.fault_history());
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(block_on(svc.history().total_logged()), 8);
    let stamps: Vec<u64> = history.iter().map(|r| r.timestamp_ms()).collect();
    assert_eq!(stamps, vec![40, 50, 60, 70, 80]);
}

#[test]
fn telemetry_reads_leave_history_intact() {
    let svc = service();
    let hw = MockHardware::new();
    let sink = RecordingSink::default();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);
    let mut status = svc.status_reporter(&sink);

    for reading in [45, 20, 2, 20] {
        hw.set_reading(ch, reading);
        let (_, edge) = block_on(sampler.step());
        if matches!(edge, FaultTransition::Raised(_)) {
            block_on(logger.step());
        }
        block_on(status.step());
    }

    let history = block_on(svc.fault_history());
    let kinds: Vec<FailureKind> = history.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![FailureKind::OverRange, FailureKind::UnderRange]);
    assert_eq!(block_on(svc.history().total_logged()), 2);
    assert!(!sink.events.borrow().is_empty());
}
