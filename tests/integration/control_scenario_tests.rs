//! End-to-end control scenarios: selector, sampler, logger, and controller
//! for one seat, cycle by cycle.

use futures_lite::future::block_on;
use seatheat::app::events::AppEvent;
use seatheat::app::service::SeatHeaterService;
use seatheat::config::SystemConfig;
use seatheat::diagnostics::FailureKind;
use seatheat::selector::ControlId;
use seatheat::state::{ChannelId, HeaterState, HeatingLevel};

use crate::mock_hw::{MockHardware, RecordingSink};

fn service() -> SeatHeaterService {
    SeatHeaterService::new(SystemConfig::default()).unwrap()
}

#[test]
fn four_edges_cycle_levels_and_desired_temperature() {
    let svc = service();
    let mut selector = svc.level_selector(ChannelId::PASSENGER);
    let mut seen = Vec::new();
    for _ in 0..4 {
        svc.on_control_edge(ControlId::PassengerSeat);
        let s = block_on(selector.step());
        seen.push((s.level(), s.desired_c()));
    }
    assert_eq!(
        seen,
        vec![
            (HeatingLevel::Low, 25),
            (HeatingLevel::Medium, 30),
            (HeatingLevel::High, 35),
            (HeatingLevel::Off, 0),
        ]
    );
}

#[test]
fn medium_then_overshoot_turns_heater_off() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut selector = svc.level_selector(ch);
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut ctl = svc.heater_controller(ch, &hw);

    // Two presses from different driver controls: Medium, desired 30.
    svc.on_control_edge(ControlId::DriverSeat);
    block_on(selector.step());
    svc.on_control_edge(ControlId::DriverWheel);
    assert_eq!(block_on(selector.step()).desired_c(), 30);

    hw.set_reading(ch, 22);
    block_on(sampler.step());
    assert_eq!(block_on(ctl.step()), HeaterState::Medium);
    assert_eq!(hw.heater_output(ch), Some(HeaterState::Medium));

    hw.set_reading(ch, 32);
    block_on(sampler.step());
    assert_eq!(block_on(ctl.step()), HeaterState::Off);
    assert_eq!(hw.heater_output(ch), Some(HeaterState::Off));
}

#[test]
fn over_range_at_high_then_recovery() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::DRIVER;
    let mut selector = svc.level_selector(ch);
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);
    let mut ctl = svc.heater_controller(ch, &hw);

    for _ in 0..3 {
        svc.on_control_edge(ControlId::DriverSeat);
        block_on(selector.step());
    }
    hw.set_reading(ch, 24);
    block_on(sampler.step());
    assert_eq!(block_on(ctl.step()), HeaterState::High);

    hw.set_reading(ch, 45);
    block_on(sampler.step());
    // Controller may run before the logger: fault already latched.
    assert_eq!(block_on(ctl.step()), HeaterState::Off);
    block_on(logger.step());

    let history = block_on(svc.fault_history());
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), FailureKind::OverRange);
    assert_eq!(history[0].heating_level(), HeatingLevel::High);
    assert_eq!(block_on(svc.store().heater_state(ch)), HeaterState::Off);
    assert!(hw.fault_output(ch));
    assert_eq!(hw.heater_output(ch), Some(HeaterState::Off));

    hw.set_reading(ch, 33);
    block_on(sampler.step());
    assert!(!block_on(svc.store().fault_active(ch)));
    assert!(!hw.fault_output(ch));
    // desired 35 − current 33 = 2 → Low.
    assert_eq!(block_on(ctl.step()), HeaterState::Low);
    assert_eq!(hw.heater_output(ch), Some(HeaterState::Low));
}

#[test]
fn heater_stays_off_on_every_cycle_while_faulted() {
    let svc = service();
    let hw = MockHardware::new();
    let ch = ChannelId::PASSENGER;
    let mut selector = svc.level_selector(ch);
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);
    let mut ctl = svc.heater_controller(ch, &hw);

    svc.on_control_edge(ControlId::PassengerSeat);
    block_on(selector.step());
    hw.set_reading(ch, -5);
    block_on(sampler.step());
    block_on(logger.step());

    for cycle in 0..20 {
        // Level changes while faulted must not re-enable heat.
        if cycle % 5 == 0 {
            svc.on_control_edge(ControlId::PassengerSeat);
            block_on(selector.step());
        }
        block_on(sampler.step());
        assert_eq!(block_on(ctl.step()), HeaterState::Off, "cycle {cycle}");
        assert_eq!(block_on(svc.store().heater_state(ch)), HeaterState::Off);
    }
}

#[test]
fn channels_are_independent() {
    let svc = service();
    let hw = MockHardware::new();
    let mut d_sampler = svc.sensor_sampler(ChannelId::DRIVER, &hw, &hw, &hw);
    let mut p_sampler = svc.sensor_sampler(ChannelId::PASSENGER, &hw, &hw, &hw);
    let mut p_selector = svc.level_selector(ChannelId::PASSENGER);
    let mut p_ctl = svc.heater_controller(ChannelId::PASSENGER, &hw);

    for _ in 0..3 {
        svc.on_control_edge(ControlId::PassengerSeat);
        block_on(p_selector.step());
    }
    hw.set_reading(ChannelId::DRIVER, 60);
    hw.set_reading(ChannelId::PASSENGER, 20);
    block_on(d_sampler.step());
    block_on(p_sampler.step());

    assert!(block_on(svc.store().fault_active(ChannelId::DRIVER)));
    assert!(!block_on(svc.store().fault_active(ChannelId::PASSENGER)));
    assert_eq!(block_on(p_ctl.step()), HeaterState::High);
}

#[test]
fn status_reporter_sees_logged_faults() {
    let svc = service();
    let hw = MockHardware::new();
    let sink = RecordingSink::default();
    let ch = ChannelId::DRIVER;
    let mut sampler = svc.sensor_sampler(ch, &hw, &hw, &hw);
    let mut logger = svc.fault_logger(ch, &hw);
    let mut reporter = svc.status_reporter(&sink);

    block_on(reporter.step());
    hw.set_reading(ch, 77);
    block_on(sampler.step());
    block_on(logger.step());

    let report = block_on(reporter.step()).expect("temperature changed");
    let driver = report.channels[ch.index()];
    assert_eq!(driver.current_c, 77);
    assert!(driver.fault_active);
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.faults_logged, 1);
    assert!(matches!(
        sink.events.borrow().last(),
        Some(AppEvent::Status(_))
    ));
}
