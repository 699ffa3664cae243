//! Integration tests for Controller routing: UI commands, sensor latches
//! and the potentiometer adjustment session.

use homectl::app::controller::Controller;
use homectl::app::messages::{Action, ActuatorId, ControllerMsg};
use homectl::channels::StatusBoard;
use homectl::config::SystemConfig;
use homectl::error::{ActuatorError, Error, TimerError};

use crate::mock_hw::{MockIndicator, MockOutput, MockTimer, outputs};

type TestController<'a> = Controller<'a, MockOutput, MockTimer, MockIndicator>;

fn controller_with(status: &StatusBoard, outputs: [MockOutput; 3], timer: MockTimer) -> TestController<'_> {
    Controller::new(&SystemConfig::default(), outputs, timer, MockIndicator::default(), status)
}

fn controller(status: &StatusBoard) -> TestController<'_> {
    controller_with(status, outputs(), MockTimer::default())
}

fn ui(actuator: ActuatorId, action: Action) -> ControllerMsg {
    ControllerMsg::Ui { actuator, action }
}

/// Drive `id` to `pct` through a full adjustment session.
fn adjust_to(ctl: &mut TestController<'_>, id: ActuatorId, pct: i32) {
    ctl.handle(ui(id, Action::Adjust)).unwrap();
    ctl.handle(ControllerMsg::Potentiometer(pct)).unwrap();
    ctl.handle(ui(id, Action::Adjust)).unwrap();
}

fn last_write(ctl: &TestController<'_>, id: ActuatorId) -> Option<u32> {
    ctl.actuator(id).output().last()
}

// ── Construction ──────────────────────────────────────────────

#[test]
fn initial_status_is_published() {
    let status = StatusBoard::new();
    status.publish(ActuatorId::Lamp, false, true);
    status.set_adjusting(true);

    let ctl = controller(&status);
    for id in ActuatorId::ALL {
        assert!(status.is_enabled(id));
        assert!(!status.is_auto(id));
        assert!(ctl.actuator(id).output().writes.is_empty());
    }
    assert!(!status.is_adjusting());
    assert_eq!(ctl.session(), None);
}

// ── Enable toggle ─────────────────────────────────────────────

#[test]
fn fan_toggle_round_trip_at_forty_percent() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    adjust_to(&mut ctl, ActuatorId::Fan, 40);
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(156));

    ctl.handle(ui(ActuatorId::Fan, Action::Toggle)).unwrap();
    assert!(!ctl.actuator(ActuatorId::Fan).is_enabled());
    assert!(!status.is_enabled(ActuatorId::Fan));
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(0));

    ctl.handle(ui(ActuatorId::Fan, Action::Toggle)).unwrap();
    assert!(status.is_enabled(ActuatorId::Fan));
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(156));
    assert_eq!(ctl.actuator(ActuatorId::Fan).output().writes, vec![156, 0, 156]);
}

#[test]
fn failed_write_still_commits_state() {
    let status = StatusBoard::new();
    let [fan, vent, lamp] = outputs();
    let fan = MockOutput { fail: true, ..fan };
    let mut ctl = controller_with(&status, [fan, vent, lamp], MockTimer::default());

    let r = ctl.handle(ui(ActuatorId::Fan, Action::Toggle));
    assert_eq!(r, Err(Error::Actuator(ActuatorError::PwmWriteFailed(-1))));
    assert!(!ctl.actuator(ActuatorId::Fan).is_enabled());
    assert!(!status.is_enabled(ActuatorId::Fan));
}

// ── Sensor latches ────────────────────────────────────────────

#[test]
fn warm_reading_latches_fan_in_auto() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    adjust_to(&mut ctl, ActuatorId::Fan, 40);

    ctl.handle(ui(ActuatorId::Fan, Action::Mode)).unwrap();
    assert!(status.is_auto(ActuatorId::Fan));
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(0), "auto and unlatched is off");

    ctl.handle(ControllerMsg::TempSensor(45)).unwrap();
    assert!(ctl.actuator(ActuatorId::Fan).is_latched());
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(156));

    ctl.handle(ControllerMsg::TempSensor(38)).unwrap();
    assert!(!ctl.actuator(ActuatorId::Fan).is_latched());
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(0));
}

#[test]
fn temperature_reaches_vent_and_fan_but_not_lamp() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    ctl.handle(ControllerMsg::TempSensor(45)).unwrap();

    assert!(ctl.actuator(ActuatorId::Fan).is_latched());
    assert!(ctl.actuator(ActuatorId::Vent).is_latched());
    assert!(!ctl.actuator(ActuatorId::Lamp).is_latched());
    // Manual mode: latching alone never writes.
    for id in ActuatorId::ALL {
        assert!(ctl.actuator(id).output().writes.is_empty());
    }
}

#[test]
fn darkness_drives_lamp_in_auto() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    adjust_to(&mut ctl, ActuatorId::Lamp, 50);
    // 115 + 85 * 50 / 100
    assert_eq!(last_write(&ctl, ActuatorId::Lamp), Some(157));

    ctl.handle(ui(ActuatorId::Lamp, Action::Mode)).unwrap();
    ctl.handle(ControllerMsg::Photoresistor(100)).unwrap();
    assert_eq!(last_write(&ctl, ActuatorId::Lamp), Some(157));
    ctl.handle(ControllerMsg::Photoresistor(0)).unwrap();
    assert_eq!(last_write(&ctl, ActuatorId::Lamp), Some(0));

    assert!(!ctl.actuator(ActuatorId::Fan).is_latched());
    assert!(!ctl.actuator(ActuatorId::Vent).is_latched());
}

#[test]
fn leaving_auto_unlatched_restores_level() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    adjust_to(&mut ctl, ActuatorId::Vent, 50);
    ctl.handle(ui(ActuatorId::Vent, Action::Mode)).unwrap();
    assert_eq!(last_write(&ctl, ActuatorId::Vent), Some(0));
    ctl.handle(ui(ActuatorId::Vent, Action::Mode)).unwrap();
    assert_eq!(last_write(&ctl, ActuatorId::Vent), Some(90));
}

#[test]
fn temperature_latches_both_when_every_write_fails() {
    let status = StatusBoard::new();
    let [fan, vent, lamp] = outputs();
    let fan = MockOutput { fail: true, ..fan };
    let vent = MockOutput { fail: true, ..vent };
    let mut ctl = controller_with(&status, [fan, vent, lamp], MockTimer::default());
    assert!(ctl.handle(ui(ActuatorId::Fan, Action::Mode)).is_err());
    assert!(ctl.handle(ui(ActuatorId::Vent, Action::Mode)).is_err());

    let r = ctl.handle(ControllerMsg::TempSensor(60));
    assert_eq!(r, Err(Error::Actuator(ActuatorError::PwmWriteFailed(-1))));
    assert!(ctl.actuator(ActuatorId::Fan).is_latched());
    assert!(ctl.actuator(ActuatorId::Vent).is_latched());
    assert!(status.is_auto(ActuatorId::Fan));
    assert!(status.is_auto(ActuatorId::Vent));
}

// ── Adjustment session ────────────────────────────────────────

#[test]
fn pot_near_full_scale_drives_vent_and_bar_to_max() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    ctl.handle(ui(ActuatorId::Vent, Action::Adjust)).unwrap();
    ctl.handle(ControllerMsg::Potentiometer(97)).unwrap();

    assert_eq!(ctl.actuator(ActuatorId::Vent).level(), 100);
    assert_eq!(last_write(&ctl, ActuatorId::Vent), Some(180));
    assert_eq!(ctl.indicator().current(), 8);
}

#[test]
fn pot_near_zero_snaps_off() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    ctl.handle(ui(ActuatorId::Fan, Action::Adjust)).unwrap();
    ctl.handle(ControllerMsg::Potentiometer(3)).unwrap();
    assert_eq!(ctl.actuator(ActuatorId::Fan).level(), 0);
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(0));
    assert_eq!(ctl.indicator().current(), 0);
}

#[test]
fn pot_without_session_is_ignored() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    ctl.handle(ControllerMsg::Potentiometer(60)).unwrap();
    for id in ActuatorId::ALL {
        assert_eq!(ctl.actuator(id).level(), 0);
        assert!(ctl.actuator(id).output().writes.is_empty());
    }
    assert!(ctl.indicator().frames.is_empty());
}

#[test]
fn session_starts_one_timer_and_closing_blanks_bar() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);

    ctl.handle(ui(ActuatorId::Lamp, Action::Adjust)).unwrap();
    assert_eq!(ctl.session(), Some(ActuatorId::Lamp));
    assert!(status.is_adjusting());
    assert_eq!(ctl.timer().starts, 1);
    assert!(ctl.timer().running);

    ctl.handle(ControllerMsg::Potentiometer(50)).unwrap();
    assert_eq!(ctl.indicator().current(), 4);

    ctl.handle(ui(ActuatorId::Lamp, Action::Adjust)).unwrap();
    assert_eq!(ctl.session(), None);
    assert!(!status.is_adjusting());
    assert_eq!(ctl.timer().stops, 1);
    assert!(!ctl.timer().running);
    assert_eq!(ctl.indicator().current(), 0);
}

#[test]
fn adjust_for_other_actuator_closes_open_session() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);

    ctl.handle(ui(ActuatorId::Fan, Action::Adjust)).unwrap();
    ctl.handle(ui(ActuatorId::Lamp, Action::Adjust)).unwrap();
    assert_eq!(ctl.session(), None, "second Adjust closes, never opens");
    assert_eq!(ctl.timer().starts, 1);
    assert_eq!(ctl.timer().stops, 1);

    ctl.handle(ControllerMsg::Potentiometer(50)).unwrap();
    assert_eq!(ctl.actuator(ActuatorId::Fan).level(), 0);
    assert_eq!(ctl.actuator(ActuatorId::Lamp).level(), 0);

    ctl.handle(ui(ActuatorId::Lamp, Action::Adjust)).unwrap();
    assert_eq!(ctl.session(), Some(ActuatorId::Lamp));
    assert_eq!(ctl.timer().starts, 2);
}

#[test]
fn timer_failure_leaves_session_closed() {
    let status = StatusBoard::new();
    let timer = MockTimer { failing_starts: 1, ..MockTimer::default() };
    let mut ctl = controller_with(&status, outputs(), timer);

    let r = ctl.handle(ui(ActuatorId::Vent, Action::Adjust));
    assert_eq!(r, Err(Error::Timer(TimerError::Driver(-1))));
    assert_eq!(ctl.session(), None);
    assert!(!status.is_adjusting());
}

#[test]
fn session_level_survives_disable() {
    let status = StatusBoard::new();
    let mut ctl = controller(&status);
    ctl.handle(ui(ActuatorId::Fan, Action::Toggle)).unwrap();
    adjust_to(&mut ctl, ActuatorId::Fan, 40);
    assert_eq!(ctl.actuator(ActuatorId::Fan).output().writes, vec![0]);

    ctl.handle(ui(ActuatorId::Fan, Action::Toggle)).unwrap();
    assert_eq!(last_write(&ctl, ActuatorId::Fan), Some(156));
}
