//! Integration tests for menu navigation, rendering and the commands the
//! UI hands to the Controller.

use homectl::app::controller::Controller;
use homectl::app::messages::{Action, ActuatorId, ButtonEvent, ControllerMsg};
use homectl::app::ui::{HomeInfo, Screen, Ui};
use homectl::channels::StatusBoard;
use homectl::config::SystemConfig;

use crate::mock_hw::{Frame, MockDisplay, MockIndicator, MockTimer, outputs};

use ButtonEvent::{Down, Select};

/// Press each button in turn, collecting emitted commands.
fn press(ui: &mut Ui, status: &StatusBoard, buttons: &[ButtonEvent]) -> Vec<ControllerMsg> {
    buttons.iter().filter_map(|&b| ui.handle(b, status)).collect()
}

fn render(ui: &Ui, home: &HomeInfo) -> Frame {
    let mut display = MockDisplay::default();
    ui.render(&mut display, home);
    display.frames.pop().unwrap()
}

#[test]
fn home_shows_placeholders_until_values_arrive() {
    let ui = Ui::new();
    assert_eq!(
        render(&ui, &HomeInfo::default()),
        Frame::Home { inside: "--".into(), outside: "--".into(), clock: "--:--".into() }
    );

    let home = HomeInfo { inside: Some(23), outside: None, clock: Some((8, 4)) };
    assert_eq!(
        render(&ui, &home),
        Frame::Home { inside: "23".into(), outside: "--".into(), clock: "08:04".into() }
    );
}

#[test]
fn actuator_menu_lists_exit_last() {
    let status = StatusBoard::new();
    let mut ui = Ui::new();
    press(&mut ui, &status, &[Select, Down]);
    assert_eq!(
        render(&ui, &HomeInfo::default()),
        Frame::Menu { labels: vec!["Fan", "Vent", "Lamp", "Exit"], selected: 1 }
    );
}

#[test]
fn action_menu_lists_actions() {
    let status = StatusBoard::new();
    let mut ui = Ui::new();
    press(&mut ui, &status, &[Select, Down, Down, Select, Down, Down]);
    assert_eq!(ui.screen(), Screen::ActionMenu { actuator: ActuatorId::Lamp, selected: 2 });
    assert_eq!(
        render(&ui, &HomeInfo::default()),
        Frame::Menu { labels: vec!["Mode", "Toggle", "Adjust", "Exit"], selected: 2 }
    );
}

#[test]
fn action_menu_exit_returns_home() {
    let status = StatusBoard::new();
    let mut ui = Ui::new();
    let sent = press(&mut ui, &status, &[Select, Select, Down, Down, Down, Select]);
    assert!(sent.is_empty());
    assert!(ui.is_home());
}

#[test]
fn toggle_view_flips_and_sends_each_down() {
    let status = StatusBoard::new();
    let mut ui = Ui::new();
    let sent = press(&mut ui, &status, &[Select, Down, Select, Down, Select]);
    assert!(sent.is_empty());
    assert_eq!(
        render(&ui, &HomeInfo::default()),
        Frame::Toggle { label: "Vent".into(), enabled: true }
    );

    let sent = press(&mut ui, &status, &[Down, Down]);
    let toggle = ControllerMsg::Ui { actuator: ActuatorId::Vent, action: Action::Toggle };
    assert_eq!(sent, vec![toggle, toggle]);
    assert_eq!(ui.screen(), Screen::Toggle { actuator: ActuatorId::Vent, enabled: true });

    press(&mut ui, &status, &[Select]);
    assert!(ui.is_home());
}

#[test]
fn adjust_view_names_actuator_and_any_button_closes() {
    let status = StatusBoard::new();
    let mut ui = Ui::new();
    let sent = press(&mut ui, &status, &[Select, Select, Down, Down, Select]);
    let adjust = ControllerMsg::Ui { actuator: ActuatorId::Fan, action: Action::Adjust };
    assert_eq!(sent, vec![adjust]);
    assert_eq!(render(&ui, &HomeInfo::default()), Frame::Adjust { label: "Fan".into() });

    // The Controller opened the session.
    status.set_adjusting(true);
    assert_eq!(ui.handle(Down, &status), Some(adjust));
    assert!(ui.is_home());
}

#[test]
fn failed_session_start_is_not_reopened_on_exit() {
    let status = StatusBoard::new();
    let timer = MockTimer { failing_starts: 1, ..MockTimer::default() };
    let mut ctl = Controller::new(&SystemConfig::default(), outputs(), timer, MockIndicator::default(), &status);
    let mut ui = Ui::new();

    // Fan -> Adjust: the timer refuses to start.
    for msg in press(&mut ui, &status, &[Select, Select, Down, Down, Select]) {
        assert!(ctl.handle(msg).is_err());
    }
    assert_eq!(ui.screen(), Screen::Adjust { actuator: ActuatorId::Fan });
    assert_eq!(ctl.session(), None);

    // Leaving the adjust view must not open a session behind the home screen.
    assert!(press(&mut ui, &status, &[Select]).is_empty());
    assert!(ui.is_home());
    assert_eq!(ctl.session(), None);
    assert!(!ctl.timer().running);
    assert!(!status.is_adjusting());

    // A second attempt works normally and closes cleanly.
    for msg in press(&mut ui, &status, &[Select, Select, Down, Down, Select]) {
        ctl.handle(msg).unwrap();
    }
    assert_eq!(ctl.session(), Some(ActuatorId::Fan));
    for msg in press(&mut ui, &status, &[Down]) {
        ctl.handle(msg).unwrap();
    }
    assert_eq!(ctl.session(), None);
    assert_eq!((ctl.timer().starts, ctl.timer().stops), (1, 1));
}

#[test]
fn menu_path_drives_controller() {
    let status = StatusBoard::new();
    let mut ctl = Controller::new(
        &SystemConfig::default(),
        outputs(),
        MockTimer::default(),
        MockIndicator::default(),
        &status,
    );
    let mut ui = Ui::new();

    // Fan -> Toggle -> flip.
    for msg in press(&mut ui, &status, &[Select, Select, Down, Select, Down]) {
        ctl.handle(msg).unwrap();
    }
    assert!(!ctl.actuator(ActuatorId::Fan).is_enabled());

    // Re-entering the view reads the state the Controller published.
    press(&mut ui, &status, &[Select]);
    press(&mut ui, &status, &[Select, Select, Down, Select]);
    assert_eq!(ui.screen(), Screen::Toggle { actuator: ActuatorId::Fan, enabled: false });

    // Lamp -> Mode -> flip.
    press(&mut ui, &status, &[Select]);
    for msg in press(&mut ui, &status, &[Select, Down, Down, Select, Select, Down]) {
        ctl.handle(msg).unwrap();
    }
    assert!(ctl.actuator(ActuatorId::Lamp).is_auto());
    assert!(status.is_auto(ActuatorId::Lamp));
}
