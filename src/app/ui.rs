//! Modal menu navigator.
//!
//! ```text
//!            any button
//!   Home ─────────────────▶ ActuatorMenu ── Select(Exit) ──▶ Home
//!    ▲                         │ Select(actuator)
//!    │                         ▼
//!    │                      ActionMenu ──── Select(Exit) ──▶ Home
//!    │        ┌────────────────┼────────────────┐
//!    │        ▼ Mode           ▼ Toggle         ▼ Adjust (sends Adjust)
//!    │     ModeView         ToggleView       AdjustView
//!    │   Down: flip+send   Down: flip+send   any: close session
//!    └──── Select ───────── Select ────────── ┘
//! ```
//!
//! Leaving AdjustView only sends the closing Adjust when the status board
//! shows a session open; if the Controller could not start one there is
//! nothing to close.
//!
//! Down moves the highlight (wrapping); Select confirms. The state machine
//! is pure: [`Ui::handle`] maps a button to an optional command and
//! [`Ui::render`] draws the current screen, so the task loop only does I/O.

use core::fmt::Write as _;

use heapless::String;

use crate::app::messages::{Action, ActuatorId, ButtonEvent, ControllerMsg};
use crate::app::ports::{Display, MenuItem};
use crate::channels::StatusBoard;

/// Entries of the first menu, in display order. `None` is Exit.
const ACTUATOR_MENU: [Option<ActuatorId>; 4] = [
    Some(ActuatorId::Fan),
    Some(ActuatorId::Vent),
    Some(ActuatorId::Lamp),
    None,
];

/// Entries of the second menu, in display order. `None` is Exit.
const ACTION_MENU: [Option<Action>; 4] = [
    Some(Action::Mode),
    Some(Action::Toggle),
    Some(Action::Adjust),
    None,
];

const EXIT_LABEL: &str = "Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    ActuatorMenu { selected: usize },
    ActionMenu { actuator: ActuatorId, selected: usize },
    Mode { actuator: ActuatorId, is_auto: bool },
    Toggle { actuator: ActuatorId, enabled: bool },
    Adjust { actuator: ActuatorId },
}

/// Values shown on the home screen.
#[derive(Debug, Clone, Default)]
pub struct HomeInfo {
    /// Inside temperature, whole degrees. `None` until the first reading.
    pub inside: Option<i32>,
    /// Outside temperature, whole degrees. `None` until the first fetch.
    pub outside: Option<i32>,
    /// Wall clock `(hour, minute)`, `None` while unset.
    pub clock: Option<(u8, u8)>,
}

impl HomeInfo {
    pub fn inside_str(&self) -> String<8> {
        temp_str(self.inside)
    }

    pub fn outside_str(&self) -> String<8> {
        temp_str(self.outside)
    }

    pub fn clock_str(&self) -> String<8> {
        let mut s = String::new();
        match self.clock {
            Some((h, m)) => {
                let _ = write!(s, "{h:02}:{m:02}");
            }
            None => {
                let _ = s.push_str("--:--");
            }
        }
        s
    }
}

fn temp_str(value: Option<i32>) -> String<8> {
    let mut s = String::new();
    match value {
        Some(v) => {
            let _ = write!(s, "{v}");
        }
        None => {
            let _ = s.push_str("--");
        }
    }
    s
}

pub struct Ui {
    screen: Screen,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        Self { screen: Screen::Home }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_home(&self) -> bool {
        self.screen == Screen::Home
    }

    /// Advance on one button press. Returns the command to send to the
    /// Controller, if the press produced one.
    pub fn handle(&mut self, button: ButtonEvent, status: &StatusBoard) -> Option<ControllerMsg> {
        let (next, msg) = match (self.screen, button) {
            (Screen::Home, _) => (Screen::ActuatorMenu { selected: 0 }, None),

            (Screen::ActuatorMenu { selected }, ButtonEvent::Down) => (
                Screen::ActuatorMenu { selected: (selected + 1) % ACTUATOR_MENU.len() },
                None,
            ),
            (Screen::ActuatorMenu { selected }, ButtonEvent::Select) => match ACTUATOR_MENU[selected] {
                Some(actuator) => (Screen::ActionMenu { actuator, selected: 0 }, None),
                None => (Screen::Home, None),
            },

            (Screen::ActionMenu { actuator, selected }, ButtonEvent::Down) => (
                Screen::ActionMenu { actuator, selected: (selected + 1) % ACTION_MENU.len() },
                None,
            ),
            (Screen::ActionMenu { actuator, selected }, ButtonEvent::Select) => match ACTION_MENU[selected] {
                Some(Action::Mode) => (
                    Screen::Mode { actuator, is_auto: status.is_auto(actuator) },
                    None,
                ),
                Some(Action::Toggle) => (
                    Screen::Toggle { actuator, enabled: status.is_enabled(actuator) },
                    None,
                ),
                Some(Action::Adjust) => (
                    Screen::Adjust { actuator },
                    Some(ControllerMsg::Ui { actuator, action: Action::Adjust }),
                ),
                None => (Screen::Home, None),
            },

            (Screen::Mode { actuator, is_auto }, ButtonEvent::Down) => (
                Screen::Mode { actuator, is_auto: !is_auto },
                Some(ControllerMsg::Ui { actuator, action: Action::Mode }),
            ),
            (Screen::Toggle { actuator, enabled }, ButtonEvent::Down) => (
                Screen::Toggle { actuator, enabled: !enabled },
                Some(ControllerMsg::Ui { actuator, action: Action::Toggle }),
            ),
            (Screen::Mode { .. } | Screen::Toggle { .. }, ButtonEvent::Select) => (Screen::Home, None),

            // A session that failed to open must not be opened by the
            // press meant to close it.
            (Screen::Adjust { actuator }, _) => (
                Screen::Home,
                status
                    .is_adjusting()
                    .then_some(ControllerMsg::Ui { actuator, action: Action::Adjust }),
            ),
        };
        self.screen = next;
        msg
    }

    /// Draw the current screen.
    pub fn render<D: Display>(&self, display: &mut D, home: &HomeInfo) {
        match self.screen {
            Screen::Home => {
                display.home(&home.inside_str(), &home.outside_str(), &home.clock_str());
            }
            Screen::ActuatorMenu { selected } => {
                let items = menu_items(&ACTUATOR_MENU, selected, |a| a.label());
                display.menu(&items);
            }
            Screen::ActionMenu { selected, .. } => {
                let items = menu_items(&ACTION_MENU, selected, |a| a.label());
                display.menu(&items);
            }
            Screen::Mode { actuator, is_auto } => display.mode(actuator.label(), is_auto),
            Screen::Toggle { actuator, enabled } => display.toggle(actuator.label(), enabled),
            Screen::Adjust { actuator } => display.adjust(actuator.label()),
        }
    }
}

fn menu_items<T: Copy>(
    entries: &[Option<T>; 4],
    selected: usize,
    label: impl Fn(T) -> &'static str,
) -> [MenuItem; 4] {
    core::array::from_fn(|i| MenuItem {
        label: entries[i].map_or(EXIT_LABEL, &label),
        selected: i == selected,
    })
}
