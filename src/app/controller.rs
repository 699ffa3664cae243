//! Central message router.
//!
//! Single consumer of the command queue and sole writer of actuator
//! state. UI commands go to the named actuator, sensor percentages go to
//! the actuators whose auto mode they drive, and potentiometer readings go
//! to whichever actuator holds the live adjustment session.
//!
//! ```text
//!   Ui{a, Mode}     ──▶ a.toggle_auto_mode()
//!   Ui{a, Toggle}   ──▶ a.toggle_enabled()
//!   Ui{a, Adjust}   ──▶ open / close session (single global toggle)
//!   Potentiometer   ──▶ session target .set_level() + level indicator
//!   Photoresistor   ──▶ lamp.apply_sensor_percent()
//!   TempSensor      ──▶ vent + fan .apply_sensor_percent()
//! ```
//!
//! Failures are logged and the loop carries on; a broken output channel
//! only affects the message that touched it.

use log::{error, info, warn};

use crate::app::actuator::Actuator;
use crate::app::messages::{Action, ActuatorId, ControllerMsg};
use crate::app::ports::{LevelIndicator, OutputChannel, SampleTimer};
use crate::channels::StatusBoard;
use crate::config::SystemConfig;
use crate::error::Result;

/// Potentiometer readings above this snap to 100 %.
const POT_FULL_SCALE_PCT: i32 = 95;
/// Potentiometer readings below this snap to 0 %.
const POT_ZERO_PCT: i32 = 5;

/// Snap the potentiometer ends so full-scale and off are reachable.
pub fn clamp_pot_percent(percent: i32) -> i32 {
    if percent > POT_FULL_SCALE_PCT {
        100
    } else if percent < POT_ZERO_PCT {
        0
    } else {
        percent
    }
}

pub struct Controller<'a, O, T, L>
where
    O: OutputChannel,
    T: SampleTimer,
    L: LevelIndicator,
{
    fan: Actuator<O>,
    vent: Actuator<O>,
    lamp: Actuator<O>,
    /// Actuator currently bound to the potentiometer, if any.
    session: Option<ActuatorId>,
    timer: T,
    indicator: L,
    status: &'a StatusBoard,
}

impl<'a, O, T, L> Controller<'a, O, T, L>
where
    O: OutputChannel,
    T: SampleTimer,
    L: LevelIndicator,
{
    /// `outputs` are the fan, vent and lamp channels in that order.
    pub fn new(
        config: &SystemConfig,
        outputs: [O; 3],
        timer: T,
        indicator: L,
        status: &'a StatusBoard,
    ) -> Self {
        let [fan, vent, lamp] = outputs;
        let ctrl = Self {
            fan: Actuator::new(ActuatorId::Fan, config.fan, fan),
            vent: Actuator::new(ActuatorId::Vent, config.vent, vent),
            lamp: Actuator::new(ActuatorId::Lamp, config.lamp, lamp),
            session: None,
            timer,
            indicator,
            status,
        };
        for id in ActuatorId::ALL {
            ctrl.publish(id);
        }
        status.set_adjusting(false);
        ctrl
    }

    pub fn actuator(&self, id: ActuatorId) -> &Actuator<O> {
        match id {
            ActuatorId::Fan => &self.fan,
            ActuatorId::Vent => &self.vent,
            ActuatorId::Lamp => &self.lamp,
        }
    }

    fn actuator_mut(&mut self, id: ActuatorId) -> &mut Actuator<O> {
        match id {
            ActuatorId::Fan => &mut self.fan,
            ActuatorId::Vent => &mut self.vent,
            ActuatorId::Lamp => &mut self.lamp,
        }
    }

    pub fn session(&self) -> Option<ActuatorId> {
        self.session
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    /// Apply one message. Errors are returned after state has been updated
    /// and the status board republished.
    pub fn handle(&mut self, msg: ControllerMsg) -> Result<()> {
        match msg {
            ControllerMsg::Ui { actuator, action } => self.on_ui(actuator, action),
            ControllerMsg::Potentiometer(pct) => self.on_potentiometer(pct),
            ControllerMsg::Photoresistor(pct) => {
                let r = self.lamp.apply_sensor_percent(pct);
                self.publish(ActuatorId::Lamp);
                Ok(r?)
            }
            ControllerMsg::TempSensor(pct) => {
                let vent = self.vent.apply_sensor_percent(pct);
                let fan = self.fan.apply_sensor_percent(pct);
                self.publish(ActuatorId::Vent);
                self.publish(ActuatorId::Fan);
                if let (Err(v), Err(f)) = (&vent, &fan) {
                    error!("controller: fan write failed too: {} (vent: {})", f, v);
                }
                vent?;
                Ok(fan?)
            }
        }
    }

    /// Blocking loop over the command queue. Never returns.
    pub fn run<R>(&mut self, mut recv: R) -> !
    where
        R: FnMut() -> ControllerMsg,
    {
        info!("controller: running");
        loop {
            let msg = recv();
            if let Err(e) = self.handle(msg) {
                error!("controller: {:?} failed: {}", msg, e);
            }
        }
    }

    fn on_ui(&mut self, id: ActuatorId, action: Action) -> Result<()> {
        let r = match action {
            Action::Mode => self.actuator_mut(id).toggle_auto_mode(),
            Action::Toggle => self.actuator_mut(id).toggle_enabled(),
            Action::Adjust => return self.toggle_session(id),
        };
        self.publish(id);
        info!(
            "controller: {} {} -> enabled={} auto={}",
            id.label(),
            action.label(),
            self.actuator(id).is_enabled(),
            self.actuator(id).is_auto()
        );
        Ok(r?)
    }

    /// Any `Adjust` while a session is open closes it, whichever actuator
    /// the message names.
    fn toggle_session(&mut self, id: ActuatorId) -> Result<()> {
        match self.session {
            None => {
                self.timer.start()?;
                self.session = Some(id);
                self.status.set_adjusting(true);
                info!("controller: adjusting {}", id.label());
                Ok(())
            }
            Some(current) => {
                if current != id {
                    warn!(
                        "controller: adjust for {} closes open {} session",
                        id.label(),
                        current.label()
                    );
                }
                self.session = None;
                self.status.set_adjusting(false);
                let stopped = self.timer.stop();
                let blanked = self.indicator.show(0);
                info!("controller: adjust session closed");
                stopped?;
                Ok(blanked?)
            }
        }
    }

    fn on_potentiometer(&mut self, percent: i32) -> Result<()> {
        let Some(target) = self.session else {
            return Ok(());
        };
        let pct = clamp_pot_percent(percent);
        let level = self.actuator_mut(target).set_level(pct);
        let shown = self.indicator.show_percent(pct as u8);
        level?;
        Ok(shown?)
    }

    fn publish(&self, id: ActuatorId) {
        let a = self.actuator(id);
        self.status.publish(id, a.is_enabled(), a.is_auto());
    }
}
