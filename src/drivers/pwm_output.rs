//! LEDC-backed physical outputs for the fan, vent and lamp.
//!
//! The fan and lamp take a raw 8-bit duty. The vent servo takes an angle
//! in degrees, converted here to a pulse width inside the 20 ms frame and
//! then to a 12-bit duty.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes go to the LEDC channel configured by `hw_init`.
//! On host/test: writes are only remembered, see [`PwmOutput::last`].

use crate::app::ports::OutputChannel;
use crate::error::ActuatorError;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmKind {
    /// Native value is the duty itself.
    Duty,
    /// Native value is a servo angle in degrees.
    Servo,
}

#[derive(Debug)]
pub struct PwmOutput {
    channel: u32,
    kind: PwmKind,
    last: Option<u32>,
}

impl PwmOutput {
    pub fn new(channel: u32, kind: PwmKind) -> Self {
        Self { channel, kind, last: None }
    }

    pub fn fan() -> Self {
        Self::new(pins::LEDC_CH_FAN, PwmKind::Duty)
    }

    pub fn vent() -> Self {
        Self::new(pins::LEDC_CH_VENT, PwmKind::Servo)
    }

    pub fn lamp() -> Self {
        Self::new(pins::LEDC_CH_LAMP, PwmKind::Duty)
    }

    /// Last native value successfully written, if any.
    pub fn last(&self) -> Option<u32> {
        self.last
    }

    /// LEDC duty for a native value.
    pub fn duty_for(&self, native: u32) -> u32 {
        match self.kind {
            PwmKind::Duty => native,
            PwmKind::Servo => servo_angle_to_duty(native),
        }
    }

    /// Duty a channel must start at to match logical level 0. The servo
    /// still needs a 0-degree pulse.
    pub fn rest_duty(&self) -> u32 {
        self.duty_for(0)
    }
}

/// Servo angle (0..=180°) to 12-bit duty at 50 Hz.
pub fn servo_angle_to_duty(angle: u32) -> u32 {
    let angle = angle.min(180);
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    let pulse_us = pins::SERVO_MIN_PULSE_US + angle * span / 180;
    pulse_us * pins::SERVO_DUTY_SCALE / pins::SERVO_PERIOD_US
}

impl OutputChannel for PwmOutput {
    fn write(&mut self, native: u32) -> Result<(), ActuatorError> {
        let duty = self.duty_for(native);
        #[cfg(target_os = "espidf")]
        crate::drivers::hw_init::ledc_set(self.channel, duty)?;
        log::trace!("pwm: CH{} duty={}", self.channel, duty);
        self.last = Some(native);
        Ok(())
    }
}
