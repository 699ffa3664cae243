//! 8-LED level bar behind a 74HC595 shift register.
//!
//! ## Hardware
//!
//! Data, clock and latch lines are plain GPIO outputs. A frame is eight
//! bits shifted out MSB first on rising clock edges, then latched to the
//! outputs with one latch pulse. Bit *n* lights LED *n*, counted from the
//! bottom of the bar.
//!
//! Generic over [`embedded_hal::digital::OutputPin`] so the same driver
//! runs on `esp-idf-hal` pin drivers and on test doubles.

use embedded_hal::digital::OutputPin;

use crate::app::ports::LevelIndicator;
use crate::error::ActuatorError;

/// Bit pattern with the lowest `segments` bits set.
pub fn bar_pattern(segments: u8) -> u8 {
    match segments {
        0 => 0,
        8..=u8::MAX => 0xFF,
        n => (1u8 << n) - 1,
    }
}

pub struct ShiftRegisterBar<D, C, L> {
    data: D,
    clock: C,
    latch: L,
    shown: u8,
}

impl<D, C, L> ShiftRegisterBar<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    pub fn new(data: D, clock: C, latch: L) -> Self {
        Self { data, clock, latch, shown: 0 }
    }

    /// Segments currently lit.
    pub fn shown(&self) -> u8 {
        self.shown
    }

    fn shift_out(&mut self, pattern: u8) -> Result<(), ActuatorError> {
        self.latch.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        for bit in (0..8).rev() {
            let level = pattern & (1 << bit) != 0;
            self.clock.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
            let written = if level { self.data.set_high() } else { self.data.set_low() };
            written.map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.clock.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        self.clock.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.latch.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.latch.set_low().map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

impl<D, C, L> LevelIndicator for ShiftRegisterBar<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    fn show(&mut self, segments: u8) -> Result<(), ActuatorError> {
        let segments = segments.min(Self::SEGMENTS);
        self.shift_out(bar_pattern(segments))?;
        self.shown = segments;
        Ok(())
    }
}

/// Output pin that goes nowhere, for the host simulation.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimPin;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

#[cfg(not(target_os = "espidf"))]
impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
