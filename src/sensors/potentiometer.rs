//! Rotary potentiometer used for live actuator adjustment.
//!
//! The wiper is wired so that turning clockwise *lowers* the voltage, so
//! the reading is inverted against the 3.3 V full scale before scaling.

use crate::app::ports::{AdcChannel, AdcPort};
use crate::error::SensorError;
use crate::sensors::SharedAdc;

/// Wiper voltage at full travel.
pub const FULL_SCALE_MV: i32 = 3300;

/// Inverted, scaled wiper position in 0..=100 %.
pub fn percent_from_mv(mv: i32) -> i32 {
    let inverted = FULL_SCALE_MV - mv.clamp(0, FULL_SCALE_MV);
    inverted * 100 / FULL_SCALE_MV
}

/// Take one filtered wiper reading.
pub fn read_percent<A: AdcPort>(adc: &SharedAdc<A>) -> Result<i32, SensorError> {
    let mv = adc.sample(AdcChannel::Potentiometer)?;
    log::debug!("potentiometer: {} mV", mv);
    Ok(percent_from_mv(mv))
}
