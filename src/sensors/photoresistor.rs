//! Photoresistor in series with a 10 kOhm resistor.
//!
//! More light raises the divider voltage. The divider's maximum is not
//! well defined, so the reading is reduced to a binary darkness level:
//! 0 % when lit, 100 % when dark.

use crate::app::ports::{AdcChannel, AdcPort};
use crate::error::SensorError;
use crate::sensors::SharedAdc;

/// Divider voltage separating light from dark. Hand-tuned.
pub const LIGHT_THRESHOLD_MV: i32 = 2000;

pub fn darkness_from_mv(mv: i32) -> i32 {
    if mv >= LIGHT_THRESHOLD_MV { 0 } else { 100 }
}

/// Take one filtered reading as a darkness percentage.
pub fn read_darkness<A: AdcPort>(adc: &SharedAdc<A>) -> Result<i32, SensorError> {
    let mv = adc.sample(AdcChannel::Photoresistor)?;
    log::debug!("photoresistor: {} mV", mv);
    Ok(darkness_from_mv(mv))
}
