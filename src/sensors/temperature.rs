//! Analog temperature sensor (TMP36 family: 10 mV/°C, 500 mV offset).
//!
//! One filtered reading yields both the display value in degrees and the
//! percentage the fan and vent auto modes compare against their threshold.

use crate::app::ports::{AdcChannel, AdcPort};
use crate::error::SensorError;
use crate::sensors::SharedAdc;

/// Output voltage at 0 °C.
const OFFSET_MV: i32 = 500;
/// Sensor slope.
const MV_PER_DEG: i32 = 10;
/// Sensor output treated as 100 %.
pub const FULL_SCALE_MV: i32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReading {
    pub millivolts: i32,
    /// Whole degrees Celsius, truncated toward zero.
    pub celsius: i32,
    /// Share of the 2 V full scale, 0..=100.
    pub percent: i32,
}

impl TemperatureReading {
    pub fn from_mv(mv: i32) -> Self {
        Self {
            millivolts: mv,
            celsius: (mv - OFFSET_MV) / MV_PER_DEG,
            percent: (mv * 100 / FULL_SCALE_MV).clamp(0, 100),
        }
    }
}

/// Take one filtered reading.
pub fn read<A: AdcPort>(adc: &SharedAdc<A>) -> Result<TemperatureReading, SensorError> {
    let mv = adc.sample(AdcChannel::Temperature)?;
    log::debug!("temperature: {} mV", mv);
    Ok(TemperatureReading::from_mv(mv))
}
