//! Analog sensors and the ADC arbitration they share.
//!
//! Potentiometer, temperature sensor and photoresistor all sit on ADC1.
//! Every filtered reading goes through [`SharedAdc::sample`], which holds
//! the lock for the whole ten-conversion burst so one channel's samples
//! never interleave with another's.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`OnboardAdc`] reads the oneshot unit configured by
//! `hw_init`, calibrated to millivolts.
//! On host/test: [`OnboardAdc`] reads per-channel millivolt values from
//! static atomics set with [`sim_set_millivolts`].

pub mod filter;
pub mod photoresistor;
pub mod potentiometer;
pub mod temperature;

use std::sync::{Mutex, PoisonError};

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

use crate::app::ports::{AdcChannel, AdcPort};
use crate::error::SensorError;

/// ADC unit guarded by one lock.
pub struct SharedAdc<A: AdcPort> {
    inner: Mutex<A>,
}

impl<A: AdcPort> SharedAdc<A> {
    pub fn new(adc: A) -> Self {
        Self { inner: Mutex::new(adc) }
    }

    /// Lock, take a full burst, filter, unlock.
    pub fn sample(&self, channel: AdcChannel) -> Result<i32, SensorError> {
        // A panicking holder cannot leave a half-written burst behind, so
        // a poisoned lock is still usable.
        let mut adc = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        filter::read_trimmed(|| adc.read_mv(channel))
    }
}

// ── Onboard ADC1 ──────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_MV: [AtomicI32; 3] = [AtomicI32::new(1650), AtomicI32::new(750), AtomicI32::new(2500)];

#[cfg(not(target_os = "espidf"))]
fn sim_slot(channel: AdcChannel) -> usize {
    match channel {
        AdcChannel::Potentiometer => 0,
        AdcChannel::Temperature => 1,
        AdcChannel::Photoresistor => 2,
    }
}

/// Inject a millivolt level for a simulated ADC channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_millivolts(channel: AdcChannel, mv: i32) {
    SIM_MV[sim_slot(channel)].store(mv, Ordering::Relaxed);
}

/// The ESP32's ADC1 in oneshot mode.
#[derive(Debug, Default)]
pub struct OnboardAdc;

impl AdcPort for OnboardAdc {
    #[cfg(target_os = "espidf")]
    fn read_mv(&mut self, channel: AdcChannel) -> Result<i32, SensorError> {
        use crate::pins;
        let ch = match channel {
            AdcChannel::Potentiometer => pins::ADC1_CH_POT,
            AdcChannel::Temperature => pins::ADC1_CH_TEMP,
            AdcChannel::Photoresistor => pins::ADC1_CH_PHOTO,
        };
        crate::drivers::hw_init::adc1_read_mv(ch)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_mv(&mut self, channel: AdcChannel) -> Result<i32, SensorError> {
        Ok(SIM_MV[sim_slot(channel)].load(Ordering::Relaxed))
    }
}
