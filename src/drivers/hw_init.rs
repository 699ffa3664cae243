//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit (with line-fitting calibration) and
//! the three LEDC timers/channels using raw ESP-IDF sys calls. Called once
//! from `main()` before any task is spawned.
//!
//! ```text
//!   ADC1  CH4 potentiometer   CH5 temperature   CH6 photoresistor   (12 dB)
//!   LEDC  T0/CH0 lamp 8-bit   T1/CH1 vent 50 Hz 12-bit   T2/CH2 fan 20 kHz 8-bit
//! ```

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::error::{ActuatorError, SensorError};
use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::drivers::pwm_output::PwmOutput;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), Error> {
    // SAFETY: Called once from main() before any task exists.
    unsafe {
        init_adc()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), Error> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot + calibration) ───────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ADC1_CALI: adc_cali_handle_t = core::ptr::null_mut();

/// SAFETY: Handles are written once in `init_adc()` before any reader
/// thread exists. Readers are serialised by `SharedAdc`'s lock.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handles() -> (adc_oneshot_unit_handle_t, adc_cali_handle_t) {
    unsafe { (ADC1_HANDLE, ADC1_CALI) }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), Error> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: ADC1 unit create failed (rc={})", ret);
        return Err(Error::Init("adc unit"));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
    };
    for ch in [pins::ADC1_CH_POT, pins::ADC1_CH_TEMP, pins::ADC1_CH_PHOTO] {
        // SAFETY: handle was created above.
        let ret = unsafe { adc_oneshot_config_channel(ADC1_HANDLE, ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            log::error!("hw_init: ADC1 CH{} config failed (rc={})", ch, ret);
            return Err(Error::Init("adc channel"));
        }
    }

    let cali_cfg = adc_cali_line_fitting_config_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        ..Default::default()
    };
    // SAFETY: ADC1_CALI is only written here, once at boot.
    let ret = unsafe { adc_cali_create_scheme_line_fitting(&cali_cfg, &raw mut ADC1_CALI) };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: ADC1 calibration failed (rc={})", ret);
        return Err(SensorError::CalibrationFailed(ret).into());
    }

    info!(
        "hw_init: ADC1 configured (pot=GPIO{}/CH{}, temp=GPIO{}/CH{}, photo=GPIO{}/CH{})",
        pins::POT_ADC_GPIO,
        pins::ADC1_CH_POT,
        pins::TEMP_ADC_GPIO,
        pins::ADC1_CH_TEMP,
        pins::PHOTO_ADC_GPIO,
        pins::ADC1_CH_PHOTO
    );
    Ok(())
}

/// One calibrated conversion in millivolts.
#[cfg(target_os = "espidf")]
pub fn adc1_read_mv(channel: u32) -> Result<i32, SensorError> {
    // SAFETY: adc1_handles() contract; caller holds the SharedAdc lock.
    let (unit, cali) = unsafe { adc1_handles() };
    if unit.is_null() || cali.is_null() {
        return Err(SensorError::AdcReadFailed(ESP_ERR_INVALID_STATE as i32));
    }
    let mut raw: i32 = 0;
    // SAFETY: unit handle is valid and the channel was configured at boot.
    let ret = unsafe { adc_oneshot_read(unit, channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed(ret));
    }
    let mut mv: i32 = 0;
    // SAFETY: calibration handle is valid; pure conversion.
    let ret = unsafe { adc_cali_raw_to_voltage(cali, raw, &mut mv) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::CalibrationFailed(ret));
    }
    Ok(mv)
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
struct LedcOutput {
    channel: u32,
    timer: u32,
    gpio: i32,
    freq_hz: u32,
    resolution: ledc_timer_bit_t,
    /// Duty at logical level 0.
    rest_duty: u32,
}

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), Error> {
    let outputs = [
        LedcOutput {
            channel: pins::LEDC_CH_LAMP,
            timer: pins::LEDC_TIMER_LAMP,
            gpio: pins::LAMP_PWM_GPIO,
            freq_hz: pins::LAMP_PWM_FREQ_HZ,
            resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            rest_duty: PwmOutput::lamp().rest_duty(),
        },
        LedcOutput {
            channel: pins::LEDC_CH_VENT,
            timer: pins::LEDC_TIMER_VENT,
            gpio: pins::VENT_PWM_GPIO,
            freq_hz: pins::VENT_PWM_FREQ_HZ,
            resolution: ledc_timer_bit_t_LEDC_TIMER_12_BIT,
            rest_duty: PwmOutput::vent().rest_duty(),
        },
        LedcOutput {
            channel: pins::LEDC_CH_FAN,
            timer: pins::LEDC_TIMER_FAN,
            gpio: pins::FAN_PWM_GPIO,
            freq_hz: pins::FAN_PWM_FREQ_HZ,
            resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
            rest_duty: PwmOutput::fan().rest_duty(),
        },
    ];

    for out in &outputs {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: out.timer,
            duty_resolution: out.resolution,
            freq_hz: out.freq_hz,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: Called from single main-task context via init_peripherals().
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 {
            log::error!("hw_init: LEDC timer {} config failed (rc={})", out.timer, ret);
            return Err(Error::Init("ledc timer"));
        }

        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel: out.channel,
                timer_sel: out.timer,
                gpio_num: out.gpio,
                duty: out.rest_duty,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            log::error!("hw_init: LEDC CH{} config failed (rc={})", out.channel, ret);
            return Err(Error::Init("ledc channel"));
        }
    }

    info!("hw_init: LEDC configured (lamp=CH0, vent=CH1, fan=CH2)");
    Ok(())
}

/// Write a raw duty to an LEDC channel.
#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) -> Result<(), ActuatorError> {
    // SAFETY: LEDC channels were configured in init_ledc(); each channel
    // is written only by the Controller thread.
    unsafe {
        let ret = ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        if ret != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed(ret));
        }
        let ret = ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
        if ret != ESP_OK as i32 {
            return Err(ActuatorError::PwmWriteFailed(ret));
        }
    }
    Ok(())
}
