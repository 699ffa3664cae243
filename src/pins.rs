//! GPIO / peripheral pin assignments for the HomeCtl board (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers. Where esp-idf-hal hands out a typed pin
//! (`p.pins.gpioNN`), `main` asserts at compile time that the pick matches
//! the constant here.

// ---------------------------------------------------------------------------
// Analog inputs (ADC1)
// ---------------------------------------------------------------------------

/// Potentiometer wiper. ADC1 channel 4.
pub const POT_ADC_GPIO: i32 = 32;
/// TMP36-style temperature sensor. ADC1 channel 5.
pub const TEMP_ADC_GPIO: i32 = 33;
/// Photoresistor divider (10 kOhm to ground). ADC1 channel 6.
pub const PHOTO_ADC_GPIO: i32 = 34;

pub const ADC1_CH_POT: u32 = 4;
pub const ADC1_CH_TEMP: u32 = 5;
pub const ADC1_CH_PHOTO: u32 = 6;

// ---------------------------------------------------------------------------
// PWM outputs (LEDC, low-speed mode)
// ---------------------------------------------------------------------------

/// DC fan motor driver gate.
pub const FAN_PWM_GPIO: i32 = 16;
/// SG90 vent servo signal.
pub const VENT_PWM_GPIO: i32 = 17;
/// Lamp dimmer.
pub const LAMP_PWM_GPIO: i32 = 18;

pub const LEDC_CH_LAMP: u32 = 0;
pub const LEDC_CH_VENT: u32 = 1;
pub const LEDC_CH_FAN: u32 = 2;

pub const LEDC_TIMER_LAMP: u32 = 0;
pub const LEDC_TIMER_VENT: u32 = 1;
pub const LEDC_TIMER_FAN: u32 = 2;

/// Lamp dimmer frequency (8-bit resolution).
pub const LAMP_PWM_FREQ_HZ: u32 = 250_000;
/// Servo frame rate (12-bit resolution).
pub const VENT_PWM_FREQ_HZ: u32 = 50;
/// Fan motor frequency, above audible range (8-bit resolution).
pub const FAN_PWM_FREQ_HZ: u32 = 20_000;

// ---------------------------------------------------------------------------
// Servo timing (tuned to the fitted SG90)
// ---------------------------------------------------------------------------

/// Servo frame period in microseconds.
pub const SERVO_PERIOD_US: u32 = 20_000;
/// Pulse width at 0 degrees.
pub const SERVO_MIN_PULSE_US: u32 = 575;
/// Pulse width at 180 degrees.
pub const SERVO_MAX_PULSE_US: u32 = 2_600;
/// Full-scale duty for the 12-bit servo timer.
pub const SERVO_DUTY_SCALE: u32 = 4_096;

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

/// Select / confirm.
pub const BUTTON_SELECT_GPIO: i32 = 19;
/// Down / move.
pub const BUTTON_DOWN_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Level indicator (74HC595)
// ---------------------------------------------------------------------------

pub const INDICATOR_DATA_GPIO: i32 = 25;
pub const INDICATOR_CLOCK_GPIO: i32 = 26;
pub const INDICATOR_LATCH_GPIO: i32 = 27;
