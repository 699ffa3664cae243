//! Port traits: the boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / UI (domain)
//! ```
//!
//! Driven adapters (PWM outputs, ADC, sample timer, level indicator,
//! display, weather client, Wi-Fi link) implement these traits. The domain consumes
//! them via generics, so the control core never touches hardware directly
//! and every port can be replaced by a recording mock in tests.

use crate::error::{ActuatorError, NetworkError, SensorError, TimerError, WeatherError};

// ───────────────────────────────────────────────────────────────
// Output port (domain → PWM / servo)
// ───────────────────────────────────────────────────────────────

/// One physical output channel in its native unit (PWM duty or servo
/// angle). `0` always means fully off.
pub trait OutputChannel {
    fn write(&mut self, native: u32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// ADC port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Logical analog inputs sharing the one ADC unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    Potentiometer,
    Temperature,
    Photoresistor,
}

/// Single calibrated conversion. Callers serialise access through
/// [`SharedAdc`](crate::sensors::SharedAdc).
pub trait AdcPort {
    fn read_mv(&mut self, channel: AdcChannel) -> Result<i32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Potentiometer sample timer (cancellable background activity)
// ───────────────────────────────────────────────────────────────

pub trait SampleTimer {
    /// Begin periodic potentiometer ticks. Fails with
    /// [`TimerError::AlreadyRunning`] if already started.
    fn start(&mut self) -> Result<(), TimerError>;

    /// Stop ticking. No-op when idle.
    fn stop(&mut self) -> Result<(), TimerError>;
}

// ───────────────────────────────────────────────────────────────
// Level indicator (8-segment bar)
// ───────────────────────────────────────────────────────────────

pub trait LevelIndicator {
    /// Number of segments on the bar.
    const SEGMENTS: u8 = 8;

    /// Light `segments` LEDs from the bottom; `0` blanks the bar.
    fn show(&mut self, segments: u8) -> Result<(), ActuatorError>;

    /// Show a 0-100 % value scaled onto the bar.
    fn show_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        let segments = u16::from(percent.min(100)) * u16::from(Self::SEGMENTS) / 100;
        self.show(segments as u8)
    }
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → screen)
// ───────────────────────────────────────────────────────────────

/// One entry of a rendered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub selected: bool,
}

/// Screen collaborator. Receives pre-formatted strings and menu state only.
pub trait Display {
    /// Home screen: inside / outside temperature and wall-clock time.
    fn home(&mut self, inside: &str, outside: &str, clock: &str);

    fn menu(&mut self, items: &[MenuItem]);

    /// Current manual / automatic state before offering a flip.
    fn mode(&mut self, label: &str, is_auto: bool);

    /// Current enabled state before offering a flip.
    fn toggle(&mut self, label: &str, enabled: bool);

    /// Live potentiometer session in progress.
    fn adjust(&mut self, label: &str);
}

// ───────────────────────────────────────────────────────────────
// Outside temperature (network collaborator → domain)
// ───────────────────────────────────────────────────────────────

pub trait WeatherPort {
    /// Current outside temperature in whole degrees Celsius.
    fn outside_celsius(&mut self) -> Result<i32, WeatherError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity (Wi-Fi station + wall-clock sync)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort {
    /// One association attempt; returns once the interface has an address.
    fn connect(&mut self) -> Result<(), NetworkError>;
    fn is_connected(&self) -> bool;
    /// Start wall-clock sync if it is not running yet. Idempotent.
    fn sync_clock(&mut self) -> Result<(), NetworkError>;
}
