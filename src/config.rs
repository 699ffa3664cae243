//! System configuration parameters
//!
//! All tunable parameters for the HomeCtl coordinator. Configuration is
//! built at boot; nothing is persisted across power cycles.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How an actuator's 0-100 % level maps onto its native output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMapping {
    /// PWM duty between `min` and `max`. Any mapped duty below
    /// `min + deadband` snaps to 0 (fully off).
    Duty { min: u32, max: u32, deadband: u32 },
    /// Servo angle in degrees, `0..=max_deg`.
    Angle { max_deg: u32 },
}

impl OutputMapping {
    /// Map a percentage (clamped to 0..=100) onto the native range.
    pub fn to_native(self, percent: u8) -> u32 {
        let pct = u32::from(percent.min(100));
        match self {
            Self::Duty { min, max, deadband } => {
                let duty = min + max.saturating_sub(min) * pct / 100;
                if duty < min + deadband { 0 } else { duty }
            }
            Self::Angle { max_deg } => pct * max_deg / 100,
        }
    }
}

/// Per-actuator constants: auto-mode threshold and output mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Sensor percentage at or above which auto mode latches on.
    pub threshold_pct: u8,
    pub mapping: OutputMapping,
}

/// Outside-temperature endpoint (open-meteo current weather).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub url: heapless::String<160>,
    pub timeout_secs: u16,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let mut url = heapless::String::new();
        let _ = url.push_str("http://api.open-meteo.com/v1/forecast?latitude=41.67&longitude=-86.25&current_weather=true");
        Self { url, timeout_secs: 10 }
    }
}

/// Wi-Fi station credentials and the local timezone.
///
/// SSID and password default to the `WIFI_SSID` / `WIFI_PASS` variables
/// seen at build time, empty when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
    /// POSIX TZ string applied before the wall clock is read.
    pub timezone: heapless::String<48>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut ssid = heapless::String::new();
        let _ = ssid.push_str(option_env!("WIFI_SSID").unwrap_or(""));
        let mut password = heapless::String::new();
        let _ = password.push_str(option_env!("WIFI_PASS").unwrap_or(""));
        let mut timezone = heapless::String::new();
        let _ = timezone.push_str("EST5EDT,M3.2.0/2,M11.1.0/2");
        Self { ssid, password, timezone }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Input ---
    /// Minimum spacing between accepted edges on one button (ms)
    pub debounce_ms: u32,

    // --- Sampling ---
    /// Light / temperature poll period (ms)
    pub poll_interval_ms: u32,
    /// Potentiometer sampling rate while a session is open (Hz)
    pub pot_sample_hz: u32,

    // --- UI ---
    /// Home-screen refresh period (ms)
    pub ui_refresh_ms: u32,

    // --- Outside temperature ---
    /// Weather poll period (seconds)
    pub weather_interval_secs: u32,
    pub weather: WeatherConfig,

    // --- Network ---
    pub network: NetworkConfig,

    // --- Actuators ---
    pub fan: ActuatorConfig,
    pub vent: ActuatorConfig,
    pub lamp: ActuatorConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,

            poll_interval_ms: 1000, // 1 Hz
            pot_sample_hz: 4,

            ui_refresh_ms: 1000,

            weather_interval_secs: 60, // 1/min
            weather: WeatherConfig::default(),

            network: NetworkConfig::default(),

            // Duty range tuned to where the motor actually spins.
            fan: ActuatorConfig {
                threshold_pct: 39,
                mapping: OutputMapping::Duty { min: 90, max: 255, deadband: 5 },
            },
            vent: ActuatorConfig {
                threshold_pct: 39,
                mapping: OutputMapping::Angle { max_deg: 180 },
            },
            // Duty range where the bulb is visibly lit.
            lamp: ActuatorConfig {
                threshold_pct: 75,
                mapping: OutputMapping::Duty { min: 115, max: 200, deadband: 5 },
            },
        }
    }
}

impl SystemConfig {
    /// Reject values that would break the control loops.
    pub fn validate(&self) -> Result<(), Error> {
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce_ms must be > 0"));
        }
        if self.poll_interval_ms == 0 || self.ui_refresh_ms == 0 {
            return Err(Error::Config("poll and refresh intervals must be > 0"));
        }
        if self.pot_sample_hz == 0 || self.pot_sample_hz > 1000 {
            return Err(Error::Config("pot_sample_hz must be 1..=1000"));
        }
        if self.weather_interval_secs == 0 {
            return Err(Error::Config("weather_interval_secs must be > 0"));
        }
        let url = self.weather.url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config("weather url must start with http:// or https://"));
        }
        if self.network.timezone.is_empty() {
            return Err(Error::Config("timezone must not be empty"));
        }
        for actuator in [&self.fan, &self.vent, &self.lamp] {
            if actuator.threshold_pct > 100 {
                return Err(Error::Config("actuator threshold must be <= 100"));
            }
            match actuator.mapping {
                OutputMapping::Duty { min, max, .. } if min >= max => {
                    return Err(Error::Config("duty min must be below max"));
                }
                OutputMapping::Angle { max_deg } if max_deg == 0 || max_deg > 180 => {
                    return Err(Error::Config("servo range must be 1..=180 degrees"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse a JSON override and validate it.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let config: Self = serde_json::from_slice(bytes).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Potentiometer sample period in microseconds.
    pub fn pot_sample_period_us(&self) -> u64 {
        1_000_000 / u64::from(self.pot_sample_hz.max(1))
    }
}
