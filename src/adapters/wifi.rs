//! WiFi station adapter and wall-clock sync.
//!
//! Implements [`NetworkPort`]: the link the weather client fetches over
//! and the SNTP session that sets the clock shown on the home screen.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` wrapped in `BlockingWifi`;
//!   `EspSntp` with the default pool servers once the link is up.
//! - **all other targets**: the host OS owns networking and the clock, so
//!   the link always reports up.
//!
//! ## Reconnection policy
//!
//! [`Backoff`] doubles the retry delay after each failed attempt
//! (2 s → 4 s → 8 s … capped at 60 s) and resets once the link is up.

use log::info;

use crate::app::ports::NetworkPort;
use crate::config::NetworkConfig;
use crate::error::NetworkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    sntp::EspSntp,
    sys::EspError,
    wifi::{BlockingWifi, EspWifi},
};

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), NetworkError> {
    if ssid.is_empty() {
        return Err(NetworkError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(NetworkError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), NetworkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(NetworkError::InvalidPassword);
    }
    Ok(())
}

/// Check SSID and password before handing them to the driver.
pub fn validate_credentials(config: &NetworkConfig) -> Result<(), NetworkError> {
    validate_ssid(&config.ssid)?;
    validate_password(&config.password)
}

// ───────────────────────────────────────────────────────────────
// Retry backoff
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Backoff {
    next_secs: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub fn new() -> Self {
        Self { next_secs: INITIAL_BACKOFF_SECS }
    }

    /// Delay before the next attempt; doubles the one after.
    pub fn next_delay(&mut self) -> u32 {
        let delay = self.next_secs;
        self.next_secs = (delay * 2).min(MAX_BACKOFF_SECS);
        delay
    }

    pub fn reset(&mut self) {
        self.next_secs = INITIAL_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi link
// ───────────────────────────────────────────────────────────────

pub struct WifiLink {
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    sntp: Option<EspSntp<'static>>,
}

#[cfg(target_os = "espidf")]
fn driver_error(e: EspError) -> NetworkError {
    NetworkError::Driver(e.code())
}

#[cfg(target_os = "espidf")]
impl WifiLink {
    /// Configure and start the station interface. Does not associate yet.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &NetworkConfig,
    ) -> Result<Self, NetworkError> {
        use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        validate_credentials(config)?;

        let driver = EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(driver_error)?;
        let mut wifi = BlockingWifi::wrap(driver, sysloop).map_err(driver_error)?;

        let auth_method = if config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.ssid.as_str().try_into().map_err(|_| NetworkError::InvalidSsid)?,
            password: config.password.as_str().try_into().map_err(|_| NetworkError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        }))
        .map_err(driver_error)?;
        wifi.start().map_err(driver_error)?;

        info!("wifi: station started for '{}'", config.ssid);
        Ok(Self { wifi, sntp: None })
    }
}

#[cfg(target_os = "espidf")]
impl NetworkPort for WifiLink {
    fn connect(&mut self) -> Result<(), NetworkError> {
        let attempt = self.wifi.connect().and_then(|()| self.wifi.wait_netif_up());
        if attempt.is_err() {
            let _ = self.wifi.disconnect();
            return Err(NetworkError::ConnectionFailed);
        }
        match self.wifi.wifi().sta_netif().get_ip_info() {
            Ok(ip) => info!("wifi: connected, ip {}", ip.ip),
            Err(_) => info!("wifi: connected"),
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn sync_clock(&mut self) -> Result<(), NetworkError> {
        if self.sntp.is_none() {
            let sntp = EspSntp::new_default().map_err(|e| NetworkError::Sntp(e.code()))?;
            info!("sntp: started");
            self.sntp = Some(sntp);
        }
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    pub fn new(config: &NetworkConfig) -> Result<Self, NetworkError> {
        info!("wifi(sim): using host network, SSID '{}' not joined", config.ssid);
        Ok(Self {})
    }
}

#[cfg(not(target_os = "espidf"))]
impl NetworkPort for WifiLink {
    fn connect(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn sync_clock(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }
}
