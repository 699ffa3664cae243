//! Outside-temperature client for the open-meteo current-weather API.
//!
//! - **`target_os = "espidf"`**: one GET through `EspHttpConnection`
//!   wrapped in `embedded_svc`'s blocking client. Non-2xx statuses are
//!   rejected, the body is parsed with `serde_json`.
//! - **`not(target_os = "espidf")`**: returns the value injected with
//!   [`sim_set_outside`] (console `outside <C>`), unavailable until set.
//!
//! Every failure maps to a [`WeatherError`]; the caller treats it as
//! "unavailable" and keeps the last value on screen.

use serde::Deserialize;

use crate::app::ports::WeatherPort;
use crate::config::WeatherConfig;
use crate::error::WeatherError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, Ordering};

#[derive(Debug, Deserialize)]
struct Forecast {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

pub struct OpenMeteoClient {
    config: WeatherConfig,
}

impl OpenMeteoClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    pub fn url(&self) -> &str {
        self.config.url.as_str()
    }

    #[cfg(target_os = "espidf")]
    fn fetch(&self) -> Result<Vec<u8>, WeatherError> {
        use core::time::Duration;

        use embedded_svc::http::Status;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            timeout: Some(Duration::from_secs(u64::from(self.config.timeout_secs.max(1)))),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&conf).map_err(|_| WeatherError::Connect)?;
        let mut client = Client::wrap(connection);
        let headers = [("accept", "application/json"), ("user-agent", USER_AGENT)];
        let request = client
            .request(embedded_svc::http::Method::Get, self.url(), &headers)
            .map_err(|_| WeatherError::Connect)?;
        let mut response = request.submit().map_err(|_| WeatherError::Connect)?;
        check_status(response.status())?;

        let mut body = Vec::with_capacity(512);
        let mut chunk = [0u8; 256];
        loop {
            let n = response.read(&mut chunk).map_err(|_| WeatherError::Io)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        Ok(body)
    }
}

#[cfg(target_os = "espidf")]
const USER_AGENT: &str = concat!("homectl/", env!("CARGO_PKG_VERSION"), " esp32");

impl WeatherPort for OpenMeteoClient {
    #[cfg(target_os = "espidf")]
    fn outside_celsius(&mut self) -> Result<i32, WeatherError> {
        let body = self.fetch()?;
        parse_body(&body)
    }

    #[cfg(not(target_os = "espidf"))]
    fn outside_celsius(&mut self) -> Result<i32, WeatherError> {
        match SIM_OUTSIDE.load(Ordering::Relaxed) {
            SIM_UNSET => Err(WeatherError::Connect),
            celsius => Ok(celsius),
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
const SIM_UNSET: i32 = i32::MIN;

#[cfg(not(target_os = "espidf"))]
static SIM_OUTSIDE: AtomicI32 = AtomicI32::new(SIM_UNSET);

/// Inject the outside temperature the simulated client reports.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_outside(celsius: i32) {
    SIM_OUTSIDE.store(celsius, Ordering::Relaxed);
}

// ── Response handling ─────────────────────────────────────────

/// Accept 2xx, reject everything else with its status.
pub fn check_status(status: u16) -> Result<(), WeatherError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(WeatherError::Http(status))
    }
}

/// Extract the rounded current temperature from the JSON body.
pub fn parse_body(body: &[u8]) -> Result<i32, WeatherError> {
    let forecast: Forecast = serde_json::from_slice(body).map_err(|_| WeatherError::Parse)?;
    let t = forecast.current_weather.temperature;
    if !t.is_finite() {
        return Err(WeatherError::Parse);
    }
    Ok(t.round() as i32)
}
