//! Adapters: concrete implementations of the port traits that are not
//! peripheral drivers.
//!
//! | Adapter       | Implements   | Connects to                     |
//! |---------------|--------------|---------------------------------|
//! | `log_display` | Display      | Serial log output               |
//! | `time`        | (clock)      | esp_timer, gettimeofday         |
//! | `weather`     | WeatherPort  | open-meteo via EspHttpConnection |
//! | `wifi`        | NetworkPort  | WiFi station + SNTP             |

pub mod log_display;
pub mod time;
pub mod weather;
pub mod wifi;
