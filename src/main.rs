//! HomeCtl firmware entry point.
//!
//! Builds every collaborator explicitly, hands each task its share and
//! spawns the tasks on pinned threads.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  input (ISR / console) ──▶ buttons ──▶ ui ──┐                  │
//! │                                              ▼                 │
//! │  ambient ──────────────────────────────▶ commands ──▶ controller│
//! │  pot ◀── pot_tick ◀── sample timer ──────────▲          │      │
//! │                                                         ▼      │
//! │  weather ──▶ outside_temp ──▶ ui      fan · vent · lamp · bar  │
//! │     ▲                                                          │
//! │  network (WiFi STA + SNTP, protocol core)                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result};
use log::{error, info, warn};

use homectl::adapters::log_display::LogDisplay;
use homectl::adapters::time::Clock;
use homectl::adapters::weather::OpenMeteoClient;
use homectl::adapters::wifi::WifiLink;
use homectl::app::controller::Controller;
use homectl::channels::DEVICE;
use homectl::config::SystemConfig;
use homectl::drivers::hw_init;
use homectl::drivers::hw_timer::PotSampleTimer;
use homectl::drivers::level_indicator::ShiftRegisterBar;
use homectl::drivers::pwm_output::PwmOutput;
use homectl::drivers::task_pin::{self, spawn_on_core};
use homectl::error::Error;
use homectl::sensors::{OnboardAdc, SharedAdc};
use homectl::tasks::{self, UiTask};

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init: {e}"))
}

/// Host runs may override the defaults with a JSON file named by
/// `HOMECTL_CONFIG`. The device always boots with defaults.
fn load_config() -> SystemConfig {
    #[cfg(not(target_os = "espidf"))]
    if let Ok(path) = std::env::var("HOMECTL_CONFIG") {
        match std::fs::read(&path).map_err(|_| Error::Config("unreadable file")).and_then(|b| SystemConfig::from_json(&b)) {
            Ok(config) => {
                info!("config: loaded {}", path);
                return config;
            }
            Err(e) => warn!("config: {} ({}), using defaults", e, path),
        }
    }

    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        warn!("config: defaults rejected: {}", e);
    }
    config
}

fn park_forever() -> ! {
    loop {
        std::thread::park();
    }
}

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;
    info!("HomeCtl v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config();
    DEVICE.debouncer.set_window(config.debounce_ms);

    // SAFETY: no thread has been spawned yet.
    #[cfg(target_os = "espidf")]
    unsafe {
        homectl::adapters::time::set_timezone(&config.network.timezone);
    }

    if let Err(e) = hw_init::init_peripherals() {
        // Nothing useful can run without the outputs.
        error!("hw_init failed: {}, halting", e);
        park_forever();
    }

    // ── 2. Collaborators ──────────────────────────────────────
    let adc: &'static SharedAdc<OnboardAdc> = Box::leak(Box::new(SharedAdc::new(OnboardAdc)));
    let timer = PotSampleTimer::new(config.pot_sample_period_us(), &DEVICE.pot_tick)
        .map_err(Error::from)
        .context("pot sample timer")?;

    #[cfg(target_os = "espidf")]
    let (indicator, select, down, modem) = {
        use esp_idf_hal::gpio::{IOPin, PinDriver};
        use esp_idf_hal::peripherals::Peripherals;
        use homectl::pins;

        // The typed pin fields picked below must match the board map.
        const _: () = assert!(
            pins::INDICATOR_DATA_GPIO == 25
                && pins::INDICATOR_CLOCK_GPIO == 26
                && pins::INDICATOR_LATCH_GPIO == 27
                && pins::BUTTON_SELECT_GPIO == 19
                && pins::BUTTON_DOWN_GPIO == 21
        );

        let p = Peripherals::take().context("peripherals")?;
        let bar = ShiftRegisterBar::new(
            PinDriver::output(p.pins.gpio25).context("indicator data pin")?,
            PinDriver::output(p.pins.gpio26).context("indicator clock pin")?,
            PinDriver::output(p.pins.gpio27).context("indicator latch pin")?,
        );
        (bar, p.pins.gpio19.downgrade(), p.pins.gpio21.downgrade(), p.modem)
    };

    #[cfg(not(target_os = "espidf"))]
    let indicator = {
        use homectl::drivers::level_indicator::SimPin;
        ShiftRegisterBar::new(SimPin, SimPin, SimPin)
    };

    let controller = Controller::new(
        &config,
        [PwmOutput::fan(), PwmOutput::vent(), PwmOutput::lamp()],
        timer,
        indicator,
        &DEVICE.status,
    );

    // ── 3. Tasks ──────────────────────────────────────────────
    spawn_on_core(task_pin::CONTROLLER, move || tasks::run_controller(controller, &DEVICE))
        .context("spawn controller")?;

    let refresh_ms = config.ui_refresh_ms;
    spawn_on_core(task_pin::UI, move || {
        let clock = Clock::new();
        tasks::run_ui(UiTask::new(LogDisplay::new()), &DEVICE, &clock, refresh_ms)
    })
    .context("spawn ui")?;

    spawn_on_core(task_pin::POT, move || tasks::run_pot(adc, &DEVICE)).context("spawn pot")?;

    let poll_ms = config.poll_interval_ms;
    spawn_on_core(task_pin::AMBIENT, move || tasks::run_ambient(adc, &DEVICE, poll_ms))
        .context("spawn ambient")?;

    // Network first, so the link is coming up before the first fetch.
    #[cfg(target_os = "espidf")]
    let link = {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;

        let sysloop = EspSystemEventLoop::take().context("system event loop")?;
        let nvs = EspDefaultNvsPartition::take().context("nvs partition")?;
        WifiLink::new(modem, sysloop, nvs, &config.network)
    };
    #[cfg(not(target_os = "espidf"))]
    let link = WifiLink::new(&config.network);

    match link {
        Ok(link) => {
            spawn_on_core(task_pin::NETWORK, move || tasks::run_network(link)).context("spawn network")?;
        }
        Err(e) => warn!("network: {}, running offline", e),
    }

    let weather = OpenMeteoClient::new(config.weather.clone());
    let weather_secs = config.weather_interval_secs;
    spawn_on_core(task_pin::WEATHER, move || tasks::run_weather(weather, &DEVICE, weather_secs))
        .context("spawn weather")?;

    // ── 4. Input ──────────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        use homectl::drivers::button::ButtonInputs;

        spawn_on_core(task_pin::INPUT, move || match ButtonInputs::new(select, down, &DEVICE) {
            Ok(inputs) => inputs.run(&DEVICE),
            Err(e) => error!("button: init failed: {}", e),
        })
        .context("spawn input")?;
        info!("System ready.");
    }

    #[cfg(not(target_os = "espidf"))]
    {
        info!("System ready.");
        homectl::drivers::button::run_console_input(&DEVICE, &Clock::new());
        warn!("no more console input; tasks keep running");
    }

    park_forever()
}
