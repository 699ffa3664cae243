//! Task bodies.
//!
//! Each task is a step function over the shared [`DeviceContext`] plus a
//! thin `run_*` loop that blocks between steps. `main` spawns the loops on
//! pinned threads; tests drive the step functions directly.
//!
//! Producers never block on the command queue except the UI: a dropped
//! sensor sample is replaced by the next poll, a dropped user command is
//! not.

use embassy_time::{Duration, with_timeout};
use futures_lite::future::block_on;
use log::{debug, info, warn};

use crate::adapters::time::Clock;
use crate::adapters::wifi::Backoff;
use crate::app::controller::Controller;
use crate::app::messages::{ButtonEvent, ControllerMsg};
use crate::app::ports::{AdcPort, Display, LevelIndicator, NetworkPort, OutputChannel, SampleTimer, WeatherPort};
use crate::app::ui::{HomeInfo, Ui};
use crate::channels::DeviceContext;
use crate::sensors::{SharedAdc, photoresistor, potentiometer, temperature};

fn post_or_warn(ctx: &DeviceContext, msg: ControllerMsg) {
    if !ctx.post(msg) {
        warn!("tasks: command queue full, dropped {:?}", msg);
    }
}

// ── Controller ────────────────────────────────────────────────

pub fn run_controller<O, T, L>(mut controller: Controller<'_, O, T, L>, ctx: &'static DeviceContext) -> !
where
    O: OutputChannel,
    T: SampleTimer,
    L: LevelIndicator,
{
    controller.run(|| block_on(ctx.commands.receive()))
}

// ── UI ────────────────────────────────────────────────────────

/// Menu state machine plus the display it draws on and the latest
/// readings shown on the home screen.
pub struct UiTask<D: Display> {
    ui: Ui,
    display: D,
    home: HomeInfo,
}

impl<D: Display> UiTask<D> {
    pub fn new(display: D) -> Self {
        Self { ui: Ui::new(), display, home: HomeInfo::default() }
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn home(&self) -> &HomeInfo {
        &self.home
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Apply one press, forward any resulting command, redraw.
    pub async fn on_button(&mut self, button: ButtonEvent, ctx: &DeviceContext) {
        if let Some(msg) = self.ui.handle(button, &ctx.status) {
            debug!("ui: sending {:?}", msg);
            ctx.commands.send(msg).await;
        }
        self.render();
    }

    /// Pick up new temperatures and the clock, redraw.
    pub fn refresh(&mut self, ctx: &DeviceContext, clock: Option<(u8, u8)>) {
        if let Some(t) = ctx.inside_temp.try_take() {
            self.home.inside = Some(t);
        }
        if let Some(t) = ctx.outside_temp.try_take() {
            self.home.outside = Some(t);
        }
        self.home.clock = clock;
        self.render();
    }

    pub fn render(&mut self) {
        self.ui.render(&mut self.display, &self.home);
    }
}

pub fn run_ui<D: Display>(mut task: UiTask<D>, ctx: &'static DeviceContext, clock: &Clock, refresh_ms: u32) -> ! {
    info!("ui: running");
    task.refresh(ctx, clock.local_hh_mm());
    let period = Duration::from_millis(u64::from(refresh_ms));
    loop {
        let button = if task.ui().is_home() {
            match block_on(with_timeout(period, ctx.buttons.receive())) {
                Ok(button) => button,
                Err(_) => {
                    task.refresh(ctx, clock.local_hh_mm());
                    continue;
                }
            }
        } else {
            block_on(ctx.buttons.receive())
        };
        block_on(task.on_button(button, ctx));
    }
}

// ── Potentiometer ─────────────────────────────────────────────

/// Sample the knob once if a session is open. Returns whether a reading
/// was posted.
pub fn pot_step<A: AdcPort>(adc: &SharedAdc<A>, ctx: &DeviceContext) -> bool {
    if !ctx.status.is_adjusting() {
        return false;
    }
    match potentiometer::read_percent(adc) {
        Ok(pct) => {
            post_or_warn(ctx, ControllerMsg::Potentiometer(pct));
            true
        }
        Err(e) => {
            warn!("pot: {}", e);
            false
        }
    }
}

pub fn run_pot<A: AdcPort>(adc: &SharedAdc<A>, ctx: &'static DeviceContext) -> ! {
    info!("pot: waiting for sample ticks");
    loop {
        block_on(ctx.pot_tick.wait());
        pot_step(adc, ctx);
    }
}

// ── Light + inside temperature ────────────────────────────────

/// Polls the photoresistor and temperature sensor.
#[derive(Debug, Default)]
pub struct AmbientPoller {
    last_inside: Option<i32>,
}

impl AmbientPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// One poll: post both percentages, publish the inside temperature
    /// for the home screen when it changes.
    pub fn step<A: AdcPort>(&mut self, adc: &SharedAdc<A>, ctx: &DeviceContext) {
        match photoresistor::read_darkness(adc) {
            Ok(pct) => post_or_warn(ctx, ControllerMsg::Photoresistor(pct)),
            Err(e) => warn!("ambient: photoresistor: {}", e),
        }
        match temperature::read(adc) {
            Ok(reading) => {
                post_or_warn(ctx, ControllerMsg::TempSensor(reading.percent));
                if self.last_inside != Some(reading.celsius) {
                    debug!("ambient: inside {} C ({} mV)", reading.celsius, reading.millivolts);
                    ctx.inside_temp.signal(reading.celsius);
                    self.last_inside = Some(reading.celsius);
                }
            }
            Err(e) => warn!("ambient: temperature: {}", e),
        }
    }
}

pub fn run_ambient<A: AdcPort>(adc: &SharedAdc<A>, ctx: &'static DeviceContext, poll_ms: u32) -> ! {
    info!("ambient: polling every {} ms", poll_ms);
    let mut poller = AmbientPoller::new();
    loop {
        poller.step(adc, ctx);
        std::thread::sleep(std::time::Duration::from_millis(u64::from(poll_ms)));
    }
}

// ── Outside temperature ───────────────────────────────────────

/// One fetch. On failure the previous value stays on screen.
pub fn weather_step<W: WeatherPort>(source: &mut W, ctx: &DeviceContext) {
    match source.outside_celsius() {
        Ok(t) => {
            debug!("weather: outside {} C", t);
            ctx.outside_temp.signal(t);
        }
        Err(e) => warn!("weather: {}", e),
    }
}

pub fn run_weather<W: WeatherPort>(mut source: W, ctx: &'static DeviceContext, interval_secs: u32) -> ! {
    info!("weather: polling every {} s", interval_secs);
    loop {
        weather_step(&mut source, ctx);
        std::thread::sleep(std::time::Duration::from_secs(u64::from(interval_secs)));
    }
}

// ── Network link ──────────────────────────────────────────────

/// Seconds between link checks while connected.
pub const LINK_CHECK_SECS: u32 = 10;

/// One supervision pass: reconnect if the link is down, then make sure
/// the clock sync is running. Returns the seconds to wait before the next
/// pass.
pub fn network_step<N: NetworkPort>(link: &mut N, backoff: &mut Backoff) -> u32 {
    if !link.is_connected() {
        if let Err(e) = link.connect() {
            let delay = backoff.next_delay();
            warn!("network: {}, retry in {} s", e, delay);
            return delay;
        }
        backoff.reset();
    }
    if let Err(e) = link.sync_clock() {
        warn!("network: {}", e);
    }
    LINK_CHECK_SECS
}

pub fn run_network<N: NetworkPort>(mut link: N) -> ! {
    info!("network: supervising link");
    let mut backoff = Backoff::new();
    loop {
        let secs = network_step(&mut link, &mut backoff);
        std::thread::sleep(std::time::Duration::from_secs(u64::from(secs)));
    }
}
