//! Two-button input front end (Select, Down).
//!
//! ## Hardware
//!
//! Active-low momentary switches with internal pull-ups, one falling-edge
//! interrupt each.
//!
//! ## Interrupt path
//!
//! ```text
//!   GPIO ISR ──▶ timestamp + Debouncer::accept ──▶ task notification bit
//!                      (atomics only)                      │
//!   input task ◀───────────────────────────────────────────┘
//!       └──▶ DeviceContext::enqueue_button ──▶ buttons (depth 1) ──▶ UI
//! ```
//!
//! The ISR never touches the embassy channel: queue wakers take locks that
//! are not interrupt-safe. It only filters and raises a notification bit;
//! the input task forwards the press into the depth-1 queue, dropping it if
//! the UI has not consumed the previous one.
//!
//! On host builds, presses come from the console (`s` = Select,
//! `d` = Down) and go through the same debounce + enqueue path. The same
//! console also sets simulated sensor voltages.

use log::info;

use crate::app::messages::ButtonEvent;
use crate::app::ports::AdcChannel;
#[cfg(not(target_os = "espidf"))]
use crate::channels::DeviceContext;
use crate::channels::EdgeOutcome;

fn log_outcome(button: ButtonEvent, outcome: EdgeOutcome) {
    match outcome {
        EdgeOutcome::Accepted => log::debug!("button: {:?} queued", button),
        EdgeOutcome::Bounced => log::trace!("button: {:?} bounced", button),
        EdgeOutcome::Dropped => info!("button: {:?} dropped, UI busy", button),
    }
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod device {
    use core::num::NonZeroU32;

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::gpio::{AnyIOPin, Input, InterruptType, PinDriver, Pull};
    use esp_idf_hal::task::notification::Notification;
    use esp_idf_svc::sys::EspError;

    use super::{info, log_outcome};
    use crate::app::messages::ButtonEvent;
    use crate::channels::DeviceContext;

    const SELECT_BIT: NonZeroU32 = NonZeroU32::MIN;
    const DOWN_BIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(1);

    fn isr_now_ms() -> u32 {
        // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1_000) as u32
    }

    pub struct ButtonInputs {
        select: PinDriver<'static, AnyIOPin, Input>,
        down: PinDriver<'static, AnyIOPin, Input>,
        notification: Notification,
    }

    impl ButtonInputs {
        /// Configure both pins and install their edge handlers.
        ///
        /// Notifications target the calling task, so call this on the
        /// thread that will go on to [`run`](Self::run).
        pub fn new(
            select: AnyIOPin,
            down: AnyIOPin,
            ctx: &'static DeviceContext,
        ) -> Result<Self, EspError> {
            let notification = Notification::new();
            let mut select = PinDriver::input(select)?;
            let mut down = PinDriver::input(down)?;

            for (pin, button, bit) in [
                (&mut select, ButtonEvent::Select, SELECT_BIT),
                (&mut down, ButtonEvent::Down, DOWN_BIT),
            ] {
                pin.set_pull(Pull::Up)?;
                pin.set_interrupt_type(InterruptType::NegEdge)?;
                let notifier = notification.notifier();
                // SAFETY: the handler only reads the RTC counter, updates
                // debounce atomics and raises a notification; all three
                // are interrupt-safe and allocation-free.
                unsafe {
                    pin.subscribe(move || {
                        if ctx.debouncer.accept(button, isr_now_ms()) {
                            notifier.notify_and_yield(bit);
                        }
                    })?;
                }
                pin.enable_interrupt()?;
            }

            info!("button: edge interrupts armed (select, down)");
            Ok(Self { select, down, notification })
        }

        /// Forward debounced presses into the UI queue. Never returns.
        pub fn run(mut self, ctx: &'static DeviceContext) -> ! {
            loop {
                let Some(bits) = self.notification.wait(BLOCK) else {
                    continue;
                };
                for (button, bit) in [(ButtonEvent::Select, SELECT_BIT), (ButtonEvent::Down, DOWN_BIT)] {
                    if bits.get() & bit.get() != 0 {
                        log_outcome(button, ctx.enqueue_button(button));
                    }
                }
                // The driver disarms a pin after each interrupt.
                for pin in [&mut self.select, &mut self.down] {
                    if let Err(e) = pin.enable_interrupt() {
                        log::error!("button: re-arm failed: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub use device::ButtonInputs;

// ── Simulation ────────────────────────────────────────────────

/// One line of host console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Press(ButtonEvent),
    /// Force a simulated ADC channel to a level, e.g. `temp 900`.
    Millivolts(AdcChannel, i32),
    /// Set the simulated outside temperature, e.g. `outside -4`.
    Outside(i32),
}

/// Parse one console line.
pub fn parse_console(line: &str) -> Option<ConsoleInput> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let input = match head {
        "s" | "select" => ConsoleInput::Press(ButtonEvent::Select),
        "d" | "down" => ConsoleInput::Press(ButtonEvent::Down),
        "outside" => ConsoleInput::Outside(words.next()?.parse().ok()?),
        _ => {
            let channel = match head {
                "pot" => AdcChannel::Potentiometer,
                "temp" => AdcChannel::Temperature,
                "light" => AdcChannel::Photoresistor,
                _ => return None,
            };
            ConsoleInput::Millivolts(channel, words.next()?.parse().ok()?)
        }
    };
    words.next().is_none().then_some(input)
}

/// Feed console lines into the input pipeline until stdin closes.
#[cfg(not(target_os = "espidf"))]
pub fn run_console_input(ctx: &'static DeviceContext, clock: &crate::adapters::time::Clock) {
    use std::io::BufRead;

    info!("button(sim): 's' select, 'd' down, 'pot|temp|light <mV>' to set a sensor, 'outside <C>'");
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        match parse_console(&line) {
            Some(ConsoleInput::Press(button)) => {
                log_outcome(button, ctx.on_button_edge(button, clock.uptime_ms()));
            }
            Some(ConsoleInput::Millivolts(channel, mv)) => {
                crate::sensors::sim_set_millivolts(channel, mv);
                info!("button(sim): {:?} = {} mV", channel, mv);
            }
            Some(ConsoleInput::Outside(celsius)) => {
                crate::adapters::weather::sim_set_outside(celsius);
                info!("button(sim): outside = {} C", celsius);
            }
            None => log::warn!("button(sim): unknown input {:?}", line.trim()),
        }
    }
    info!("button(sim): console closed");
}
