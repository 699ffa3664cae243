//! Potentiometer sample timer.
//!
//! A periodic timer that raises the `pot_tick` signal while an adjustment
//! session is open. It is the only cancellable background activity: the
//! Controller starts it when a session opens and stops it when the session
//! closes, so no samples are taken while nothing is being adjusted.
//!
//! On ESP-IDF the callback runs in the esp_timer task (not ISR), so
//! signalling the embassy `Signal` is safe there. On simulation targets a
//! thread sleeps for one period between ticks.

use crate::app::ports::SampleTimer;
use crate::channels::Latest;
use crate::error::TimerError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn pot_tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static Latest<()>` passed to esp_timer_create.
    let tick = unsafe { &*(arg as *const Latest<()>) };
    tick.signal(());
}

#[cfg(target_os = "espidf")]
pub struct PotSampleTimer {
    handle: esp_timer_handle_t,
    period_us: u64,
    running: bool,
}

// SAFETY: the esp_timer handle is an opaque token; esp_timer_* calls are
// thread-safe and the timer is only driven by the Controller thread.
#[cfg(target_os = "espidf")]
unsafe impl Send for PotSampleTimer {}

#[cfg(target_os = "espidf")]
impl PotSampleTimer {
    pub fn new(period_us: u64, tick: &'static Latest<()>) -> Result<Self, TimerError> {
        let args = esp_timer_create_args_t {
            callback: Some(pot_tick_cb),
            arg: core::ptr::from_ref(tick).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"pot_sample".as_ptr(),
            skip_unhandled_events: true,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: args outlive the call; esp_timer copies them.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: pot timer create failed (rc={})", ret);
            return Err(TimerError::Driver(ret));
        }
        log::info!("hw_timer: pot timer created ({} us period)", period_us);
        Ok(Self { handle, period_us, running: false })
    }
}

#[cfg(target_os = "espidf")]
impl SampleTimer for PotSampleTimer {
    fn start(&mut self) -> Result<(), TimerError> {
        if self.handle.is_null() {
            return Err(TimerError::NotCreated);
        }
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        // SAFETY: handle was created in `new` and is never deleted.
        let ret = unsafe { esp_timer_start_periodic(self.handle, self.period_us) };
        if ret != ESP_OK as i32 {
            return Err(TimerError::Driver(ret));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if !self.running {
            return Ok(());
        }
        // SAFETY: handle is valid and currently armed.
        let ret = unsafe { esp_timer_stop(self.handle) };
        self.running = false;
        if ret != ESP_OK as i32 {
            return Err(TimerError::Driver(ret));
        }
        Ok(())
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
use std::sync::Arc;
#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicBool, Ordering};

/// Thread-backed stand-in for the esp_timer.
#[cfg(not(target_os = "espidf"))]
pub struct PotSampleTimer {
    period: std::time::Duration,
    tick: &'static Latest<()>,
    /// Run flag of the current ticker thread, if one is running.
    active: Option<Arc<AtomicBool>>,
}

#[cfg(not(target_os = "espidf"))]
impl PotSampleTimer {
    pub fn new(period_us: u64, tick: &'static Latest<()>) -> Result<Self, TimerError> {
        log::info!("hw_timer(sim): pot timer created ({} us period)", period_us);
        Ok(Self {
            period: std::time::Duration::from_micros(period_us),
            tick,
            active: None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(not(target_os = "espidf"))]
impl SampleTimer for PotSampleTimer {
    fn start(&mut self) -> Result<(), TimerError> {
        if self.active.is_some() {
            return Err(TimerError::AlreadyRunning);
        }
        let flag = Arc::new(AtomicBool::new(true));
        let run = Arc::clone(&flag);
        let (period, tick) = (self.period, self.tick);
        std::thread::Builder::new()
            .name("pot-timer".into())
            .spawn(move || {
                while run.load(Ordering::Acquire) {
                    std::thread::sleep(period);
                    if run.load(Ordering::Acquire) {
                        tick.signal(());
                    }
                }
            })
            .map_err(|_| TimerError::Driver(-1))?;
        self.active = Some(flag);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if let Some(flag) = self.active.take() {
            flag.store(false, Ordering::Release);
        }
        Ok(())
    }
}
