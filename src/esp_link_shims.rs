//! `embassy-time` driver symbols for the ESP-IDF build.
//!
//! The UI task bounds its wait on the button queue with
//! `embassy_time::with_timeout`, which needs a clock and a wake scheduler.
//! Both are provided here on top of esp_timer and std threads. Critical
//! sections come from esp-idf-hal's `critical-section` implementation.
//! Host builds use embassy-time's own `std` driver instead.

#[cfg(target_os = "espidf")]
use core::time::Duration;

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Wake `waker` once the clock reaches `at`.
///
/// Only the UI's refresh timeout lands here, at most once per refresh
/// period, so a short-lived sleeper thread per deadline is enough.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time passes a pointer to a live `Waker` for the
    // duration of this call; it is cloned before returning.
    let waker = unsafe { (&*(waker as *const core::task::Waker)).clone() };
    let spawned = std::thread::Builder::new()
        .name("time-wake".into())
        .stack_size(2048)
        .spawn(move || {
            let now = _embassy_time_now();
            if at > now {
                std::thread::sleep(Duration::from_micros(at - now));
            }
            waker.wake();
        });
    if let Err(e) = spawned {
        log::error!("time: wake thread spawn failed: {}", e);
    }
}
