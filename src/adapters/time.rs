//! Clock adapter.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`; wall
//!   clock from `gettimeofday` + `localtime_r`.
//! - **`not(target_os = "espidf")`**: uptime from `std::time::Instant`;
//!   wall clock from `SystemTime`, reported in UTC.
//!
//! The wall clock is treated as unset until it reads later than
//! 2020-01-01, i.e. until SNTP (or the host OS) has provided real time.
//! On the device, local time follows the TZ string applied with
//! [`set_timezone`].

/// 2020-01-01T00:00:00Z.
const EPOCH_2020: i64 = 1_577_836_800;

pub struct Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, truncated to `u32` (wraps after ~49 days).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    /// Milliseconds since start, truncated to `u32` (wraps after ~49 days).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    /// Local `(hour, minute)`. `None` if the wall clock is not set.
    #[cfg(target_os = "espidf")]
    pub fn local_hh_mm(&self) -> Option<(u8, u8)> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval { tv_sec: 0, tv_usec: 0 };
        // SAFETY: tv is a valid out-pointer; timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        if i64::from(tv.tv_sec) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        // SAFETY: tm is plain old data; zeroed is a valid value.
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        // SAFETY: both pointers are valid for the duration of the call.
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        hh_mm(tm.tm_hour, tm.tm_min)
    }

    /// UTC `(hour, minute)`. `None` if the system clock predates 2020.
    #[cfg(not(target_os = "espidf"))]
    pub fn local_hh_mm(&self) -> Option<(u8, u8)> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs() as i64;
        wall_hh_mm(secs)
    }
}

/// Apply a POSIX TZ string (e.g. `"EST5EDT,M3.2.0/2,M11.1.0/2"`).
///
/// # Safety
///
/// Writes the process environment: call before any other thread exists.
#[cfg(target_os = "espidf")]
pub unsafe fn set_timezone(tz: &str) {
    // SAFETY: caller guarantees no concurrent environment access.
    unsafe { std::env::set_var("TZ", tz) };
    // SAFETY: tzset only re-reads TZ into libc's globals.
    unsafe { esp_idf_svc::sys::tzset() };
}

/// Hour and minute of a Unix timestamp (UTC), if the clock looks set.
pub fn wall_hh_mm(unix_secs: i64) -> Option<(u8, u8)> {
    if unix_secs < EPOCH_2020 {
        return None;
    }
    let of_day = unix_secs.rem_euclid(86_400);
    hh_mm((of_day / 3600) as i32, ((of_day % 3600) / 60) as i32)
}

fn hh_mm(hour: i32, minute: i32) -> Option<(u8, u8)> {
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return None;
    }
    Some((hour as u8, minute as u8))
}
