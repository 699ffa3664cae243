//! Core-pinned thread spawning for the ESP32 dual-core.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread` creates a FreeRTOS
//! task pinned to a specific CPU core with explicit priority and stack
//! size. On non-ESP targets, falls back to a plain named thread.
//!
//! `esp_pthread_set_cfg()` sets thread-local configuration for the *next*
//! `pthread_create()` from the calling thread, so the config→spawn pair
//! must not be interleaved with other thread creation on that thread.
//!
//! | Task        | Core | Prio | Blocks on                    |
//! |-------------|------|------|------------------------------|
//! | pot         | App  | 4    | `pot_tick` signal            |
//! | ambient     | App  | 3    | fixed 1 s delay              |
//! | controller  | App  | 2    | command queue                |
//! | ui          | App  | 1    | button queue (1 s on Home)   |
//! | network     | Pro  | 2    | retry backoff / 10 s check   |
//! | weather     | Pro  | 1    | fixed 60 s delay             |
//! | input       | App  | 5    | task notification (device)   |

use std::io;
use std::thread::JoinHandle;

/// CPU core identifiers for the ESP32 Xtensa LX6 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): Wi-Fi and lwIP.
    Pro = 0,
    /// Core 1 (APP_CPU): control and UI.
    App = 1,
}

/// Placement of one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// NUL-terminated, e.g. `"ui\0"`.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

pub const CONTROLLER: TaskSpec = TaskSpec { name: "controller\0", core: Core::App, priority: 2, stack_kb: 4 };
pub const UI: TaskSpec = TaskSpec { name: "ui\0", core: Core::App, priority: 1, stack_kb: 4 };
pub const POT: TaskSpec = TaskSpec { name: "pot\0", core: Core::App, priority: 4, stack_kb: 4 };
pub const AMBIENT: TaskSpec = TaskSpec { name: "ambient\0", core: Core::App, priority: 3, stack_kb: 4 };
/// WiFi link supervision and clock sync, next to the WiFi stack.
pub const NETWORK: TaskSpec = TaskSpec { name: "network\0", core: Core::Pro, priority: 2, stack_kb: 6 };
pub const WEATHER: TaskSpec = TaskSpec { name: "weather\0", core: Core::Pro, priority: 1, stack_kb: 8 };
/// Button forwarder; above every consumer so presses are queued promptly.
pub const INPUT: TaskSpec = TaskSpec { name: "input\0", core: Core::App, priority: 5, stack_kb: 3 };

/// Spawn a thread placed according to `spec`.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config struct is fully initialised by
    // esp_create_default_pthread_config and `name` is NUL-terminated and
    // 'static, so the pointer outlives the spawned task.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr().cast();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    let display_name = spec.name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new().name(display_name.into()).spawn(f)
}

/// Simulation fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(spec: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    let display_name = spec.name.trim_end_matches('\0');
    log::info!("Spawning '{}' (sim, no core pinning)", display_name);

    // Host formatting and std I/O need more headroom than the device tasks.
    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size((spec.stack_kb * 1024).max(256 * 1024))
        .spawn(f)
}
