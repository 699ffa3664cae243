//! Device context: every inter-task endpoint in one explicitly built struct.
//!
//! Uses `embassy-sync` bounded channels and signals over a
//! critical-section mutex so the blocking task threads can share them
//! without heap allocation.
//!
//! ```text
//!  button edge ──▶ Debouncer ──▶ buttons (depth 1) ──▶ UI task
//!                                                        │ ControllerMsg
//!  ambient task ───────────────────────────▶ commands ◀──┘
//!  pot task ────────────────────────────────▶ (depth 10) ──▶ Controller
//!       ▲ pot_tick                                              │
//!  sample timer                                            StatusBoard
//!                                                               │
//!  ambient task ──▶ inside_temp ──┐                             ▼
//!  weather task ──▶ outside_temp ─┴──────────────────────▶ UI task (reads)
//! ```
//!
//! The device build keeps a single `static DEVICE` because interrupt
//! handlers need a `'static` address; tests build their own contexts.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::app::messages::{ActuatorId, ButtonEvent, ControllerMsg};

/// Depth of the button queue. One pending press at most.
pub const BUTTON_DEPTH: usize = 1;

/// Depth of the Controller inbox.
pub const COMMAND_DEPTH: usize = 10;

pub type ButtonChannel = Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_DEPTH>;
pub type CommandChannel = Channel<CriticalSectionRawMutex, ControllerMsg, COMMAND_DEPTH>;

/// Single-slot "latest value" channel: newest wins, never blocks.
pub type Latest<T> = Signal<CriticalSectionRawMutex, T>;

// ── Debouncer ─────────────────────────────────────────────────

/// Per-button last-accepted timestamps. Lock-free, allocation-free and
/// safe to call from interrupt context.
pub struct Debouncer {
    window_ms: AtomicU32,
    last_ms: [AtomicU32; 2],
    seen: [AtomicBool; 2],
}

impl Debouncer {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms: AtomicU32::new(window_ms),
            last_ms: [AtomicU32::new(0), AtomicU32::new(0)],
            seen: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub fn set_window(&self, window_ms: u32) {
        self.window_ms.store(window_ms, Ordering::Relaxed);
    }

    /// `true` if this edge is far enough from the last accepted edge on
    /// the same button. Accepted edges become the new reference point.
    pub fn accept(&self, button: ButtonEvent, now_ms: u32) -> bool {
        let i = button.index();
        if self.seen[i].load(Ordering::Acquire) {
            let last = self.last_ms[i].load(Ordering::Acquire);
            if now_ms.wrapping_sub(last) < self.window_ms.load(Ordering::Relaxed) {
                return false;
            }
        }
        self.last_ms[i].store(now_ms, Ordering::Release);
        self.seen[i].store(true, Ordering::Release);
        true
    }
}

// ── Status board ──────────────────────────────────────────────

/// Lock-free snapshot of actuator flags, written only by the Controller.
///
/// Readers (UI, potentiometer task) may see a value one message stale;
/// the UI re-renders on its next refresh anyway.
pub struct StatusBoard {
    enabled: [AtomicBool; 3],
    auto_mode: [AtomicBool; 3],
    adjusting: AtomicBool,
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self {
            enabled: [AtomicBool::new(true), AtomicBool::new(true), AtomicBool::new(true)],
            auto_mode: [AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)],
            adjusting: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, id: ActuatorId, enabled: bool, auto_mode: bool) {
        self.enabled[id.index()].store(enabled, Ordering::Release);
        self.auto_mode[id.index()].store(auto_mode, Ordering::Release);
    }

    pub fn set_adjusting(&self, adjusting: bool) {
        self.adjusting.store(adjusting, Ordering::Release);
    }

    pub fn is_enabled(&self, id: ActuatorId) -> bool {
        self.enabled[id.index()].load(Ordering::Acquire)
    }

    pub fn is_auto(&self, id: ActuatorId) -> bool {
        self.auto_mode[id.index()].load(Ordering::Acquire)
    }

    /// Whether a potentiometer session is open.
    pub fn is_adjusting(&self) -> bool {
        self.adjusting.load(Ordering::Acquire)
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

// ── Device context ────────────────────────────────────────────

/// Result of feeding one raw edge into the input pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Queued for the UI.
    Accepted,
    /// Inside the debounce window of the previous press.
    Bounced,
    /// Debounced, but the UI has not consumed the previous press yet.
    Dropped,
}

pub struct DeviceContext {
    pub buttons: ButtonChannel,
    pub commands: CommandChannel,
    /// Inside temperature in whole degrees, for display only.
    pub inside_temp: Latest<i32>,
    /// Outside temperature in whole degrees, for display only.
    pub outside_temp: Latest<i32>,
    /// Potentiometer sample request from the sample timer.
    pub pot_tick: Latest<()>,
    pub debouncer: Debouncer,
    pub status: StatusBoard,
}

impl DeviceContext {
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            buttons: Channel::new(),
            commands: Channel::new(),
            inside_temp: Signal::new(),
            outside_temp: Signal::new(),
            pot_tick: Signal::new(),
            debouncer: Debouncer::new(debounce_ms),
            status: StatusBoard::new(),
        }
    }

    /// Debounce a raw edge and queue it for the UI if it survives.
    pub fn on_button_edge(&self, button: ButtonEvent, now_ms: u32) -> EdgeOutcome {
        if !self.debouncer.accept(button, now_ms) {
            return EdgeOutcome::Bounced;
        }
        self.enqueue_button(button)
    }

    /// Queue an already-debounced press. Drops it if one is pending.
    pub fn enqueue_button(&self, button: ButtonEvent) -> EdgeOutcome {
        match self.buttons.try_send(button) {
            Ok(()) => EdgeOutcome::Accepted,
            Err(_) => EdgeOutcome::Dropped,
        }
    }

    /// Non-blocking send from a sensor task. Returns `false` when the
    /// Controller inbox is full and the message was dropped.
    pub fn post(&self, msg: ControllerMsg) -> bool {
        self.commands.try_send(msg).is_ok()
    }
}

/// The device-wide context. Debounce window matches
/// [`SystemConfig::default`](crate::config::SystemConfig).
pub static DEVICE: DeviceContext = DeviceContext::new(250);
