//! Log-based display adapter.
//!
//! Implements [`Display`] by writing each screen to the logger (UART /
//! USB-CDC on the device, stderr on host). A panel driver would implement
//! the same trait. Identical consecutive home screens are logged at
//! `debug` so the 1 s refresh does not flood the console.

use core::fmt::Write as _;

use log::{debug, info};

use crate::app::ports::{Display, MenuItem};

#[derive(Default)]
pub struct LogDisplay {
    last_home: heapless::String<32>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for LogDisplay {
    fn home(&mut self, inside: &str, outside: &str, clock: &str) {
        let mut line = heapless::String::<32>::new();
        let _ = write!(line, "in {inside}C out {outside}C {clock}");
        if line == self.last_home {
            debug!("HOME  | {}", line);
        } else {
            info!("HOME  | {}", line);
            self.last_home = line;
        }
    }

    fn menu(&mut self, items: &[MenuItem]) {
        self.last_home.clear();
        let mut line = heapless::String::<64>::new();
        for item in items {
            let _ = if item.selected {
                write!(line, "[{}] ", item.label)
            } else {
                write!(line, " {}  ", item.label)
            };
        }
        info!("MENU  | {}", line.trim_end());
    }

    fn mode(&mut self, label: &str, is_auto: bool) {
        self.last_home.clear();
        info!("MODE  | {}: {}  (Down: flip, Select: home)", label, if is_auto { "AUTO" } else { "MANUAL" });
    }

    fn toggle(&mut self, label: &str, enabled: bool) {
        self.last_home.clear();
        info!("POWER | {}: {}  (Down: flip, Select: home)", label, if enabled { "ON" } else { "OFF" });
    }

    fn adjust(&mut self, label: &str) {
        self.last_home.clear();
        info!("ADJ   | {}: turn the knob, any button to finish", label);
    }
}
