//! Per-actuator state machine (fan, vent, lamp).
//!
//! Every actuator resolves manual, automatic and sensor-latched control the
//! same way; only the threshold and the native output mapping differ, and
//! both come from [`ActuatorConfig`].
//!
//! ```text
//!   enabled  auto  latched │ physical output
//!   ───────────────────────┼────────────────
//!    false     *      *    │ 0
//!    true    false    *    │ mapped(level)
//!    true    true   true   │ mapped(level)
//!    true    true   false  │ 0
//! ```
//!
//! State is committed before the output is written, so a failed write
//! surfaces as an error without desynchronising intended state.

use log::debug;

use crate::app::messages::ActuatorId;
use crate::app::ports::OutputChannel;
use crate::config::ActuatorConfig;
use crate::error::ActuatorError;

/// Logical state of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub enabled: bool,
    pub auto_mode: bool,
    pub auto_latched: bool,
    /// Last commanded level, 0..=100 %.
    pub level_pct: u8,
    /// `level_pct` mapped to the native range.
    pub native: u32,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_mode: false,
            auto_latched: false,
            level_pct: 0,
            native: 0,
        }
    }
}

impl ActuatorState {
    /// Value the physical output must hold for this state.
    pub fn effective_native(&self) -> u32 {
        if !self.enabled {
            0
        } else if !self.auto_mode || self.auto_latched {
            self.native
        } else {
            0
        }
    }

    fn is_active(&self) -> bool {
        self.enabled && (!self.auto_mode || self.auto_latched)
    }
}

pub struct Actuator<O: OutputChannel> {
    id: ActuatorId,
    config: ActuatorConfig,
    state: ActuatorState,
    output: O,
}

impl<O: OutputChannel> Actuator<O> {
    pub fn new(id: ActuatorId, config: ActuatorConfig, output: O) -> Self {
        Self {
            id,
            config,
            state: ActuatorState::default(),
            output,
        }
    }

    pub fn id(&self) -> ActuatorId {
        self.id
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn is_auto(&self) -> bool {
        self.state.auto_mode
    }

    pub fn is_latched(&self) -> bool {
        self.state.auto_latched
    }

    pub fn level(&self) -> u8 {
        self.state.level_pct
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Store a new commanded level and push it if the output is active.
    pub fn set_level(&mut self, percent: i32) -> Result<(), ActuatorError> {
        let pct = percent.clamp(0, 100) as u8;
        self.state.level_pct = pct;
        self.state.native = self.config.mapping.to_native(pct);
        if self.state.is_active() {
            self.push(self.state.native)?;
        }
        Ok(())
    }

    /// Flip enabled. Disabling always writes 0; enabling re-applies the
    /// auto/latch-correct value.
    pub fn toggle_enabled(&mut self) -> Result<(), ActuatorError> {
        self.state.enabled = !self.state.enabled;
        self.push(self.state.effective_native())
    }

    /// Flip manual / automatic and re-sync the output.
    pub fn toggle_auto_mode(&mut self) -> Result<(), ActuatorError> {
        self.state.auto_mode = !self.state.auto_mode;
        if self.state.enabled {
            self.push(self.state.effective_native())?;
        }
        Ok(())
    }

    /// Feed a 0..=100 sensor reading through the threshold latch.
    pub fn apply_sensor_percent(&mut self, percent: i32) -> Result<(), ActuatorError> {
        let latched = percent >= i32::from(self.config.threshold_pct);
        if latched == self.state.auto_latched {
            return Ok(());
        }
        self.state.auto_latched = latched;
        debug!(
            "{}: auto latch {}",
            self.id.label().to_ascii_lowercase(),
            if latched { "on" } else { "off" }
        );
        if self.state.enabled && self.state.auto_mode {
            self.push(self.state.effective_native())?;
        }
        Ok(())
    }

    fn push(&mut self, native: u32) -> Result<(), ActuatorError> {
        debug!("{}: output -> {}", self.id.label().to_ascii_lowercase(), native);
        self.output.write(native)
    }
}
