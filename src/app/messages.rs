//! Messages exchanged between tasks.
//!
//! The Controller's inbox carries [`ControllerMsg`]; the UI's inbox carries
//! [`ButtonEvent`]. Both are small `Copy` values so they can live in
//! fixed-size channels without allocation.

/// The three controllable outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActuatorId {
    Fan = 0,
    Vent = 1,
    Lamp = 2,
}

impl ActuatorId {
    pub const ALL: [Self; 3] = [Self::Fan, Self::Vent, Self::Lamp];

    /// Human-readable name, used on screen and in logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fan => "Fan",
            Self::Vent => "Vent",
            Self::Lamp => "Lamp",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What the user asked an actuator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Flip manual / automatic.
    Mode,
    /// Flip enabled / disabled.
    Toggle,
    /// Open or close the live potentiometer session.
    Adjust,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mode => "Mode",
            Self::Toggle => "Toggle",
            Self::Adjust => "Adjust",
        }
    }
}

/// Everything the Controller consumes.
///
/// Sensor variants carry an already-scaled percentage (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMsg {
    Ui { actuator: ActuatorId, action: Action },
    Potentiometer(i32),
    Photoresistor(i32),
    TempSensor(i32),
}

/// One debounced press on a physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ButtonEvent {
    /// Confirm the highlighted entry.
    Select = 0,
    /// Move the highlight down (wrapping).
    Down = 1,
}

impl ButtonEvent {
    pub const fn index(self) -> usize {
        self as usize
    }
}
