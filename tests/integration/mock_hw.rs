//! Mock peripherals for integration tests.
//!
//! Records every output write, timer transition, indicator frame and
//! rendered screen so tests can assert on the full history without
//! touching real LEDC/GPIO registers.

use std::sync::{Arc, Mutex};

use homectl::app::ports::{AdcChannel, AdcPort, Display, LevelIndicator, MenuItem, OutputChannel, SampleTimer};
use homectl::error::{ActuatorError, SensorError, TimerError};

// ── Outputs ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockOutput {
    pub writes: Vec<u32>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn last(&self) -> Option<u32> {
        self.writes.last().copied()
    }
}

impl OutputChannel for MockOutput {
    fn write(&mut self, native: u32) -> Result<(), ActuatorError> {
        if self.fail {
            return Err(ActuatorError::PwmWriteFailed(-1));
        }
        self.writes.push(native);
        Ok(())
    }
}

pub fn outputs() -> [MockOutput; 3] {
    [MockOutput::default(), MockOutput::default(), MockOutput::default()]
}

/// Output whose write log stays readable after the owner moves to
/// another thread.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    pub writes: Arc<Mutex<Vec<u32>>>,
}

#[allow(dead_code)]
impl SharedOutput {
    pub fn last(&self) -> Option<u32> {
        self.writes.lock().unwrap().last().copied()
    }
}

impl OutputChannel for SharedOutput {
    fn write(&mut self, native: u32) -> Result<(), ActuatorError> {
        self.writes.lock().unwrap().push(native);
        Ok(())
    }
}

// ── Sample timer ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockTimer {
    pub running: bool,
    pub starts: usize,
    pub stops: usize,
    /// Number of upcoming `start` calls that fail.
    pub failing_starts: usize,
}

impl SampleTimer for MockTimer {
    fn start(&mut self) -> Result<(), TimerError> {
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            return Err(TimerError::Driver(-1));
        }
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        self.running = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
        Ok(())
    }
}

// ── Level indicator ───────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockIndicator {
    pub frames: Vec<u8>,
}

#[allow(dead_code)]
impl MockIndicator {
    pub fn current(&self) -> u8 {
        self.frames.last().copied().unwrap_or(0)
    }
}

impl LevelIndicator for MockIndicator {
    fn show(&mut self, segments: u8) -> Result<(), ActuatorError> {
        self.frames.push(segments);
        Ok(())
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Home { inside: String, outside: String, clock: String },
    Menu { labels: Vec<&'static str>, selected: usize },
    Mode { label: String, is_auto: bool },
    Toggle { label: String, enabled: bool },
    Adjust { label: String },
}

#[derive(Debug, Default)]
pub struct MockDisplay {
    pub frames: Vec<Frame>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Display for MockDisplay {
    fn home(&mut self, inside: &str, outside: &str, clock: &str) {
        self.frames.push(Frame::Home {
            inside: inside.into(),
            outside: outside.into(),
            clock: clock.into(),
        });
    }

    fn menu(&mut self, items: &[MenuItem]) {
        self.frames.push(Frame::Menu {
            labels: items.iter().map(|i| i.label).collect(),
            selected: items.iter().position(|i| i.selected).unwrap_or(usize::MAX),
        });
    }

    fn mode(&mut self, label: &str, is_auto: bool) {
        self.frames.push(Frame::Mode { label: label.into(), is_auto });
    }

    fn toggle(&mut self, label: &str, enabled: bool) {
        self.frames.push(Frame::Toggle { label: label.into(), enabled });
    }

    fn adjust(&mut self, label: &str) {
        self.frames.push(Frame::Adjust { label: label.into() });
    }
}

// ── ADC ───────────────────────────────────────────────────────

/// Fixed millivolt level per channel.
#[derive(Debug)]
pub struct MockAdc {
    pub pot_mv: i32,
    pub temp_mv: i32,
    pub photo_mv: i32,
    pub fail: bool,
}

impl Default for MockAdc {
    fn default() -> Self {
        Self { pot_mv: 1650, temp_mv: 750, photo_mv: 2500, fail: false }
    }
}

impl AdcPort for MockAdc {
    fn read_mv(&mut self, channel: AdcChannel) -> Result<i32, SensorError> {
        if self.fail {
            return Err(SensorError::AdcReadFailed(-1));
        }
        Ok(match channel {
            AdcChannel::Potentiometer => self.pot_mv,
            AdcChannel::Temperature => self.temp_mv,
            AdcChannel::Photoresistor => self.photo_mv,
        })
    }
}

/// Records the channel of every conversion, in order, and yields between
/// conversions so concurrent callers get a chance to interleave.
#[derive(Debug, Clone, Default)]
pub struct RecordingAdc {
    pub log: Arc<Mutex<Vec<AdcChannel>>>,
}

impl AdcPort for RecordingAdc {
    fn read_mv(&mut self, channel: AdcChannel) -> Result<i32, SensorError> {
        self.log.lock().unwrap().push(channel);
        std::thread::yield_now();
        Ok(1000)
    }
}
