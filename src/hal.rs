// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware capability boundary.
//!
//! The controller needs exactly two things from the chip: plain digital pins
//! and a monotonic microsecond clock with a blocking sleep. Both are expressed
//! as traits here so the waveform generators, the IR decoder and the loop can
//! run against real silicon ([`crate::rp::RpBoard`]) or a simulated board in
//! tests.
//!
//! Components never own the board. Each call borrows it for the duration of
//! the call, which mirrors how the single execution context works on target:
//! whoever is running has the whole chip.

#[cfg(test)]
pub mod mock;

/// GPIO number on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u8);

/// Pad drive strength for outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    Ma2,
    Ma4,
    Ma8,
    Ma12,
}

/// Electrical configuration of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with the internal pull-up enabled
    InputPullUp,
    /// Input with the internal pull-down enabled
    InputPullDown,
    /// Push-pull output
    Output(DriveStrength),
}

impl PinMode {
    /// Output mode used for every actuator pin unless configured otherwise.
    pub const OUTPUT: PinMode = PinMode::Output(DriveStrength::Ma4);
}

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

/// Digital pin capability.
pub trait DigitalIo {
    /// Applies pull, direction and drive strength to `pin`.
    fn configure(&mut self, pin: PinId, mode: PinMode);

    /// Samples `pin`; `true` means logic high.
    fn read(&mut self, pin: PinId) -> bool;

    /// Drives an output pin.
    fn write(&mut self, pin: PinId, high: bool);
}

/// Monotonic microsecond clock with a blocking sleep.
///
/// `sleep_until` does not yield to anything: the target has a single
/// execution context and nothing else could run.
pub trait TimeSource {
    /// Microseconds since boot. Wraps only at 64-bit overflow.
    fn now(&self) -> u64;

    /// Blocks until `now() >= deadline_us`. Returns immediately for deadlines
    /// already in the past.
    fn sleep_until(&mut self, deadline_us: u64);

    /// Blocks for `duration_us` microseconds.
    fn sleep_for(&mut self, duration_us: u64) {
        let deadline = self.now().saturating_add(duration_us);
        self.sleep_until(deadline);
    }
}

/// Everything a component may touch.
pub trait Board: DigitalIo + TimeSource {}

impl<T: DigitalIo + TimeSource> Board for T {}
