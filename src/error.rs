// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Configuration errors.
//!
//! The control loop itself never fails: bad IR frames decode to nothing and
//! out-of-range commands are clamped. The only fallible step is accepting a
//! configuration at start-up, reported through [`ConfigError`].

use core::fmt;

/// Reasons a [`crate::config::Config`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The same GPIO is assigned to two functions
    DuplicatePin(u8),
    /// Motor PWM frequency is zero or too high for software PWM
    InvalidPwmFrequency(u32),
    /// Servo pulse range is empty or longer than the frame
    InvalidServoRange,
    /// Servo hard limit is zero or beyond ±90°
    InvalidHardLimit(i32),
    /// Servo slew step is zero
    InvalidSlew,
    /// A decoder cap is zero or the one/zero threshold is unreachable
    InvalidDecoderTiming,
    /// The board has no room left for another pin binding
    PinTableFull,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicatePin(pin) => write!(f, "GPIO {} assigned twice", pin),
            ConfigError::InvalidPwmFrequency(hz) => {
                write!(f, "invalid motor PWM frequency: {} Hz", hz)
            }
            ConfigError::InvalidServoRange => write!(f, "invalid servo pulse range"),
            ConfigError::InvalidHardLimit(deg) => {
                write!(f, "invalid servo hard limit: {} deg", deg)
            }
            ConfigError::InvalidSlew => write!(f, "servo slew step must be positive"),
            ConfigError::InvalidDecoderTiming => write!(f, "invalid IR decoder timing"),
            ConfigError::PinTableFull => write!(f, "pin table full"),
        }
    }
}
