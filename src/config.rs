// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware configuration, pin mappings and tuning constants.
//!
//! # Pin Mapping Summary
//!
//! ## Actuators
//! - **Motor IN1**: GPIO 19 (L9110S forward input)
//! - **Motor IN2**: GPIO 18 (L9110S reverse input)
//! - **Left elevon servo**: GPIO 2
//! - **Right elevon servo**: GPIO 3
//!
//! ## Inputs
//! - **IR Receiver**: GPIO 13 (with pull-up)
//! - **Left button**: GPIO 14 (with pull-up, active low)
//! - **Right button**: GPIO 15 (with pull-up, active low)
//!
//! ## Indicators
//! - **Status LED**: GPIO 22
//!
//! # Software PWM
//!
//! Neither the motor nor the servos use the PWM peripheral. Waveforms are
//! produced by toggling plain outputs from the control loop:
//! - **Motor**: 400 Hz, duty set in microseconds of drive per period
//! - **Servos**: 50 Hz frame, 600-2400 µs pulse

use crate::error::ConfigError;
use crate::hal::PinId;

/// GPIO pin number for status LED
pub const LED_PIN: u8 = 22;

/// GPIO pin number for IR receiver data output
pub const IR_RECEIVER_PIN: u8 = 13;

/// GPIO pin number for motor driver input 1 (forward)
pub const MOTOR_IN1_PIN: u8 = 19;

/// GPIO pin number for motor driver input 2 (reverse)
pub const MOTOR_IN2_PIN: u8 = 18;

/// GPIO pin number for the left elevon servo signal
pub const SERVO_LEFT_PIN: u8 = 2;

/// GPIO pin number for the right elevon servo signal
pub const SERVO_RIGHT_PIN: u8 = 3;

/// GPIO pin number for the left push button
pub const BUTTON_LEFT_PIN: u8 = 14;

/// GPIO pin number for the right push button
pub const BUTTON_RIGHT_PIN: u8 = 15;

/// Motor software PWM frequency
pub const MOTOR_PWM_HZ: u32 = 400;

/// Highest software PWM frequency accepted (10 µs period)
pub const MAX_PWM_HZ: u32 = 100_000;

/// Motor driver pins and PWM rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    pub in1: PinId,
    pub in2: PinId,
    pub pwm_hz: u32,
}

/// Push button pins for the button control scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPins {
    pub left: PinId,
    pub right: PinId,
}

/// Which GPIO does what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub motor: MotorPins,
    pub servo_left: PinId,
    pub servo_right: PinId,
    pub ir_receiver: PinId,
    pub led: PinId,
    pub buttons: ButtonPins,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            motor: MotorPins {
                in1: PinId(MOTOR_IN1_PIN),
                in2: PinId(MOTOR_IN2_PIN),
                pwm_hz: MOTOR_PWM_HZ,
            },
            servo_left: PinId(SERVO_LEFT_PIN),
            servo_right: PinId(SERVO_RIGHT_PIN),
            ir_receiver: PinId(IR_RECEIVER_PIN),
            led: PinId(LED_PIN),
            buttons: ButtonPins {
                left: PinId(BUTTON_LEFT_PIN),
                right: PinId(BUTTON_RIGHT_PIN),
            },
        }
    }
}

/// Elevon servo tuning (SG90 class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoConfig {
    /// Length of one servo frame (50 Hz)
    pub frame_us: u32,
    /// Pulse width at -90°
    pub min_us: u32,
    /// Pulse width at +90°
    pub max_us: u32,
    /// Surface deflection at full roll command
    pub roll_max_deg: i32,
    /// Absolute deflection clamp, protects horns and linkages
    pub hard_limit_deg: i32,
    /// Largest position change per update
    pub slew_per_frame: i32,
    pub trim_left_deg: i32,
    pub trim_right_deg: i32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            frame_us: 20_000,
            // Many SG90s buzz below 600 µs.
            min_us: 600,
            max_us: 2400,
            roll_max_deg: 70,
            hard_limit_deg: 85,
            slew_per_frame: 7,
            trim_left_deg: 0,
            trim_right_deg: 0,
        }
    }
}

/// IR decoder sampling budget, in samples of `sample_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub sample_us: u64,
    /// Cap on the start burst low run (12 ms)
    pub start_low_max: u16,
    /// Cap on the start space high run (4.8 ms)
    pub start_high_max: u16,
    /// Cap on each bit's low run
    pub bit_low_max: u16,
    /// Cap on each bit's high run
    pub bit_high_max: u16,
    /// High runs longer than this many samples decode as 1. A nominal NEC
    /// zero space (560 µs) measures 9 samples and a one (1690 µs) 28.
    pub one_threshold: u16,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_us: 60,
            start_low_max: 200,
            start_high_max: 80,
            bit_low_max: 20,
            bit_high_max: 40,
            one_threshold: 16,
        }
    }
}

/// Pilot command shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    /// Throttle change per VolumeUp/VolumeDown, percent
    pub throttle_step: i32,
    /// Roll change per RollLeft/RollRight, percent
    pub roll_step: i32,
    /// Throttle applied when the motor is armed
    pub armed_throttle: i32,
    /// Repeat interval while a button is held
    pub button_repeat_us: u64,
    /// Service lateness reported as an overrun
    pub late_warn_us: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            throttle_step: 5,
            roll_step: 12,
            armed_throttle: 20,
            button_repeat_us: 20_000,
            late_warn_us: 2_000,
        }
    }
}

/// Complete controller configuration, handed to
/// [`crate::controller::FlightController::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub board: BoardConfig,
    pub servo: ServoConfig,
    pub decoder: DecoderConfig,
    pub control: ControlConfig,
}

impl Config {
    /// Checks the configuration before any pin is touched.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, see [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.board;
        let pins = [
            b.motor.in1,
            b.motor.in2,
            b.servo_left,
            b.servo_right,
            b.ir_receiver,
            b.led,
            b.buttons.left,
            b.buttons.right,
        ];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicatePin(pin.0));
            }
        }

        if b.motor.pwm_hz == 0 || b.motor.pwm_hz > MAX_PWM_HZ {
            return Err(ConfigError::InvalidPwmFrequency(b.motor.pwm_hz));
        }

        let s = &self.servo;
        if s.min_us >= s.max_us || s.max_us > s.frame_us {
            return Err(ConfigError::InvalidServoRange);
        }
        if s.hard_limit_deg <= 0 || s.hard_limit_deg > 90 {
            return Err(ConfigError::InvalidHardLimit(s.hard_limit_deg));
        }
        if s.slew_per_frame <= 0 {
            return Err(ConfigError::InvalidSlew);
        }

        let d = &self.decoder;
        let caps = [d.start_low_max, d.start_high_max, d.bit_low_max, d.bit_high_max];
        if d.sample_us == 0 || caps.contains(&0) || d.one_threshold >= d.bit_high_max {
            return Err(ConfigError::InvalidDecoderTiming);
        }

        Ok(())
    }
}
