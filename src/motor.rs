// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Software PWM for a two-input H-bridge motor driver (L9110S).
//!
//! The PWM peripheral is not used. The control loop calls
//! [`Motor::service`], which flips the two driver inputs and returns how many
//! microseconds may pass before it must be called again.
//!
//! # Direction Truth Table
//!
//! | IN1 | IN2 | Motor State                   |
//! |-----|-----|-------------------------------|
//! | 1   | 0   | Forward                       |
//! | 0   | 1   | Reverse                       |
//! | 0   | 0   | Coast (used during PWM off)   |
//! | 1   | 1   | Brake (never driven)          |
//!
//! # Examples
//!
//! ```ignore
//! let mut motor = Motor::new(&mut board, config.board.motor);
//! motor.set_throttle(40);
//! let mut next = board.now();
//! loop {
//!     let now = board.now();
//!     if now >= next {
//!         next += u64::from(motor.service(&mut board, now));
//!     }
//! }
//! ```

use crate::config::MotorPins;
use crate::hal::{Board, PinId, PinMode};

/// Commanded spin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

/// Position inside the current PWM period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Inputs set for the commanded direction
    Driving,
    /// Both inputs low
    Coasting,
}

/// Single DC motor on a two-input H-bridge.
///
/// Opposing inputs are never both high: every drive write sets one input
/// and clears the other.
pub struct Motor {
    in1: PinId,
    in2: PinId,
    period_us: u32,
    duty_us: u32,
    direction: Direction,
    phase: Phase,
}

impl Motor {
    /// Configures both inputs as outputs and leaves the motor coasting.
    ///
    /// # Arguments
    ///
    /// * `board` - Pin and clock access
    /// * `pins` - Driver inputs and PWM frequency; `pwm_hz` must be validated
    ///   (non-zero) beforehand
    pub fn new<B: Board>(board: &mut B, pins: MotorPins) -> Self {
        board.configure(pins.in1, PinMode::OUTPUT);
        board.configure(pins.in2, PinMode::OUTPUT);
        board.write(pins.in1, false);
        board.write(pins.in2, false);
        Self {
            in1: pins.in1,
            in2: pins.in2,
            period_us: 1_000_000 / pins.pwm_hz.max(1),
            duty_us: 0,
            direction: Direction::Forward,
            phase: Phase::Coasting,
        }
    }

    /// Sets speed and direction.
    ///
    /// # Arguments
    ///
    /// * `percent` - `-100..=100`; the sign picks the direction, the
    ///   magnitude the duty. Values outside the range are clamped.
    ///
    /// Takes effect at the next phase boundary; a motor dropped to 0% while
    /// driving is released on the next `service` call.
    pub fn set_throttle(&mut self, percent: i32) {
        let percent = percent.clamp(-100, 100);
        self.direction = if percent >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        self.duty_us = self.period_us * percent.unsigned_abs() / 100;
    }

    /// Advances the PWM state machine.
    ///
    /// Writes both driver inputs and returns the delay in microseconds until
    /// the next required call. Never returns 0.
    pub fn service<B: Board>(&mut self, board: &mut B, _now: u64) -> u32 {
        if self.duty_us == 0 {
            self.coast(board);
            return self.period_us;
        }

        if self.duty_us >= self.period_us {
            self.drive(board);
            return self.period_us;
        }

        match self.phase {
            Phase::Coasting => {
                self.drive(board);
                self.duty_us
            }
            Phase::Driving => {
                self.coast(board);
                (self.period_us - self.duty_us).max(1)
            }
        }
    }

    fn drive<B: Board>(&mut self, board: &mut B) {
        let forward = self.direction == Direction::Forward;
        board.write(self.in1, forward);
        board.write(self.in2, !forward);
        self.phase = Phase::Driving;
    }

    fn coast<B: Board>(&mut self, board: &mut B) {
        board.write(self.in1, false);
        board.write(self.in2, false);
        self.phase = Phase::Coasting;
    }

    /// PWM period derived from the configured frequency.
    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Drive time per period, `0..=period_us`.
    pub fn duty_us(&self) -> u32 {
        self.duty_us
    }

    /// Direction of the last throttle command; zero counts as forward.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the bridge is currently driven or coasting.
    pub fn phase(&self) -> Phase {
        self.phase
    }
}
