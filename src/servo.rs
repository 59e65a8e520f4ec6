// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Elevon servo pulse generator.
//!
//! Each servo gets a 50 Hz frame made of two calls to [`Servo::update`]: the
//! first raises the pin and returns the pulse width, the second lowers it and
//! returns the rest of the frame.
//!
//! # Elevon Mixing
//!
//! Roll is mixed differentially: the left surface follows the roll command
//! and the right surface mirrors it. The mixed target plus trim is clamped to
//! `±hard_limit_deg`, which sits inside the mechanical travel so that trims or
//! a full command can never drive a horn into its stop.
//!
//! Position moves toward the target by at most `slew_per_frame` degrees per
//! call, never in a single jump.

use crate::config::ServoConfig;
use crate::hal::{Board, PinId, PinMode};

/// Which half of the servo frame is being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePhase {
    High,
    Low,
}

/// Mixed and clamped surface deflection for `roll_cmd`.
///
/// Commands outside `-100..=100` are clamped first.
pub fn surface_target(config: &ServoConfig, roll_cmd: i32, is_left: bool) -> i32 {
    let roll_cmd = roll_cmd.clamp(-100, 100);
    let (cmd, trim) = if is_left {
        (roll_cmd, config.trim_left_deg)
    } else {
        (-roll_cmd, config.trim_right_deg)
    };
    let deg = (cmd.saturating_mul(config.roll_max_deg) / 100).saturating_add(trim);
    deg.clamp(-config.hard_limit_deg, config.hard_limit_deg)
}

/// Moves `current` toward `target` by at most `step`.
pub fn step_toward(current: i32, target: i32, step: i32) -> i32 {
    if current < target {
        current.saturating_add(step).min(target)
    } else {
        current.saturating_sub(step).max(target)
    }
}

/// Pulse width for a position in degrees.
///
/// -90..=90 maps linearly onto `min_us..=max_us`; positions beyond that are
/// clamped to the end points.
pub fn pulse_width_us(position_deg: i32, min_us: u32, max_us: u32) -> u32 {
    // 0..=180 after the shift, so the cast is lossless
    let pseudo = (position_deg.clamp(-90, 90) + 90) as u32;
    min_us + (max_us - min_us) * pseudo / 180
}

/// One elevon servo on a plain output pin.
pub struct Servo {
    pin: PinId,
    config: ServoConfig,
    position_deg: i32,
    phase: PulsePhase,
}

impl Servo {
    /// Configures `pin` as an output, drives it low and centres the surface.
    pub fn new<B: Board>(board: &mut B, pin: PinId, config: ServoConfig) -> Self {
        board.configure(pin, PinMode::OUTPUT);
        board.write(pin, false);
        Self {
            pin,
            config,
            position_deg: 0,
            phase: PulsePhase::Low,
        }
    }

    /// Slews toward the mixed target and emits the next pulse edge.
    ///
    /// # Arguments
    ///
    /// * `board` - Pin access
    /// * `roll_cmd` - Roll command, `-100..=100`
    /// * `is_left` - Mix for the left surface (`true`) or the right
    ///
    /// # Returns
    ///
    /// Microseconds until the next call: the pulse width after raising the
    /// pin, the remainder of the frame (at least 1) after lowering it.
    pub fn update<B: Board>(&mut self, board: &mut B, roll_cmd: i32, is_left: bool) -> u32 {
        let target = surface_target(&self.config, roll_cmd, is_left);
        self.position_deg = step_toward(self.position_deg, target, self.config.slew_per_frame);
        let pulse_us = pulse_width_us(self.position_deg, self.config.min_us, self.config.max_us);

        match self.phase {
            PulsePhase::Low => {
                board.write(self.pin, true);
                self.phase = PulsePhase::High;
                pulse_us
            }
            PulsePhase::High => {
                board.write(self.pin, false);
                self.phase = PulsePhase::Low;
                self.config.frame_us.saturating_sub(pulse_us).max(1)
            }
        }
    }

    /// Current slewed surface position in degrees.
    pub fn position_deg(&self) -> i32 {
        self.position_deg
    }

    /// Half of the frame emitted by the last update.
    pub fn phase(&self) -> PulsePhase {
        self.phase
    }
}
