// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Deadline bookkeeping for the cooperative loop.
//!
//! A task's next deadline is its previous deadline plus the delay it reported,
//! never "now plus delay". A late call therefore does not shift the rest of
//! the waveform: the following deadline is already closer, and the nominal
//! period is kept.

/// Absolute time at which a periodic task must next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    at_us: u64,
}

impl Deadline {
    /// Deadline at the absolute time `at_us`.
    pub fn new(at_us: u64) -> Self {
        Self { at_us }
    }

    /// Scheduled time in microseconds since boot.
    pub fn at_us(&self) -> u64 {
        self.at_us
    }

    /// Whether the task should run at `now`.
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.at_us
    }

    /// How far `now` is past the deadline; 0 if not yet due.
    pub fn lateness(&self, now: u64) -> u64 {
        now.saturating_sub(self.at_us)
    }

    /// Moves the deadline forward by `delta_us` from where it was.
    pub fn advance(&mut self, delta_us: u32) -> u64 {
        self.at_us = self.at_us.saturating_add(u64::from(delta_us));
        self.at_us
    }
}

/// Deadlines of the three waveform generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub servo_left: Deadline,
    pub servo_right: Deadline,
    pub motor: Deadline,
}

impl Deadlines {
    /// All three tasks due at `start_us`.
    pub fn starting_at(start_us: u64) -> Self {
        Self {
            servo_left: Deadline::new(start_us),
            servo_right: Deadline::new(start_us),
            motor: Deadline::new(start_us),
        }
    }

    /// Earliest of the three deadlines.
    pub fn soonest(&self) -> u64 {
        self.servo_left
            .at_us()
            .min(self.servo_right.at_us())
            .min(self.motor.at_us())
    }
}
