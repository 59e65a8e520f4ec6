// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Two push buttons as an alternative command source.
//!
//! Unlike the IR remote, which steps once per decoded press, the buttons act
//! while held and repeat every `button_repeat_us`:
//!
//! - left only: [`Action::RollLeft`]
//! - right only: [`Action::RollRight`]
//! - both: [`Action::PowerToggle`] the first time (arms the motor), then
//!   [`Action::VolumeUp`] so throttle ramps while the pair is held
//!
//! Buttons are active low on pulled-up inputs. There is no debouncing; a
//! bouncing contact at most restarts the repeat interval.

use crate::command::{Action, CommandSource};
use crate::hal::{Board, PinId, PinMode};

/// Left and right push buttons producing repeating actions while held.
pub struct ButtonPad {
    left: PinId,
    right: PinId,
    repeat_us: u64,
    next_emit_us: u64,
    armed: bool,
}

impl ButtonPad {
    /// Creates the pad and enables pull-ups on both inputs.
    ///
    /// # Arguments
    ///
    /// * `board` - Pin access
    /// * `left`, `right` - Active-low button inputs
    /// * `repeat_us` - Interval between actions while a button is held
    pub fn new<B: Board>(board: &mut B, left: PinId, right: PinId, repeat_us: u64) -> Self {
        board.configure(left, PinMode::InputPullUp);
        board.configure(right, PinMode::InputPullUp);
        Self {
            left,
            right,
            repeat_us,
            next_emit_us: 0,
            armed: false,
        }
    }
}

impl CommandSource for ButtonPad {
    fn poll<B: Board>(&mut self, board: &mut B) -> Option<Action> {
        let left = !board.read(self.left);
        let right = !board.read(self.right);
        let now = board.now();

        if !left && !right {
            // A fresh press acts immediately.
            self.next_emit_us = now;
            return None;
        }
        if now < self.next_emit_us {
            return None;
        }
        self.next_emit_us = now.saturating_add(self.repeat_us);

        let action = match (left, right) {
            (true, true) if !self.armed => {
                self.armed = true;
                Action::PowerToggle
            }
            (true, true) => Action::VolumeUp,
            (true, false) => Action::RollLeft,
            _ => Action::RollRight,
        };
        Some(action)
    }
}
