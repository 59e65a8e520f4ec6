// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Remote control actions and IR code mappings.
//!
//! Decoded NEC command bytes are translated into semantic [`Action`]s here.
//! The table targets the common 21-key NEC remote:
//!
//! ```text
//!   [CH-]  [CH ]  [CH+]      0x45 - Power toggle (arm / disarm motor)
//!   [|<<]  [>>|]  [>||]
//!   [ - ]  [ + ]  [EQ ]      0x07 - Throttle down, 0x15 - Throttle up
//!   [ 0 ]  [100]  [200]
//!   [ 1 ]  [ 2 ]  [ 3 ]      0x18 - Nose up
//!   [ 4 ]  [ 5 ]  [ 6 ]      0x08 - Roll left, 0x1C - Select, 0x5A - Roll right
//!   [ 7 ]  [ 8 ]  [ 9 ]      0x52 - Nose down
//! ```
//!
//! The corner digits (1, 3, 7, 9) are reported as [`Action::Numeric`]. Every
//! other byte is surfaced as [`Action::Raw`]; an unknown but well-formed frame
//! is never an error, so the table can grow without touching the decoder.

use crate::hal::Board;

/// Control action requested by the pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Pitch up (digit 2)
    NoseUp,
    /// Pitch down (digit 8)
    NoseDown,
    /// Step roll command to the left (digit 4)
    RollLeft,
    /// Step roll command to the right (digit 6)
    RollRight,
    /// Step throttle up
    VolumeUp,
    /// Step throttle down
    VolumeDown,
    /// Arm or disarm the motor
    PowerToggle,
    /// Centre key (digit 5)
    Select,
    /// Digit key without a dedicated meaning
    Numeric(u8),
    /// Any command byte not in the table
    Raw(u8),
}

/// Known command bytes, in table order.
const TABLE: [(u8, Action); 12] = [
    (0x18, Action::NoseUp),
    (0x52, Action::NoseDown),
    (0x08, Action::RollLeft),
    (0x5A, Action::RollRight),
    (0x15, Action::VolumeUp),
    (0x07, Action::VolumeDown),
    (0x45, Action::PowerToggle),
    (0x1C, Action::Select),
    (0x0C, Action::Numeric(1)),
    (0x5E, Action::Numeric(3)),
    (0x42, Action::Numeric(7)),
    (0x4A, Action::Numeric(9)),
];

/// Maps a decoded NEC command byte to an [`Action`].
///
/// # Arguments
///
/// * `code` - Command byte (third byte of a validated frame)
///
/// # Returns
///
/// The named action for the 12 known codes, `Action::Raw(code)` otherwise.
///
/// # Examples
///
/// ```
/// use wing_controller::command::{action_for, Action};
///
/// assert_eq!(action_for(0x45), Action::PowerToggle);
/// assert_eq!(action_for(0x00), Action::Raw(0x00));
/// ```
pub fn action_for(code: u8) -> Action {
    TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|&(_, action)| action)
        .unwrap_or(Action::Raw(code))
}

impl Action {
    /// Returns the IR command byte that produces this action.
    ///
    /// `Raw` actions return their own byte. A `Numeric` digit outside the
    /// table has no code.
    pub fn code(&self) -> Option<u8> {
        match self {
            Action::Raw(code) => Some(*code),
            action => TABLE
                .iter()
                .find(|(_, known)| known == action)
                .map(|&(code, _)| code),
        }
    }
}

/// Producer of pilot actions polled once per loop iteration.
///
/// The IR receiver is the canonical source; the push-button pad is the
/// alternative. Each keeps its own timing semantics behind this interface.
pub trait CommandSource {
    /// Returns the next action, if any. May block for a bounded time.
    fn poll<B: Board>(&mut self, board: &mut B) -> Option<Action>;
}
