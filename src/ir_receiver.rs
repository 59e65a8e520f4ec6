// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! NEC IR protocol decoder built on busy-sampling a single input.
//!
//! No interrupts, no PIO: the pin is sampled every `sample_us` microseconds and
//! each phase of the frame is measured as a run length in samples.
//!
//! # Frame Structure
//!
//! ```text
//! [Start low][Start high][Address][~Address][Command][~Command]
//!    ~9ms       ~4.5ms     8 bits   8 bits    8 bits   8 bits
//! ```
//!
//! Each bit is a short low run followed by a high run. A high run longer than
//! `one_threshold` samples is a `1`. Bits arrive LSB first within each byte.
//!
//! # Timing Budget
//!
//! Every run is capped. A run that reaches its cap means the signal is gone
//! and the whole attempt is dropped; there is no resynchronisation inside one
//! [`IrReceiver::poll`]. With the default caps the worst case is one start
//! burst plus 32 capped bits, roughly 100 ms, and a typical frame returns
//! after ~55 ms. A line stuck low costs at most `start_low_max` samples.
//!
//! The stop burst after bit 31 is consumed before returning. NEC repeat codes
//! (start burst, short space, stop burst, then silence) fail on the first
//! bit's high run and are ignored.

use crate::command::{Action, CommandSource, action_for};
use crate::config::DecoderConfig;
use crate::hal::{Board, Level, PinId, PinMode};

/// Four decoded payload bytes, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Device address
    pub address: u8,
    /// Bitwise complement of `address`
    pub address_inv: u8,
    /// Key code
    pub command: u8,
    /// Bitwise complement of `command`
    pub command_inv: u8,
}

impl Frame {
    /// Splits the four payload bytes in arrival order.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            address: bytes[0],
            address_inv: bytes[1],
            command: bytes[2],
            command_inv: bytes[3],
        }
    }

    /// Both byte pairs must be bitwise complements.
    pub fn is_valid(&self) -> bool {
        self.address.wrapping_add(self.address_inv) == 0xFF
            && self.command.wrapping_add(self.command_inv) == 0xFF
    }
}

/// Why a decode attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reject {
    /// Start burst never ended
    StartLow,
    /// Start space never ended
    StartHigh,
    /// Low run of the given bit hit its cap
    BitLow(u8),
    /// High run of the given bit hit its cap
    BitHigh(u8),
    /// Payload received but the complements do not match
    Checksum(Frame),
}

/// Counts consecutive samples of `level` on `pin`.
///
/// Samples are taken every `sample_us`, scheduled from the first sample so the
/// period does not drift with read overhead.
///
/// # Returns
///
/// * `Some(count)` - number of samples at `level` before the line changed
/// * `None` - the run reached `cap` samples without a transition
pub fn measure_run<B: Board>(
    board: &mut B,
    pin: PinId,
    level: Level,
    cap: u16,
    sample_us: u64,
) -> Option<u16> {
    let mut count: u16 = 0;
    let mut next = board.now();
    loop {
        if Level::from(board.read(pin)) != level {
            return Some(count);
        }
        count += 1;
        if count >= cap {
            return None;
        }
        next += sample_us;
        board.sleep_until(next);
    }
}

/// NEC receiver on an active-low demodulating IR module (38 kHz, e.g. VS1838B).
pub struct IrReceiver {
    pin: PinId,
    config: DecoderConfig,
}

impl IrReceiver {
    /// Creates a receiver and enables the pin's pull-up.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let ir = IrReceiver::new(&mut board, PinId(13), DecoderConfig::default());
    /// ```
    pub fn new<B: Board>(board: &mut B, pin: PinId, config: DecoderConfig) -> Self {
        board.configure(pin, PinMode::InputPullUp);
        Self { pin, config }
    }

    /// Checks for a frame and decodes it if one is starting.
    ///
    /// Returns `None` at once when the line is idle (high). When the line is
    /// low this blocks for the rest of the frame, or until a run times out.
    ///
    /// # Returns
    ///
    /// * `Some(action)` - a frame with valid checksums was received
    /// * `None` - idle line, timeout or checksum mismatch
    pub fn poll<B: Board>(&mut self, board: &mut B) -> Option<Action> {
        if board.read(self.pin) {
            return None;
        }
        match self.read_frame(board) {
            Ok(frame) => Some(action_for(frame.command)),
            Err(reject) => {
                log_debug!("IR frame dropped: {:?}", reject);
                None
            }
        }
    }

    /// Measures one frame, starting on a line already observed low.
    pub fn read_frame<B: Board>(&self, board: &mut B) -> Result<Frame, Reject> {
        let c = &self.config;

        measure_run(board, self.pin, Level::Low, c.start_low_max, c.sample_us)
            .ok_or(Reject::StartLow)?;
        measure_run(board, self.pin, Level::High, c.start_high_max, c.sample_us)
            .ok_or(Reject::StartHigh)?;

        let mut bytes = [0u8; 4];
        for bit in 0..32u8 {
            measure_run(board, self.pin, Level::Low, c.bit_low_max, c.sample_us)
                .ok_or(Reject::BitLow(bit))?;
            let high = measure_run(board, self.pin, Level::High, c.bit_high_max, c.sample_us)
                .ok_or(Reject::BitHigh(bit))?;
            if high > c.one_threshold {
                bytes[usize::from(bit / 8)] |= 1 << (bit % 8);
            }
        }

        // Swallow the stop burst so the next poll sees an idle line.
        let _ = measure_run(board, self.pin, Level::Low, c.bit_low_max, c.sample_us);

        let frame = Frame::from_bytes(bytes);
        if frame.is_valid() {
            Ok(frame)
        } else {
            Err(Reject::Checksum(frame))
        }
    }
}

impl CommandSource for IrReceiver {
    fn poll<B: Board>(&mut self, board: &mut B) -> Option<Action> {
        IrReceiver::poll(self, board)
    }
}
