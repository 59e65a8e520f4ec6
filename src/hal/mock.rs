// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Simulated board for host tests.
//!
//! Time only moves when something sleeps (or, optionally, a fixed cost per
//! pin read), so every timing assertion is exact. Inputs are scripted as runs
//! of levels starting at the moment the script is installed; every output
//! write is recorded with its timestamp.

use std::collections::BTreeMap;
use std::vec::Vec;

use super::{DigitalIo, Level, PinId, PinMode, TimeSource};

/// Sample period the NEC helpers below are built around.
pub const SAMPLE_US: u64 = 60;

/// One recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteEvent {
    pub at_us: u64,
    pub pin: PinId,
    pub high: bool,
}

#[derive(Debug, Clone)]
struct Waveform {
    start_us: u64,
    runs: Vec<(Level, u64)>,
    idle: Level,
}

impl Waveform {
    fn level_at(&self, t: u64) -> Level {
        if t < self.start_us {
            return self.idle;
        }
        let mut edge = self.start_us;
        for &(level, duration) in &self.runs {
            edge += duration;
            if t < edge {
                return level;
            }
        }
        self.idle
    }
}

#[derive(Debug, Default)]
pub struct MockBoard {
    now_us: u64,
    read_cost_us: u64,
    reads: usize,
    modes: BTreeMap<PinId, PinMode>,
    inputs: BTreeMap<PinId, Waveform>,
    outputs: BTreeMap<PinId, bool>,
    writes: Vec<WriteEvent>,
    sleeps: Vec<u64>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `read` advances the clock by `us`, so busy loops without sleeps
    /// still make progress.
    pub fn with_read_cost(mut self, us: u64) -> Self {
        self.read_cost_us = us;
        self
    }

    pub fn advance(&mut self, us: u64) {
        self.now_us += us;
    }

    /// Holds `pin` at a constant level from now on.
    pub fn set_input(&mut self, pin: PinId, level: Level) {
        self.script_input(pin, &[], level);
    }

    /// Plays `runs` on `pin` starting now, then holds `idle`.
    pub fn script_input(&mut self, pin: PinId, runs: &[(Level, u64)], idle: Level) {
        self.inputs.insert(
            pin,
            Waveform {
                start_us: self.now_us,
                runs: runs.to_vec(),
                idle,
            },
        );
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    /// Last level written to `pin`.
    pub fn output(&self, pin: PinId) -> Option<bool> {
        self.outputs.get(&pin).copied()
    }

    pub fn writes(&self) -> &[WriteEvent] {
        &self.writes
    }

    /// `(timestamp, level)` of every write to `pin`, oldest first.
    pub fn writes_to(&self, pin: PinId) -> Vec<(u64, bool)> {
        self.writes
            .iter()
            .filter(|w| w.pin == pin)
            .map(|w| (w.at_us, w.high))
            .collect()
    }

    /// Deadlines passed to `sleep_until`, including past ones.
    pub fn sleeps(&self) -> &[u64] {
        &self.sleeps
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.sleeps.clear();
        self.reads = 0;
    }
}

impl DigitalIo for MockBoard {
    fn configure(&mut self, pin: PinId, mode: PinMode) {
        self.modes.insert(pin, mode);
    }

    fn read(&mut self, pin: PinId) -> bool {
        self.reads += 1;
        let level = match self.inputs.get(&pin) {
            Some(wave) => wave.level_at(self.now_us).into(),
            // Unscripted inputs float high like a pulled-up line.
            None => self.outputs.get(&pin).copied().unwrap_or(true),
        };
        self.now_us += self.read_cost_us;
        level
    }

    fn write(&mut self, pin: PinId, high: bool) {
        self.outputs.insert(pin, high);
        self.writes.push(WriteEvent {
            at_us: self.now_us,
            pin,
            high,
        });
    }
}

impl TimeSource for MockBoard {
    fn now(&self) -> u64 {
        self.now_us
    }

    fn sleep_until(&mut self, deadline_us: u64) {
        self.sleeps.push(deadline_us);
        if deadline_us > self.now_us {
            self.now_us = deadline_us;
        }
    }
}

/// Converts `(level, samples)` pairs into timed runs at [`SAMPLE_US`].
pub fn runs(samples: &[(Level, u64)]) -> Vec<(Level, u64)> {
    samples
        .iter()
        .map(|&(level, n)| (level, n * SAMPLE_US))
        .collect()
}

/// Active-low NEC pulse train for `bytes` at nominal timing, sent LSB first:
/// a 150-sample start low (9 ms), 75-sample start high (4.5 ms), 32 bits of
/// 9-sample low (560 µs) followed by a 28-sample (one, 1690 µs) or 9-sample
/// (zero, 560 µs) high, and a 9-sample stop low.
pub fn nec_frame(bytes: [u8; 4]) -> Vec<(Level, u64)> {
    let mut samples = Vec::with_capacity(67);
    samples.push((Level::Low, 150));
    samples.push((Level::High, 75));
    for byte in bytes {
        for bit in 0..8 {
            samples.push((Level::Low, 9));
            let high = if byte & (1 << bit) != 0 { 28 } else { 9 };
            samples.push((Level::High, high));
        }
    }
    samples.push((Level::Low, 9));
    runs(&samples)
}

/// Total duration of a scripted pulse train.
pub fn duration(runs: &[(Level, u64)]) -> u64 {
    runs.iter().map(|&(_, d)| d).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIN: PinId = PinId(7);

    #[test]
    fn test_scripted_input_follows_runs_then_idles() {
        let mut board = MockBoard::new();
        board.advance(100);
        board.script_input(PIN, &[(Level::Low, 50), (Level::High, 20)], Level::Low);

        assert!(!board.read(PIN));
        board.advance(49);
        assert!(!board.read(PIN));
        board.advance(1);
        assert!(board.read(PIN));
        board.advance(20);
        assert!(!board.read(PIN));
    }

    #[test]
    fn test_unscripted_pin_reads_high() {
        let mut board = MockBoard::new();
        assert!(board.read(PIN));
    }

    #[test]
    fn test_writes_are_timestamped() {
        let mut board = MockBoard::new();
        board.write(PIN, true);
        board.advance(30);
        board.write(PIN, false);
        assert_eq!(board.writes_to(PIN), vec![(0, true), (30, false)]);
        assert_eq!(board.output(PIN), Some(false));
    }

    #[test]
    fn test_read_cost_advances_clock() {
        let mut board = MockBoard::new().with_read_cost(3);
        board.read(PIN);
        board.read(PIN);
        assert_eq!(board.now(), 6);
        assert_eq!(board.reads(), 2);
    }

    #[test]
    fn test_nec_frame_length() {
        let train = nec_frame([0x00, 0xFF, 0x00, 0xFF]);
        assert_eq!(train.len(), 2 + 64 + 1);
        // 16 ones at 28 samples, 16 zeros at 9 samples
        let samples = 150 + 75 + 32 * 9 + 16 * 28 + 16 * 9 + 9;
        assert_eq!(duration(&train), samples * SAMPLE_US);
    }
}
