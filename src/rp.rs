// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! RP2040 board binding.
//!
//! GPIOs are handed over as [`Flex`] pins and looked up by number, which lets
//! the controller address them through [`PinId`] like any other board. The
//! clock is the embassy time driver (1 MHz on RP2040); sleeping busy-waits with
//! [`block_for`] because the control loop never yields.
//!
//! # Examples
//!
//! ```ignore
//! let p = embassy_rp::init(Default::default());
//! let mut board = RpBoard::new();
//! board.bind(PinId(22), Flex::new(p.PIN_22))?;
//! ```

use embassy_rp::gpio::{Drive, Flex, Level as RpLevel, Pull};
use embassy_time::{Duration, Instant, block_for};

use crate::error::ConfigError;
use crate::hal::{DigitalIo, DriveStrength, PinId, PinMode, TimeSource};

/// Room for LED, IR, two motor inputs, two servos and two buttons.
const MAX_PINS: usize = 8;

pub struct RpBoard {
    pins: [Option<(PinId, Flex<'static>)>; MAX_PINS],
}

impl RpBoard {
    pub fn new() -> Self {
        Self {
            pins: [const { None }; MAX_PINS],
        }
    }

    /// Registers `pin` as GPIO `id`.
    ///
    /// # Errors
    ///
    /// `DuplicatePin` if `id` is already bound, `PinTableFull` if every slot
    /// is taken.
    pub fn bind(&mut self, id: PinId, pin: Flex<'static>) -> Result<(), ConfigError> {
        if self.pins.iter().flatten().any(|(bound, _)| *bound == id) {
            return Err(ConfigError::DuplicatePin(id.0));
        }
        let slot = self
            .pins
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(ConfigError::PinTableFull)?;
        *slot = Some((id, pin));
        Ok(())
    }

    fn pin(&mut self, id: PinId) -> Option<&mut Flex<'static>> {
        self.pins
            .iter_mut()
            .flatten()
            .find(|(bound, _)| *bound == id)
            .map(|(_, pin)| pin)
    }
}

impl Default for RpBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalIo for RpBoard {
    fn configure(&mut self, id: PinId, mode: PinMode) {
        let Some(pin) = self.pin(id) else {
            log_warn!("configure on unbound GPIO {}", id.0);
            return;
        };
        match mode {
            PinMode::Input => {
                pin.set_pull(Pull::None);
                pin.set_as_input();
            }
            PinMode::InputPullUp => {
                pin.set_pull(Pull::Up);
                pin.set_as_input();
            }
            PinMode::InputPullDown => {
                pin.set_pull(Pull::Down);
                pin.set_as_input();
            }
            PinMode::Output(strength) => {
                pin.set_pull(Pull::None);
                pin.set_drive_strength(match strength {
                    DriveStrength::Ma2 => Drive::_2mA,
                    DriveStrength::Ma4 => Drive::_4mA,
                    DriveStrength::Ma8 => Drive::_8mA,
                    DriveStrength::Ma12 => Drive::_12mA,
                });
                pin.set_as_output();
            }
        }
    }

    fn read(&mut self, id: PinId) -> bool {
        // Unbound inputs read as an idle, pulled-up line.
        self.pin(id).map(|pin| pin.is_high()).unwrap_or(true)
    }

    fn write(&mut self, id: PinId, high: bool) {
        if let Some(pin) = self.pin(id) {
            pin.set_level(if high { RpLevel::High } else { RpLevel::Low });
        }
    }
}

impl TimeSource for RpBoard {
    fn now(&self) -> u64 {
        Instant::now().as_micros()
    }

    fn sleep_until(&mut self, deadline_us: u64) {
        let now = self.now();
        if deadline_us > now {
            block_for(Duration::from_micros(deadline_us - now));
        }
    }
}
