// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! RP2040 Flying-Wing Controller with IR Remote
//!
//! Drives one motor and two elevon servos from an NEC infrared remote, with
//! every waveform generated in software from a single blocking loop.
//!
//! # Hardware Configuration
//! - **Microcontroller**: RP2040 (ARM Cortex-M0+)
//! - **Motor**: L9110S H-bridge, IN1 on GPIO 19, IN2 on GPIO 18, 400 Hz software PWM
//! - **Elevons**: SG90 servos on GPIO 2 (left) and GPIO 3 (right), 50 Hz
//! - **IR Receiver**: NEC protocol decoder on GPIO 13
//! - **Buttons**: GPIO 14 / 15 (with the `buttons` feature)
//! - **Status LED**: GPIO 22
//!
//! # IR Remote Commands
//! - `0x45` (CH-): Arm / disarm motor (arms at 20%)
//! - `0x15` (+): Throttle up 5%
//! - `0x07` (-): Throttle down 5%
//! - `0x08` (4): Roll left
//! - `0x5A` (6): Roll right
//!
//! # Build
//! ```bash
//! cargo build --release --features rp2040 --target thumbv6m-none-eabi
//! ```
//!
//! # Flash
//! ```bash
//! cargo run --release --features rp2040 --target thumbv6m-none-eabi
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::Flex;
use wing_controller::config::{self, Config};
use wing_controller::controller::FlightController;
use wing_controller::error::ConfigError;
use wing_controller::hal::{DigitalIo, PinId, PinMode, TimeSource};
use wing_controller::rp::RpBoard;
use {defmt_rtt as _, panic_probe as _};

#[cfg(feature = "buttons")]
use wing_controller::buttons::ButtonPad;
#[cfg(not(feature = "buttons"))]
use wing_controller::ir_receiver::IrReceiver;

/// Blinks the status LED `n` times before the loop takes over.
fn blink(board: &mut RpBoard, led: PinId, n: u32, on_us: u64, off_us: u64) {
    for _ in 0..n {
        board.write(led, true);
        board.sleep_for(on_us);
        board.write(led, false);
        board.sleep_for(off_us);
    }
}

/// Main flight controller task
///
/// Binds the GPIOs named in [`config`], blinks the LED and hands the board to
/// the control loop, which never returns. The loop blocks the executor on
/// purpose: nothing else runs on this chip. A configuration rejected by
/// [`FlightController::new`] halts here before any actuator pin is driven.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("RP2040 Flying-Wing Controller Starting!");
    let p = embassy_rp::init(Default::default());

    // Validated once, by `FlightController::new`.
    let config = Config::default();

    // Peripheral fields must match the GPIO numbers in `config`.
    let mut board = RpBoard::new();
    let bound = (|| -> Result<(), ConfigError> {
        board.bind(PinId(config::LED_PIN), Flex::new(p.PIN_22))?;
        board.bind(PinId(config::IR_RECEIVER_PIN), Flex::new(p.PIN_13))?;
        board.bind(PinId(config::MOTOR_IN1_PIN), Flex::new(p.PIN_19))?;
        board.bind(PinId(config::MOTOR_IN2_PIN), Flex::new(p.PIN_18))?;
        board.bind(PinId(config::SERVO_LEFT_PIN), Flex::new(p.PIN_2))?;
        board.bind(PinId(config::SERVO_RIGHT_PIN), Flex::new(p.PIN_3))?;
        board.bind(PinId(config::BUTTON_LEFT_PIN), Flex::new(p.PIN_14))?;
        board.bind(PinId(config::BUTTON_RIGHT_PIN), Flex::new(p.PIN_15))?;
        Ok(())
    })();
    if let Err(e) = bound {
        defmt::panic!("pin binding failed: {}", e);
    }

    let led = config.board.led;
    board.configure(led, PinMode::OUTPUT);
    blink(&mut board, led, 3, 300_000, 150_000);

    #[cfg(not(feature = "buttons"))]
    let source = IrReceiver::new(&mut board, config.board.ir_receiver, config.decoder);
    #[cfg(feature = "buttons")]
    let source = {
        let pins = config.board.buttons;
        ButtonPad::new(&mut board, pins.left, pins.right, config.control.button_repeat_us)
    };

    let mut controller = match FlightController::new(&mut board, config, source) {
        Ok(controller) => controller,
        Err(e) => defmt::panic!("controller setup failed: {}", e),
    };

    info!("Wing ready! Waiting for commands...");
    controller.run(&mut board)
}
