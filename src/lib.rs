// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Flying-wing controller core
//!
//! Everything that decides *what* the aircraft does lives here and runs
//! without an operating system, without interrupts and without hardware PWM:
//!
//! - [`ir_receiver`]: busy-sampling NEC decoder producing [`command::Action`]s
//! - [`motor`]: software PWM for a two-input H-bridge (forward/reverse/coast)
//! - [`servo`]: two 50 Hz elevon pulse generators with slew limiting
//! - [`controller`]: the cooperative earliest-deadline loop tying them together
//!
//! Hardware is reached only through the [`hal::Board`] traits, so the crate
//! builds for the host and every module is unit tested there. The RP2040
//! binding lives in [`rp`] behind the `rp2040` feature.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod buttons;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod hal;
pub mod ir_receiver;
pub mod motor;
pub mod schedule;
pub mod servo;

#[cfg(feature = "rp2040")]
pub mod rp;
