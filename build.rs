// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Build script for the flying-wing controller firmware
//!
//! Places the RP2040 memory layout where `cortex-m-rt` expects it:
//! - **BOOT2**: 256 bytes at 0x10000000 (second stage bootloader)
//! - **FLASH**: 2MB minus BOOT2 starting at 0x10000100
//! - **RAM**: 256KB starting at 0x20000000
//!
//! Host builds (`cargo test`) skip the linker setup entirely; the control logic
//! is plain `no_std` code and needs no memory layout there.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if !target.starts_with("thumbv") {
        return;
    }

    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out.join("memory.x"), include_bytes!("memory.x")).expect("write memory.x");
    println!("cargo:rustc-link-search={}", out.display());
}
