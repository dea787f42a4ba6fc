//! ESP32-C3 firmware-specific modules for stalink
//!
//! This crate contains the code that cannot compile on desktop targets: the
//! esp-radio station driver, the embassy-net tasks, build-time settings and
//! the LED blink loop.

#![no_std]

extern crate alloc;

pub mod blink;
pub mod network;
pub mod settings;
pub mod station;
