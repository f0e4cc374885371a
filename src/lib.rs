//! # em41xx-emu
//!
//! A portable, no_std Rust emulator for passive 125 kHz EM41xx RFID tags.
//!
//! The tag is powered and clocked by the reader's field. It sends a 64-bit
//! EM41xx frame over and over by loading and releasing its coil, cycling
//! through a list of identifiers and incrementing each one after it has been
//! sent.
//!
//! This crate implements the tag in software using:
//! - `embedded-hal` traits for the coil and LED pins
//! - a timer-driven Manchester symbol scheduler with a fixed per-tick cost
//! - interrupt-safe buffer handoff with `critical-section`
//! - optional tick sources using either timer interrupts or blocking delay
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for symbol timing |
//! | `timer-isr` (default) | Global scheduler helpers and macros for a timer ISR |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Software Features
//!
//! - EM41xx framing: 9-bit header, 10 parity rows, column parity, stop bit
//! - Manchester encoding at RF/64 (32 carrier cycles per half-symbol)
//! - 40-bit identifier registry with carry-propagating increment
//! - Frame verification for tests and host tooling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use em41xx_emu::{init_tag_scheduler, setup_tag_scheduler, tick_tag_scheduler};
//!
//! init_tag_scheduler!(CoilPin);
//!
//! #[interrupt]
//! fn TIMER0_COMPA() {
//!     tick_tag_scheduler!(); // Called every 32 carrier cycles
//! }
//!
//! fn main() -> ! {
//!     setup_tag_scheduler!(coil, None);
//!     let registry = IdRegistry::new(&DEFAULT_ID_LIST).unwrap();
//!     let mut controller = FrameController::new(registry, Some(led), TagConfig::default()).unwrap();
//!     controller.run(&TAG_SCHEDULER)
//! }
//! ```
//!
//! Or, use `run_tick_loop()` with a `DelayNs` implementation:
//!
//! ```rust,ignore
//! em41xx_emu::timer::run_tick_loop(&TAG_SCHEDULER, &mut controller, &mut delay, 256_000);
//! ```
//!
//! ## Integration Notes
//!
//! - The timer must fire every [`consts::TICK_CYCLES`] carrier cycles; a real
//!   reader will not lock onto any other rate
//! - The tick handler must finish well inside the tick, see
//!   [`timer::TICK_BUDGET_CYCLES`]
//! - Only one scheduler instance should be active at a time
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
extern crate std;

pub use critical_section;

pub(crate) mod fmt;

pub mod config;
pub mod consts;
pub mod controller;
pub mod encoding;
pub mod error;
pub(crate) mod parity;
pub mod registry;
pub mod scheduler;
#[cfg(test)]
mod testing;
pub mod timer;
