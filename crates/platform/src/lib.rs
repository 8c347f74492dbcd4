//! Hardware Abstraction Layer (HAL) for the RVC mixer accessory
//!
//! This crate provides trait-based abstractions for every hardware boundary
//! the control core touches, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Control core (control crate — tick scheduler, curves, display, prefs)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (MCU peripheral drivers: ADC mux, PWM timer, IAP flash)
//! ```
//!
//! # Boundaries
//!
//! - [`AdcSampler`] - 8-bit left-aligned sensor sampling over a channel mux
//! - [`SwitchInput`] - raw digital level of one debounce-candidate input
//! - [`RgbLed`] - status LED, one 8-bit PWM duty per color channel
//! - [`NvSector`] - byte-programmable non-volatile preference sector
//!
//! The attenuator's clock/data/load lines and the short protocol delay are
//! not abstracted here; they use `embedded_hal::digital::OutputPin` and
//! `embedded_hal::delay::DelayNs` directly.
//!
//! # Features
//!
//! - `std`: expose the [`mocks`] peripherals to host-side consumers
//! - `defmt`: enable defmt logging derives (hardware builds only)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(feature = "std")]
extern crate std;

pub mod adc;
pub mod input;
pub mod led;
pub mod nvmem;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the boundary traits
pub use adc::{AdcChannel, AdcSampler};
pub use input::SwitchInput;
pub use led::{Rgb, RgbLed};
pub use nvmem::{NvError, NvSector};
