//! Control core for the RVC mixer accessory
//!
//! Everything reachable from the 100 Hz timer tick lives here: the sub-rate
//! scheduler, switch debouncer, remote-volume-control curve engine with its
//! anti-pop stepped output, the LED/VU display state machine (including the
//! transient override animation), the battery watermark classifier, and the
//! log-structured preference store.
//!
//! # Architecture Layers
//!
//! ```text
//! Hosting environment (timer ISR / simulator run loop)
//!         ↓  on_tick()
//! Control core (this crate)
//!         ↓
//! Platform HAL (platform crate - trait abstractions)
//! ```
//!
//! The core is single-threaded and interrupt-driven: one
//! [`ControlLoop::on_tick`] call runs every subtask to completion in fixed
//! priority order, then returns so the host can sleep until the next timer
//! wake. There is no allocator, no executor, and no locking.
//!
//! # Example
//!
//! ```no_run
//! # fn demo<A, M, C, L, N, Ck, Da, Lo, D, E>(
//! #     mut control: control::ControlLoop<A, M, C, L, N, Ck, Da, Lo, D>,
//! # ) -> Result<(), E>
//! # where
//! #     A: platform::AdcSampler,
//! #     M: platform::SwitchInput,
//! #     C: platform::SwitchInput,
//! #     L: platform::RgbLed,
//! #     N: platform::NvSector,
//! #     Ck: embedded_hal::digital::OutputPin<Error = E>,
//! #     Da: embedded_hal::digital::OutputPin<Error = E>,
//! #     Lo: embedded_hal::digital::OutputPin<Error = E>,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! control.init()?;
//! loop {
//!     // ...wait for the 100 Hz timer...
//!     let _events = control.on_tick()?;
//! }
//! # }
//! ```

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

pub mod attenuation;
pub mod battery;
pub mod display;
pub mod modes;
pub mod prefs;
pub mod scheduler;
pub mod switches;

// Re-export the main surface
pub use attenuation::lm1971::AttenuationStepper;
pub use attenuation::AttenuationEngine;
pub use battery::{BatteryBand, BatteryMonitor};
pub use display::vu::VuMeter;
pub use display::DisplayController;
pub use modes::{Attenuation, LedMode, RvcCurve};
pub use prefs::{PreferenceStore, Preferences, WriteOutcome};
pub use scheduler::{ControlLoop, TickEvents, RENDER_DIVISOR, TICK_HZ};
pub use switches::{Debouncer, SwitchBank, SwitchEdge, SwitchEvent, SwitchId};
