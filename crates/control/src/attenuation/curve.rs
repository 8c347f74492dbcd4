//! RVC reading → attenuation target curves.
//!
//! Two selectable responses map the 8-bit potentiometer reading to an
//! attenuation target:
//!
//! - **DefaultWithMute** linearizes the audio-taper pot, then applies a
//!   piecewise-linear curve with guard bands at both ends of the travel and
//!   a mute tier past the top guard band.
//! - **Traditional** reproduces a measured legacy attenuator response via a
//!   134-entry lookup table; it spans only 0–12 dB and has no mute tier.
//!
//! Readings above [`DISCONNECT_THRESHOLD`] mean no control is plugged in;
//! both curves yield unity gain there.

// Integer curve math: operands are bounded u16 intermediates (see the
// overflow notes at each site) and all divisors are non-zero constants.
#![allow(clippy::arithmetic_side_effects)]

use crate::modes::{Attenuation, RvcCurve};

/// Raw readings above this mean the remote control is unplugged.
pub const DISCONNECT_THRESHOLD: u8 = 0xE0;

/// Low guard band: linearized values below this give unity gain.
const GUARD_LOW: u16 = 6;
/// Knee position on the linearized scale (3/4 of the travel).
const KNEE: u16 = 192;
/// Attenuation at the knee, in dB.
const KNEE_DB: u16 = 14;
/// Attenuation at the top guard band, in dB, before the drop to mute.
const TOP_DB: u16 = 48;
/// High guard band: linearized values above this mute.
const GUARD_HIGH: u16 = 236;

/// Attenuation target for a raw RVC reading under the selected curve.
#[must_use]
pub fn target_for(raw: u8, curve: RvcCurve) -> Attenuation {
    if raw > DISCONNECT_THRESHOLD {
        return Attenuation::ZERO;
    }
    match curve {
        RvcCurve::DefaultWithMute => default_with_mute(raw),
        RvcCurve::Traditional => traditional(raw),
    }
}

/// Undo the pot's audio taper: `raw * 255 / (255 - raw)`, clipped to 255.
///
/// Callers guarantee `raw <= DISCONNECT_THRESHOLD`, so the divisor is at
/// least 31 and the numerator at most 224 * 255, well inside u16.
fn linearized(raw: u8) -> u16 {
    debug_assert!(raw <= DISCONNECT_THRESHOLD);
    let top = u16::from(raw) * 255;
    let bot = 255 - u16::from(raw);
    (top / bot).min(255)
}

/// Piecewise default curve with guard bands and a mute tier.
///
/// Below [`GUARD_LOW`]: unity gain. Above [`GUARD_HIGH`]: mute. Up to the
/// knee, a shallow ramp to [`KNEE_DB`]; past it, a steeper ramp to
/// [`TOP_DB`]. Divisions truncate, matching the device's published
/// response.
#[must_use]
pub fn default_with_mute(raw: u8) -> Attenuation {
    let lin = linearized(raw);
    if lin < GUARD_LOW {
        Attenuation::ZERO
    } else if lin > GUARD_HIGH {
        Attenuation::MUTE
    } else if lin <= KNEE {
        // (lin - GUARD_LOW) * KNEE_DB <= 186 * 14, inside u16.
        #[allow(clippy::cast_possible_truncation)] // quotient <= KNEE_DB
        Attenuation::new(((lin - GUARD_LOW) * KNEE_DB / KNEE) as u8)
    } else {
        // (lin - KNEE) * (TOP_DB - KNEE_DB) <= 44 * 34, inside u16.
        #[allow(clippy::cast_possible_truncation)] // quotient <= TOP_DB
        Attenuation::new((KNEE_DB + (lin - KNEE) * (TOP_DB - KNEE_DB) / (GUARD_HIGH - KNEE)) as u8)
    }
}

/// Measured legacy-attenuator response, RVC position 0–133 → dB.
///
/// Generated from bench measurements of the legacy unit with minimized
/// quantization error; stored as positive attenuation units.
#[rustfmt::skip]
const TRADITIONAL_TABLE: [u8; 134] = [
    12, 12, 12, 12, 12, 12, 12, 12, 12, 12, // RVC 0-9
    12, 12, 12, 12, 12, 12, 12, 12, 11, 11, // RVC 10-19
    11, 11, 11, 11, 11, 11, 11, 11, 11, 11, // RVC 20-29
    11, 11, 11, 11, 11, 11, 11, 11, 11, 11, // RVC 30-39
    11, 11, 10, 10, 10, 10, 10, 10, 10, 10, // RVC 40-49
    10, 10, 10, 10, 10, 10, 10,  9,  9,  9, // RVC 50-59
     9,  9,  9,  9,  9,  9,  9,  9,  8,  8, // RVC 60-69
     8,  8,  8,  8,  8,  8,  7,  7,  7,  7, // RVC 70-79
     7,  7,  7,  6,  6,  6,  6,  6,  6,  6, // RVC 80-89
     6,  5,  5,  5,  5,  5,  5,  5,  5,  5, // RVC 90-99
     4,  4,  4,  4,  4,  3,  3,  3,  3,  3, // RVC 100-109
     3,  2,  2,  2,  2,  2,  2,  1,  1,  1, // RVC 110-119
     1,  1,  1,  1,  1,  1,  1,  1,  0,  0, // RVC 120-129
     0,  0,  0,  0,                         // RVC 130-133
];

/// Legacy table curve. The raw reading is reversed so 0 = loudest, matching
/// the default curve's direction, then looked up; output spans 0–12 dB.
#[must_use]
pub fn traditional(raw: u8) -> Attenuation {
    let reversed = if raw >= 133 { 0 } else { 133 - raw };
    // Table index: reversed <= 133, table has 134 entries.
    #[allow(clippy::indexing_slicing)]
    Attenuation::new(TRADITIONAL_TABLE[usize::from(reversed)])
}
