//! VU meter signal processing.
//!
//! The audio monitor input is biased to mid-scale (0x80); signal level is
//! the absolute deviation from that bias. Each sampling pass takes 20 back-
//! to-back conversions and keeps the peak — at 1 kHz a 20-conversion burst
//! covers a full waveform period, so the peak is the true amplitude. Peaks
//! land in a 4-slot window whose maximum feeds the display, squeezing out
//! single-burst dropouts.
//!
//! Display smoothing runs in 8.8 fixed point: a new peak at or above the
//! displayed level snaps the display up immediately (fast attack); below
//! it, the display decays by 15/16 per render cycle (slow decay) and snaps
//! to zero once it falls under 1.0. The smoothed value indexes a 128-entry
//! logarithmic table mapping linear amplitude to perceived loudness over
//! roughly a 40 dB range, and the result picks a color along the
//! green → yellow → red ramp.

// 8.8 fixed-point smoothing: intermediates are bounded (peak <= 128, so
// level_fixed <= 0x8000; decay shrinks) and zone interpolations stay in u16.
#![allow(clippy::arithmetic_side_effects)]

use platform::{AdcChannel, AdcSampler, Rgb};

/// Conversions per sampling pass; sized to cover one 1 kHz audio period.
const PEAK_SAMPLE_COUNT: usize = 20;

/// Mid-scale bias of the audio monitor input.
const SIGNAL_BIAS: u8 = 0x80;

/// Largest meaningful deviation; the display index clamps here.
pub const FULL_SCALE: u8 = 127;

/// 1.0 in 8.8 fixed point — below this the decaying display snaps to zero.
const SNAP_TO_ZERO: u16 = 256;

/// Linear amplitude (0–127) → perceived loudness (0–255).
///
/// dB = 20·log10(x/127), with −40 dB..0 dB mapped onto 0..255.
#[rustfmt::skip]
const LOG_LOUDNESS: [u8; 128] = [
      0,  16,  25,  48,  64,  76,  86,  95, 102, 108, 114, 120, 124, 129, 133,
    137, 140, 144, 147, 150, 153, 155, 158, 160, 163, 165, 167, 169, 171, 173,
    175, 177, 179, 180, 182, 184, 185, 187, 188, 190, 191, 192, 194, 195, 196,
    198, 199, 200, 201, 202, 203, 204, 206, 207, 208, 209, 210, 211, 212, 213,
    213, 214, 215, 216, 217, 218, 219, 220, 220, 221, 222, 223, 224, 224, 225,
    226, 227, 227, 228, 229, 229, 230, 231, 231, 232, 233, 233, 234, 235, 235,
    236, 237, 237, 238, 238, 239, 240, 240, 241, 241, 242, 242, 243, 243, 244,
    244, 245, 246, 246, 247, 247, 248, 248, 249, 249, 250, 250, 250, 251, 251,
    252, 252, 253, 253, 254, 254, 255, 255,
];

/// Peak-detecting, attack/decay-smoothed VU processor.
#[derive(Debug)]
pub struct VuMeter {
    /// Last four sampling-pass peaks.
    window: [u8; 4],
    window_index: u8,
    /// Smoothed display value, 8.8 fixed point.
    level_fixed: u16,
}

impl VuMeter {
    /// A silent meter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window: [0; 4],
            window_index: 0,
            level_fixed: 0,
        }
    }

    /// Slam the display to full scale so it starts bright and decays —
    /// the visual cue for entering VU mode.
    pub fn reset_to_full_scale(&mut self) {
        self.level_fixed = u16::from(FULL_SCALE) << 8;
    }

    /// Smoothed display value in 8.8 fixed point.
    #[must_use]
    pub fn level_fixed(&self) -> u16 {
        self.level_fixed
    }

    /// Run one 20-conversion sampling pass and record its peak.
    pub fn sample(&mut self, adc: &mut impl AdcSampler) {
        let mut peak = 0u8;
        for _ in 0..PEAK_SAMPLE_COUNT {
            let raw = adc.sample(AdcChannel::AudioMonitor);
            let deviation = if raw >= SIGNAL_BIAS {
                raw - SIGNAL_BIAS
            } else {
                SIGNAL_BIAS - raw
            };
            peak = peak.max(deviation);
        }
        // Window index wraps over the 4 slots.
        #[allow(clippy::indexing_slicing)]
        {
            self.window[usize::from(self.window_index)] = peak;
        }
        self.window_index = (self.window_index + 1) % 4;
    }

    /// Advance the attack/decay smoothing one render cycle and return the
    /// LED frame for the current level.
    pub fn render_color(&mut self) -> Rgb {
        let windowed_peak = self.window.iter().copied().max().unwrap_or(0);
        let signal_fixed = u16::from(windowed_peak) << 8;
        if signal_fixed >= self.level_fixed {
            // Fast attack: jump straight to a new, louder peak.
            self.level_fixed = signal_fixed;
        } else {
            // Slow decay: ×15/16 per cycle, in u32 to dodge overflow.
            let decayed = u32::from(self.level_fixed) * 15 / 16;
            #[allow(clippy::cast_possible_truncation)] // decayed < level_fixed <= u16::MAX
            {
                self.level_fixed = decayed as u16;
            }
            if self.level_fixed < SNAP_TO_ZERO {
                self.level_fixed = 0;
            }
        }
        // Round to an integer display value and clamp to the table range.
        let display = ((self.level_fixed + 0x80) >> 8).min(u16::from(FULL_SCALE));
        // display <= 127, table has 128 entries.
        #[allow(clippy::indexing_slicing)]
        let loudness = LOG_LOUDNESS[usize::from(display)];
        color_for(loudness)
    }
}

impl Default for VuMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Perceived loudness (0–255) → LED color.
///
/// Three zones: pure green ramping up to 191, a green-to-yellow blend to
/// 223, then red-only ramping to full brightness at 255.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // each interpolation tops out below 256
pub(crate) fn color_for(loudness: u8) -> Rgb {
    if loudness < 192 {
        let g = u16::from(loudness) * 33 / 191;
        Rgb::new(0, g as u8, 0)
    } else if loudness < 224 {
        let t = u16::from(loudness - 192); // 0..=31
        let r = t * 50 / 31;
        let g = 33 + t * 7 / 31;
        Rgb::new(r as u8, g as u8, 0)
    } else {
        let t = u16::from(loudness - 224); // 0..=31
        let r = 100 + t * 155 / 31;
        Rgb::new(r as u8, 0, 0)
    }
}
