//! Property tests for the debouncer and the RVC curves.

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use control::attenuation::curve::{self, DISCONNECT_THRESHOLD};
use control::switches::{Debouncer, SwitchEdge, DEBOUNCE_SAMPLES};
use control::RvcCurve;
use proptest::prelude::*;

proptest! {
    /// A transition commits only after exactly 5 consecutive contrary
    /// samples: replaying any raw sequence against a reference counter
    /// must produce identical edges.
    #[test]
    fn debounce_matches_reference_model(samples in proptest::collection::vec(any::<bool>(), 0..200)) {
        let mut db = Debouncer::new();
        let mut model_stable = true;
        let mut model_count = 0u8;
        for raw in samples {
            let expected = if raw == model_stable {
                model_count = 0;
                None
            } else {
                model_count += 1;
                if model_count >= DEBOUNCE_SAMPLES {
                    model_stable = raw;
                    model_count = 0;
                    Some(if raw { SwitchEdge::Released } else { SwitchEdge::Pressed })
                } else {
                    None
                }
            };
            prop_assert_eq!(db.update(raw), expected);
            prop_assert_eq!(db.is_high(), model_stable);
        }
    }

    /// Shorter-than-threshold disturbances never commit.
    #[test]
    fn debounce_ignores_short_glitches(glitch_len in 1u8..DEBOUNCE_SAMPLES) {
        let mut db = Debouncer::new();
        for _ in 0..glitch_len {
            prop_assert_eq!(db.update(false), None);
        }
        // Line returns to the committed level: window restarts.
        prop_assert_eq!(db.update(true), None);
        prop_assert!(db.is_high());
    }

    /// The default curve never loses attenuation as the knob closes.
    #[test]
    fn default_curve_is_monotonic(raw in 0u8..DISCONNECT_THRESHOLD) {
        let here = curve::default_with_mute(raw);
        let next = curve::default_with_mute(raw + 1);
        prop_assert!(next >= here, "regressed between raw {} and {}", raw, raw + 1);
    }

    /// The traditional curve stays inside its published 0–12 dB span and
    /// never loses attenuation as the knob closes.
    #[test]
    fn traditional_curve_is_monotonic_and_bounded(raw in 0u8..DISCONNECT_THRESHOLD) {
        let here = curve::traditional(raw);
        let next = curve::traditional(raw + 1);
        prop_assert!(here.get() <= 12);
        prop_assert!(next >= here);
    }

    /// Whatever the reading, a target is always a representable level.
    #[test]
    fn any_reading_maps_to_a_valid_level(raw in any::<u8>(), traditional in any::<bool>()) {
        let curve_sel = if traditional { RvcCurve::Traditional } else { RvcCurve::DefaultWithMute };
        let target = curve::target_for(raw, curve_sel);
        prop_assert!(target.get() <= 64);
    }
}
