//! Remote-volume-control path: curve evaluation and anti-pop output.
//!
//! Every attenuation update samples the RVC pot, maps the reading through
//! the selected [curve](crate::modes::RvcCurve), and walks the attenuator
//! from the previous level to the new target one dB at a time with a short
//! settle between steps. Jumping the register in one write is audible as a
//! "zipper" artifact; the 1-dB ramp is not.

pub mod curve;
pub mod lm1971;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use platform::{AdcChannel, AdcSampler};

use crate::modes::{Attenuation, RvcCurve};
use lm1971::AttenuationStepper;

/// Settle time between ramp steps.
pub const RAMP_STEP_DELAY_US: u32 = 50;

/// Curve engine plus ramp state for the attenuation output.
#[derive(Debug, Default)]
pub struct AttenuationEngine {
    /// Level most recently driven into the device.
    current: Attenuation,
    /// Level the previous update ended at — the ramp's starting point.
    previous: Attenuation,
}

impl AttenuationEngine {
    /// Engine starting from unity gain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level most recently driven into the device.
    #[must_use]
    pub fn current(&self) -> Attenuation {
        self.current
    }

    /// Sample the RVC pot and drive the attenuator toward the mapped target.
    ///
    /// With `force` the target is written in a single transfer (used at boot,
    /// before audio is flowing); otherwise the output ramps one dB per step.
    pub fn update<Clk, Dat, Load, E>(
        &mut self,
        adc: &mut impl AdcSampler,
        curve: RvcCurve,
        stepper: &mut AttenuationStepper<Clk, Dat, Load>,
        delay: &mut impl DelayNs,
        force: bool,
    ) -> Result<(), E>
    where
        Clk: OutputPin<Error = E>,
        Dat: OutputPin<Error = E>,
        Load: OutputPin<Error = E>,
    {
        let raw = adc.sample(AdcChannel::VolumeControl);
        let target = curve::target_for(raw, curve);
        self.ramp_to(target, stepper, delay, force)
    }

    /// Walk the device from the previous level to `target`.
    ///
    /// Not-forced transitions step by exactly one dB per transfer, pausing
    /// [`RAMP_STEP_DELAY_US`] between intermediate steps. Equal levels are a
    /// no-op unless forced, which always issues exactly one transfer.
    pub fn ramp_to<Clk, Dat, Load, E>(
        &mut self,
        target: Attenuation,
        stepper: &mut AttenuationStepper<Clk, Dat, Load>,
        delay: &mut impl DelayNs,
        force: bool,
    ) -> Result<(), E>
    where
        Clk: OutputPin<Error = E>,
        Dat: OutputPin<Error = E>,
        Load: OutputPin<Error = E>,
    {
        let from = self.previous.get();
        let to = target.get();
        if force {
            stepper.set(to, delay)?;
        } else if to > from {
            for level in (from.saturating_add(1))..=to {
                stepper.set(level, delay)?;
                if level != to {
                    delay.delay_us(RAMP_STEP_DELAY_US);
                }
            }
        } else if to < from {
            for level in (to..from).rev() {
                stepper.set(level, delay)?;
                if level != to {
                    delay.delay_us(RAMP_STEP_DELAY_US);
                }
            }
        }
        self.previous = target;
        self.current = target;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{Line, NoopDelay, PinLog, RecordingPin};

    type TestStepper = AttenuationStepper<RecordingPin, RecordingPin, RecordingPin>;

    fn stepper(log: &PinLog) -> TestStepper {
        AttenuationStepper::new(
            log.pin(Line::Clock),
            log.pin(Line::Data),
            log.pin(Line::Load),
        )
    }

    /// Register values committed to the device, one per load rising edge,
    /// decoded from the recorded waveform.
    fn committed_levels(log: &PinLog) -> Vec<u8> {
        let mut levels = Vec::new();
        let mut data_level = false;
        let mut bits: Vec<bool> = Vec::new();
        for (line, level) in log.events() {
            match line {
                Line::Data => data_level = level,
                Line::Clock if level => bits.push(data_level),
                Line::Load if level => {
                    let word: Vec<bool> = bits.iter().rev().take(8).rev().copied().collect();
                    levels.push(word.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)));
                    bits.clear();
                }
                _ => {}
            }
        }
        levels
    }

    #[test]
    fn upward_ramp_steps_by_one_to_target() {
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        engine
            .ramp_to(Attenuation::new(4), &mut st, &mut NoopDelay, false)
            .unwrap();
        assert_eq!(committed_levels(&log), vec![1, 2, 3, 4]);
        assert_eq!(engine.current(), Attenuation::new(4));
    }

    #[test]
    fn downward_ramp_steps_by_one_to_target() {
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        engine
            .ramp_to(Attenuation::new(5), &mut st, &mut NoopDelay, true)
            .unwrap();
        log.clear();
        engine
            .ramp_to(Attenuation::new(2), &mut st, &mut NoopDelay, false)
            .unwrap();
        assert_eq!(committed_levels(&log), vec![4, 3, 2]);
    }

    #[test]
    fn force_jumps_in_one_transfer() {
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        engine
            .ramp_to(Attenuation::new(40), &mut st, &mut NoopDelay, true)
            .unwrap();
        assert_eq!(committed_levels(&log), vec![40]);
    }

    #[test]
    fn unchanged_target_is_a_no_op() {
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        engine
            .ramp_to(Attenuation::new(9), &mut st, &mut NoopDelay, true)
            .unwrap();
        log.clear();
        engine
            .ramp_to(Attenuation::new(9), &mut st, &mut NoopDelay, false)
            .unwrap();
        assert!(committed_levels(&log).is_empty());
    }

    #[test]
    fn intermediate_steps_get_the_settle_delay() {
        use platform::mocks::CountingDelay;
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        let mut delay = CountingDelay::new();
        engine
            .ramp_to(Attenuation::new(3), &mut st, &mut delay.clone(), false)
            .unwrap();
        let settles = delay
            .pauses_ns()
            .iter()
            .filter(|&&ns| ns == RAMP_STEP_DELAY_US * 1_000)
            .count();
        // Three steps (1, 2, 3), settles between them only.
        assert_eq!(settles, 2);
    }

    #[test]
    fn update_reads_the_volume_channel() {
        use platform::mocks::MockAdc;
        use platform::AdcChannel;
        let log = PinLog::new();
        let mut st = stepper(&log);
        let mut engine = AttenuationEngine::new();
        let adc = MockAdc::new();
        // Unplugged reading: target stays at unity gain, no transfers.
        adc.set_level(AdcChannel::VolumeControl, 0xFF);
        engine
            .update(
                &mut adc.clone(),
                RvcCurve::DefaultWithMute,
                &mut st,
                &mut NoopDelay,
                false,
            )
            .unwrap();
        assert_eq!(adc.sample_count(AdcChannel::VolumeControl), 1);
        assert!(committed_levels(&log).is_empty());
    }
}
