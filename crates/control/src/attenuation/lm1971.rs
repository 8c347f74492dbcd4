//! LM1971-class digitally controlled audio attenuator driver.
//!
//! The device hangs off a 3-wire interface (clock, data, load) and holds a
//! single 8-bit attenuation register: `0x00` = 0 dB, one dB per step, and
//! values at or above [`MUTE_CODE`] engage the mute tier.
//!
//! # Transfer format
//!
//! A transfer is an 8-bit address field followed by the 8-bit register
//! value, MSB first. The device has exactly one addressable register, so
//! the address bits are don't-care and are clocked out as zero. Data is
//! presented while the clock is low and sampled by the device on the rising
//! clock edge; raising load commits the shifted value.
//!
//! # Timing contract
//!
//! | Parameter                    | Minimum |
//! |------------------------------|---------|
//! | load low → first clock high  | 200 ns  |
//! | data valid → clock high      | 100 ns  |
//! | data hold after clock high   | 50 ns   |
//!
//! These are met through the injected [`DelayNs`] rather than counted
//! instructions, so the driver is correct at any core clock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

/// Register value at which the device stops attenuating and mutes.
pub const MUTE_CODE: u8 = 63;

/// Data setup before the rising clock edge.
const T_DATA_SETUP_NS: u32 = 100;
/// Data hold after the rising clock edge.
const T_DATA_HOLD_NS: u32 = 50;
/// Load low to the first rising clock edge.
const T_LOAD_SETUP_NS: u32 = 200;

/// Bit-serial driver for the attenuator's 3-wire interface.
///
/// All three lines must share an error type; on most targets that is
/// `Infallible`.
pub struct AttenuationStepper<Clk, Dat, Load> {
    clk: Clk,
    dat: Dat,
    load: Load,
}

impl<Clk, Dat, Load, E> AttenuationStepper<Clk, Dat, Load>
where
    Clk: OutputPin<Error = E>,
    Dat: OutputPin<Error = E>,
    Load: OutputPin<Error = E>,
{
    /// Take ownership of the three interface lines.
    pub fn new(clk: Clk, dat: Dat, load: Load) -> Self {
        Self { clk, dat, load }
    }

    /// Release the three interface lines.
    pub fn free(self) -> (Clk, Dat, Load) {
        (self.clk, self.dat, self.load)
    }

    /// Drive all three lines to their idle-high level.
    ///
    /// Call once at power-up, before the first transfer.
    pub fn release_lines(&mut self) -> Result<(), E> {
        self.load.set_high()?;
        self.clk.set_high()?;
        self.dat.set_high()
    }

    /// Shift one attenuation value into the device and commit it.
    ///
    /// `0` is unity gain; `MUTE_CODE` and above mute. The whole transfer is
    /// a bounded busy-wait (16 clocks plus the listed setup/hold pauses) —
    /// well under the tick period at any plausible delay resolution.
    pub fn set(&mut self, atten_db: u8, delay: &mut impl DelayNs) -> Result<(), E> {
        // Open the transfer: clock must fall before load does.
        self.clk.set_low()?;
        self.dat.set_low()?;
        self.load.set_low()?;
        delay.delay_ns(T_LOAD_SETUP_NS);

        // Address field: eight clocks with data held low. The value is
        // don't-care — the device decodes a single register.
        for _ in 0..8 {
            self.clk.set_high()?;
            delay.delay_ns(T_DATA_HOLD_NS);
            self.clk.set_low()?;
            delay.delay_ns(T_DATA_HOLD_NS);
        }

        // Register value, MSB first, sampled on each rising edge.
        for bit in (0..8u8).rev() {
            let level = (atten_db >> bit) & 1 == 1;
            self.dat.set_state(PinState::from(level))?;
            delay.delay_ns(T_DATA_SETUP_NS);
            self.clk.set_high()?;
            delay.delay_ns(T_DATA_HOLD_NS);
            self.clk.set_low()?;
        }

        // Commit, then return data to its idle-high level.
        self.load.set_high()?;
        self.dat.set_high()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::{Line, NoopDelay, PinLog};

    fn stepper_with_log() -> (
        AttenuationStepper<
            platform::mocks::RecordingPin,
            platform::mocks::RecordingPin,
            platform::mocks::RecordingPin,
        >,
        PinLog,
    ) {
        let log = PinLog::new();
        let stepper = AttenuationStepper::new(
            log.pin(Line::Clock),
            log.pin(Line::Data),
            log.pin(Line::Load),
        );
        (stepper, log)
    }

    /// Rising clock edges in the log, paired with the data level each edge
    /// sampled (the last data transition before the edge).
    fn sampled_bits(events: &[(Line, bool)]) -> Vec<bool> {
        let mut data_level = false;
        let mut bits = Vec::new();
        for &(line, level) in events {
            match line {
                Line::Data => data_level = level,
                Line::Clock if level => bits.push(data_level),
                _ => {}
            }
        }
        bits
    }

    #[test]
    fn transfer_has_sixteen_rising_clock_edges() {
        let (mut stepper, log) = stepper_with_log();
        stepper.set(0x2A, &mut NoopDelay).unwrap();
        let rising = log
            .events()
            .iter()
            .filter(|&&(line, level)| line == Line::Clock && level)
            .count();
        assert_eq!(rising, 16, "8 address clocks + 8 data clocks");
    }

    #[test]
    fn data_bits_are_msb_first_after_zero_address() {
        let (mut stepper, log) = stepper_with_log();
        stepper.set(0b1010_0101, &mut NoopDelay).unwrap();
        let bits = sampled_bits(&log.events());
        assert_eq!(bits.len(), 16);
        assert!(bits[..8].iter().all(|&b| !b), "address field is zero");
        let value: u8 = bits[8..]
            .iter()
            .fold(0, |acc, &b| (acc << 1) | u8::from(b));
        assert_eq!(value, 0b1010_0101);
    }

    #[test]
    fn load_frames_the_transfer() {
        let (mut stepper, log) = stepper_with_log();
        stepper.set(7, &mut NoopDelay).unwrap();
        let events = log.events();
        let load_edges: Vec<bool> = events
            .iter()
            .filter(|(line, _)| *line == Line::Load)
            .map(|&(_, level)| level)
            .collect();
        assert_eq!(load_edges, [false, true], "load dips exactly once");
        // Clock falls before load does at the start of the transfer.
        let first_clk_low = events
            .iter()
            .position(|&(l, s)| l == Line::Clock && !s)
            .unwrap();
        let load_low = events
            .iter()
            .position(|&(l, s)| l == Line::Load && !s)
            .unwrap();
        assert!(first_clk_low < load_low);
        // No clock edge after the commit.
        let load_high = events
            .iter()
            .rposition(|&(l, s)| l == Line::Load && s)
            .unwrap();
        assert!(events[load_high..]
            .iter()
            .all(|&(l, _)| l != Line::Clock));
    }

    #[test]
    fn data_idles_high_after_transfer() {
        let (mut stepper, log) = stepper_with_log();
        stepper.set(0, &mut NoopDelay).unwrap();
        let last_data = log
            .events()
            .iter()
            .rev()
            .find(|(line, _)| *line == Line::Data)
            .map(|&(_, level)| level);
        assert_eq!(last_data, Some(true));
    }

    #[test]
    fn per_pin_transition_sequence_for_zero_value() {
        use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

        // Clock: one opening fall, then 16 high/low pairs.
        let mut clk_expect = vec![Transaction::set(State::Low)];
        for _ in 0..16 {
            clk_expect.push(Transaction::set(State::High));
            clk_expect.push(Transaction::set(State::Low));
        }
        // Data: opening fall, eight zero bits, idle-high close.
        let mut dat_expect = vec![Transaction::set(State::Low)];
        dat_expect.extend(core::iter::repeat(Transaction::set(State::Low)).take(8));
        dat_expect.push(Transaction::set(State::High));
        // Load: one dip framing the transfer.
        let load_expect = vec![Transaction::set(State::Low), Transaction::set(State::High)];

        let mut stepper = AttenuationStepper::new(
            PinMock::new(&clk_expect),
            PinMock::new(&dat_expect),
            PinMock::new(&load_expect),
        );
        stepper.set(0, &mut NoopDelay).unwrap();
        let (mut clk, mut dat, mut load) = stepper.free();
        clk.done();
        dat.done();
        load.done();
    }

    #[test]
    fn release_lines_drives_all_high() {
        let (mut stepper, log) = stepper_with_log();
        stepper.release_lines().unwrap();
        assert_eq!(
            log.events(),
            vec![(Line::Load, true), (Line::Clock, true), (Line::Data, true)]
        );
    }
}
