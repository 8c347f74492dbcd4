//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits for use
//! in unit and integration tests and in the host simulator.
//!
//! Every mock is a cheap clone-able handle over shared interior state
//! (`Rc<RefCell<_>>`), because the control loop takes ownership of its
//! peripherals: the test keeps a clone, the control loop gets the other, and
//! both see the same state. Same pattern as `embedded-hal-mock`'s shared
//! pins, without the transaction scripting.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::unwrap_used)] // test doubles; a poisoned RefCell is a test bug
#![allow(clippy::indexing_slicing)] // channel_index() ∈ 0..3, arrays are [_; 3]
#![allow(clippy::arithmetic_side_effects)] // counters saturate far beyond test scale

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::adc::{AdcChannel, AdcSampler};
use crate::input::SwitchInput;
use crate::led::{Rgb, RgbLed};
use crate::nvmem::{NvError, NvSector};

// ── MockAdc ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct AdcInner {
    /// Steady level returned once a channel's script runs dry.
    levels: [u8; 3],
    /// Per-channel scripted samples, consumed front-first.
    scripts: [VecDeque<u8>; 3],
    sample_counts: [u32; 3],
    powered: bool,
    power_transitions: u32,
}

fn channel_index(channel: AdcChannel) -> usize {
    match channel {
        AdcChannel::BatteryMonitor => 0,
        AdcChannel::AudioMonitor => 1,
        AdcChannel::VolumeControl => 2,
    }
}

/// Scripted ADC: per-channel sample queues with a steady fallback level.
#[derive(Clone, Default)]
pub struct MockAdc {
    inner: Rc<RefCell<AdcInner>>,
}

impl MockAdc {
    /// Create an ADC whose channels all read 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the steady level a channel reads once its script is exhausted.
    pub fn set_level(&self, channel: AdcChannel, level: u8) {
        self.inner.borrow_mut().levels[channel_index(channel)] = level;
    }

    /// Queue scripted samples for a channel, consumed one per conversion.
    pub fn push_script(&self, channel: AdcChannel, samples: impl IntoIterator<Item = u8>) {
        self.inner.borrow_mut().scripts[channel_index(channel)].extend(samples);
    }

    /// Number of conversions run on a channel so far.
    #[must_use]
    pub fn sample_count(&self, channel: AdcChannel) -> u32 {
        self.inner.borrow().sample_counts[channel_index(channel)]
    }

    /// Current converter power state.
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.inner.borrow().powered
    }
}

impl AdcSampler for MockAdc {
    fn sample(&mut self, channel: AdcChannel) -> u8 {
        let mut inner = self.inner.borrow_mut();
        let idx = channel_index(channel);
        inner.sample_counts[idx] += 1;
        let steady = inner.levels[idx];
        inner.scripts[idx].pop_front().unwrap_or(steady)
    }

    fn set_powered(&mut self, on: bool) {
        let mut inner = self.inner.borrow_mut();
        if inner.powered != on {
            inner.power_transitions += 1;
        }
        inner.powered = on;
    }
}

// ── MockSwitch ──────────────────────────────────────────────────────────────

/// One switch line with an externally settable level.
///
/// Starts released (high — the hardware idles on a pullup).
#[derive(Clone)]
pub struct MockSwitch {
    level: Rc<RefCell<bool>>,
}

impl MockSwitch {
    /// Create a released (high) switch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: Rc::new(RefCell::new(true)),
        }
    }

    /// Drive the raw line: pressed shorts to ground (low).
    pub fn set_pressed(&self, pressed: bool) {
        *self.level.borrow_mut() = !pressed;
    }
}

impl Default for MockSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchInput for MockSwitch {
    fn is_high(&mut self) -> bool {
        *self.level.borrow()
    }
}

// ── MockRgb ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RgbInner {
    frames: Vec<Rgb>,
    last: Option<Rgb>,
}

/// Records every LED frame programmed by the display controller.
#[derive(Clone, Default)]
pub struct MockRgb {
    inner: Rc<RefCell<RgbInner>>,
}

impl MockRgb {
    /// Create an LED with no frames recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently programmed frame.
    #[must_use]
    pub fn last(&self) -> Option<Rgb> {
        self.inner.borrow().last
    }

    /// All frames programmed so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<Rgb> {
        self.inner.borrow().frames.clone()
    }

    /// Number of frames programmed so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    /// Forget recorded frames (keeps the last-programmed level).
    pub fn clear(&self) {
        self.inner.borrow_mut().frames.clear();
    }
}

impl RgbLed for MockRgb {
    fn set(&mut self, rgb: Rgb) {
        let mut inner = self.inner.borrow_mut();
        inner.frames.push(rgb);
        inner.last = Some(rgb);
    }
}

// ── MockNvSector ────────────────────────────────────────────────────────────

/// Size of the mock sector, matching the preference sector geometry.
pub const MOCK_SECTOR_LEN: usize = 512;

struct NvInner {
    bytes: [u8; MOCK_SECTOR_LEN],
    write_count: u32,
    erase_count: u32,
    fail_next_write: bool,
    fail_next_erase: bool,
}

/// In-memory flash-class sector: erased to 0xFF, programming clears bits,
/// with injectable command failures.
#[derive(Clone)]
pub struct MockNvSector {
    inner: Rc<RefCell<NvInner>>,
}

impl MockNvSector {
    /// Create a fully erased sector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(NvInner {
                bytes: [0xFF; MOCK_SECTOR_LEN],
                write_count: 0,
                erase_count: 0,
                fail_next_write: false,
                fail_next_erase: false,
            })),
        }
    }

    /// Peek a byte without going through the trait (no failure injection).
    #[must_use]
    pub fn peek(&self, offset: u16) -> u8 {
        self.inner.borrow().bytes[usize::from(offset)]
    }

    /// Number of successful byte programs.
    #[must_use]
    pub fn write_count(&self) -> u32 {
        self.inner.borrow().write_count
    }

    /// Number of successful sector erases.
    #[must_use]
    pub fn erase_count(&self) -> u32 {
        self.inner.borrow().erase_count
    }

    /// Make the next program command fail with the busy flag.
    pub fn fail_next_write(&self) {
        self.inner.borrow_mut().fail_next_write = true;
    }

    /// Make the next erase command fail with the busy flag.
    pub fn fail_next_erase(&self) {
        self.inner.borrow_mut().fail_next_erase = true;
    }
}

impl Default for MockNvSector {
    fn default() -> Self {
        Self::new()
    }
}

impl NvSector for MockNvSector {
    type Error = NvError;

    fn read_byte(&mut self, offset: u16) -> Result<u8, Self::Error> {
        self.inner
            .borrow()
            .bytes
            .get(usize::from(offset))
            .copied()
            .ok_or(NvError::Busy)
    }

    fn write_byte(&mut self, offset: u16, value: u8) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_write {
            inner.fail_next_write = false;
            return Err(NvError::Busy);
        }
        let Some(slot) = inner.bytes.get_mut(usize::from(offset)) else {
            return Err(NvError::Busy);
        };
        // Flash semantics: programming can only clear bits.
        *slot &= value;
        inner.write_count += 1;
        Ok(())
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_erase {
            inner.fail_next_erase = false;
            return Err(NvError::Busy);
        }
        inner.bytes = [0xFF; MOCK_SECTOR_LEN];
        inner.erase_count += 1;
        Ok(())
    }
}

// ── Pin waveform recording ──────────────────────────────────────────────────

/// Which attenuator line a recorded transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// Serial clock.
    Clock,
    /// Serial data.
    Data,
    /// Transfer latch.
    Load,
}

/// Shared, ordered log of pin transitions across all three lines.
#[derive(Clone, Default)]
pub struct PinLog {
    events: Rc<RefCell<Vec<(Line, bool)>>>,
}

impl PinLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording pin for `line`, feeding this log.
    #[must_use]
    pub fn pin(&self, line: Line) -> RecordingPin {
        RecordingPin {
            line,
            log: self.events.clone(),
        }
    }

    /// All transitions so far, in program order.
    #[must_use]
    pub fn events(&self) -> Vec<(Line, bool)> {
        self.events.borrow().clone()
    }

    /// Drop recorded transitions.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// `OutputPin` that appends its transitions to a shared [`PinLog`].
pub struct RecordingPin {
    line: Line,
    log: Rc<RefCell<Vec<(Line, bool)>>>,
}

impl embedded_hal::digital::ErrorType for RecordingPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.line, true));
        Ok(())
    }
}

// ── Delays ──────────────────────────────────────────────────────────────────

/// Delay provider that returns immediately (host tests have no bus timing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Delay provider that records every requested pause in nanoseconds.
#[derive(Clone, Default)]
pub struct CountingDelay {
    pauses: Rc<RefCell<Vec<u32>>>,
}

impl CountingDelay {
    /// Create a delay with no pauses recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in nanoseconds, oldest first.
    #[must_use]
    pub fn pauses_ns(&self) -> Vec<u32> {
        self.pauses.borrow().clone()
    }
}

impl embedded_hal::delay::DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pauses.borrow_mut().push(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvmem::NvSector as _;

    #[test]
    fn nv_sector_programming_only_clears_bits() {
        let sector = MockNvSector::new();
        let mut handle = sector.clone();
        assert_eq!(handle.read_byte(0).unwrap(), 0xFF);
        handle.write_byte(0, 0b0101_0101).unwrap();
        // A second program cannot set bits back.
        handle.write_byte(0, 0b1111_0000).unwrap();
        assert_eq!(sector.peek(0), 0b0101_0000);
    }

    #[test]
    fn nv_sector_erase_restores_all_ones() {
        let sector = MockNvSector::new();
        let mut handle = sector.clone();
        handle.write_byte(3, 0).unwrap();
        handle.erase().unwrap();
        assert_eq!(sector.peek(3), 0xFF);
        assert_eq!(sector.erase_count(), 1);
    }

    #[test]
    fn nv_sector_injected_failure_fires_once() {
        let sector = MockNvSector::new();
        let mut handle = sector.clone();
        sector.fail_next_write();
        assert_eq!(handle.write_byte(0, 0), Err(NvError::Busy));
        assert_eq!(handle.write_byte(0, 0), Ok(()));
        assert_eq!(sector.write_count(), 1);
    }

    #[test]
    fn adc_scripts_drain_before_the_steady_level() {
        let adc = MockAdc::new();
        adc.set_level(AdcChannel::VolumeControl, 7);
        adc.push_script(AdcChannel::VolumeControl, [1, 2]);
        let mut handle = adc.clone();
        assert_eq!(handle.sample(AdcChannel::VolumeControl), 1);
        assert_eq!(handle.sample(AdcChannel::VolumeControl), 2);
        assert_eq!(handle.sample(AdcChannel::VolumeControl), 7);
        assert_eq!(adc.sample_count(AdcChannel::VolumeControl), 3);
    }

    #[test]
    fn pin_log_preserves_cross_line_ordering() {
        use embedded_hal::digital::OutputPin as _;
        let log = PinLog::new();
        let mut clk = log.pin(Line::Clock);
        let mut dat = log.pin(Line::Data);
        dat.set_high().unwrap();
        clk.set_low().unwrap();
        assert_eq!(
            log.events(),
            vec![(Line::Data, true), (Line::Clock, false)]
        );
    }
}
