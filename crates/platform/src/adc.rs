//! ADC sampling abstraction.
//!
//! The control core sees the ADC as a multiplexed 8-bit sampler: select a
//! channel, run one conversion, read the left-aligned high byte. Conversion
//! wait loops live below this boundary; [`AdcSampler::sample`] returns a
//! completed result. The contract assumes the converter always finishes —
//! a stalled conversion is a watchdog-domain fault, not an error value.

/// Sensor channels of the accessory's ADC mux.
///
/// The discriminants are the physical mux channel numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// Battery-voltage proxy divider (channel 0).
    BatteryMonitor = 0,
    /// Audio output monitor, mid-scale biased (channel 4).
    AudioMonitor = 4,
    /// Remote volume control potentiometer wiper (channel 7).
    VolumeControl = 7,
}

/// Multiplexed 8-bit sensor sampler.
pub trait AdcSampler {
    /// Select `channel`, run one conversion, and return the left-aligned
    /// 8-bit result.
    fn sample(&mut self, channel: AdcChannel) -> u8;

    /// Power the converter up or down.
    ///
    /// The scheduler raises power one tick ahead of each sampling tick so
    /// the converter gets a full 10 ms to settle, and drops it afterwards.
    /// Implementations without a power switch keep the default no-op.
    fn set_powered(&mut self, _on: bool) {}
}
