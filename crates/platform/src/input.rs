//! Raw switch input abstraction.

/// Raw digital level of one switch line.
///
/// The accessory's switches short to ground when pressed and idle high on
/// an internal pullup, so `true` (high) means released. The level returned
/// here is the *raw* sample — debouncing is the control core's job.
pub trait SwitchInput {
    /// Read the current line level (`true` = high = released).
    fn is_high(&mut self) -> bool;
}
