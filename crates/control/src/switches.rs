//! Switch debouncing and edge events.
//!
//! Both panel switches idle high on a pullup and short to ground when
//! pressed. Each raw sample is compared against the committed state; five
//! consecutive contrary samples (50 ms at the 100 Hz tick rate) commit the
//! new state and emit an edge event. A single agreeing sample restarts the
//! window.

use heapless::Vec;
use platform::SwitchInput;

/// Consecutive contrary samples required to commit a new switch state.
pub const DEBOUNCE_SAMPLES: u8 = 5;

/// Which panel switch an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchId {
    /// Left switch: cycles the LED mode.
    Mode,
    /// Right switch: toggles the RVC curve.
    Curve,
}

/// A debounced switch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchEdge {
    /// Committed high-to-low transition (switch closed).
    Pressed,
    /// Committed low-to-high transition (switch opened).
    Released,
}

/// A debounced edge on a specific switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchEvent {
    /// Which switch transitioned.
    pub switch: SwitchId,
    /// Direction of the transition.
    pub edge: SwitchEdge,
}

/// Edge events produced by one tick, at most one per switch.
pub type SwitchEvents = Vec<SwitchEvent, 4>;

/// Debounce state for one input line.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Committed (debounced) level; starts high (released, pulled up).
    stable_high: bool,
    /// Consecutive samples disagreeing with the committed level.
    mismatch: u8,
}

impl Debouncer {
    /// A debouncer committed to the released (high) level.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stable_high: true,
            mismatch: 0,
        }
    }

    /// The committed level.
    #[must_use]
    pub fn is_high(&self) -> bool {
        self.stable_high
    }

    /// Feed one raw sample; returns the edge when a new level commits.
    pub fn update(&mut self, raw_high: bool) -> Option<SwitchEdge> {
        if raw_high == self.stable_high {
            // Any agreeing sample restarts the debounce window.
            self.mismatch = 0;
            return None;
        }
        self.mismatch = self.mismatch.saturating_add(1);
        if self.mismatch < DEBOUNCE_SAMPLES {
            return None;
        }
        self.stable_high = raw_high;
        self.mismatch = 0;
        Some(if raw_high {
            SwitchEdge::Released
        } else {
            SwitchEdge::Pressed
        })
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

/// The two panel switches with their debounce state.
pub struct SwitchBank<M, C> {
    mode_pin: M,
    curve_pin: C,
    mode: Debouncer,
    curve: Debouncer,
}

impl<M: SwitchInput, C: SwitchInput> SwitchBank<M, C> {
    /// Wrap the two raw inputs; both start committed to released.
    pub fn new(mode_pin: M, curve_pin: C) -> Self {
        Self {
            mode_pin,
            curve_pin,
            mode: Debouncer::new(),
            curve: Debouncer::new(),
        }
    }

    /// Sample both lines once and return any committed edges.
    pub fn poll(&mut self) -> SwitchEvents {
        let mut events = SwitchEvents::new();
        if let Some(edge) = self.mode.update(self.mode_pin.is_high()) {
            events
                .push(SwitchEvent {
                    switch: SwitchId::Mode,
                    edge,
                })
                .ok();
        }
        if let Some(edge) = self.curve.update(self.curve_pin.is_high()) {
            events
                .push(SwitchEvent {
                    switch: SwitchId::Curve,
                    edge,
                })
                .ok();
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_only_after_five_contrary_samples() {
        let mut db = Debouncer::new();
        for _ in 0..4 {
            assert_eq!(db.update(false), None);
        }
        assert_eq!(db.update(false), Some(SwitchEdge::Pressed));
        assert!(!db.is_high());
    }

    #[test]
    fn single_agreeing_sample_restarts_window() {
        let mut db = Debouncer::new();
        for _ in 0..4 {
            assert_eq!(db.update(false), None);
        }
        // Bounce back to the committed level: the count restarts.
        assert_eq!(db.update(true), None);
        for _ in 0..4 {
            assert_eq!(db.update(false), None);
        }
        assert_eq!(db.update(false), Some(SwitchEdge::Pressed));
    }

    #[test]
    fn release_edge_after_press() {
        let mut db = Debouncer::new();
        for _ in 0..5 {
            db.update(false);
        }
        for _ in 0..4 {
            assert_eq!(db.update(true), None);
        }
        assert_eq!(db.update(true), Some(SwitchEdge::Released));
        assert!(db.is_high());
    }

    #[test]
    fn steady_level_emits_nothing() {
        let mut db = Debouncer::new();
        for _ in 0..100 {
            assert_eq!(db.update(true), None);
        }
    }
}
