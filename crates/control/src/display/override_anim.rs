//! Transient override animation.
//!
//! Confirms a curve change by blinking the LED: a dark lead-in, one or two
//! flashes, a dark tail, then normal rendering resumes. While the animation
//! runs it owns the LED exclusively — mode rendering and even the
//! low-battery pattern wait until it finishes.
//!
//! All durations are in render cycles (20 Hz): 10 dark, then per flash
//! 4 on + 4 off, then 10 dark. A two-flash run therefore spans 36 cycles
//! (1.8 s).

use platform::Rgb;

/// Lead-in and tail duration, in render cycles.
const PAUSE_CYCLES: u8 = 10;
/// Flash on/off duration, in render cycles.
const FLASH_CYCLES: u8 = 4;

/// Animation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    /// No animation; normal rendering owns the LED.
    Idle,
    /// Dark lead-in.
    InitialPause,
    /// Flash color on.
    FlashOn,
    /// Dark gap between / after flashes.
    FlashOff,
    /// Dark tail; completing it returns control to normal rendering.
    FinalPause,
}

/// Self-terminating flash sequence that preempts normal rendering.
#[derive(Debug)]
pub struct OverrideAnimation {
    phase: Phase,
    /// Render cycles spent in the current phase.
    elapsed: u8,
    flashes_total: u8,
    flashes_done: u8,
}

impl OverrideAnimation {
    /// An idle animation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            elapsed: 0,
            flashes_total: 0,
            flashes_done: 0,
        }
    }

    /// Whether the animation currently owns the LED.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Begin a run of `flashes` flashes (at least one), restarting any run
    /// already in progress.
    pub fn start(&mut self, flashes: u8) {
        self.phase = Phase::InitialPause;
        self.elapsed = 0;
        self.flashes_total = flashes.max(1);
        self.flashes_done = 0;
    }

    /// Advance one render cycle.
    ///
    /// Returns the frame to display while active, `None` once idle. The
    /// cycle that completes the tail still emits a dark frame; the next
    /// cycle returns `None`.
    pub fn tick(&mut self, flash_color: Rgb) -> Option<Rgb> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        let frame = match self.phase {
            Phase::FlashOn => flash_color,
            _ => Rgb::OFF,
        };
        match self.phase {
            Phase::Idle => {}
            Phase::InitialPause => {
                if self.elapsed >= PAUSE_CYCLES {
                    self.phase = Phase::FlashOn;
                    self.elapsed = 0;
                    self.flashes_done = 0;
                }
            }
            Phase::FlashOn => {
                if self.elapsed >= FLASH_CYCLES {
                    self.phase = Phase::FlashOff;
                    self.elapsed = 0;
                }
            }
            Phase::FlashOff => {
                if self.elapsed >= FLASH_CYCLES {
                    self.flashes_done = self.flashes_done.saturating_add(1);
                    self.phase = if self.flashes_done < self.flashes_total {
                        Phase::FlashOn
                    } else {
                        Phase::FinalPause
                    };
                    self.elapsed = 0;
                }
            }
            Phase::FinalPause => {
                if self.elapsed >= PAUSE_CYCLES {
                    self.phase = Phase::Idle;
                    self.elapsed = 0;
                }
            }
        }
        Some(frame)
    }
}

impl Default for OverrideAnimation {
    fn default() -> Self {
        Self::new()
    }
}
