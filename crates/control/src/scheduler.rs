//! The 100 Hz tick scheduler and shared device state.
//!
//! The hosting environment (a hardware timer ISR, or the simulator's run
//! loop) calls [`ControlLoop::on_tick`] at the base rate. Everything else
//! fans out from there at fixed sub-rates:
//!
//! | Rate   | Work                                            |
//! |--------|-------------------------------------------------|
//! | 100 Hz | switch debouncing                               |
//! | 20 Hz  | attenuation update, VU sample (VU mode), render |
//! | 1 Hz   | battery sample                                  |
//!
//! Within one tick the order is fixed — debounce, attenuation, VU, render,
//! battery — and everything runs to completion before the tick returns, so
//! no locking exists anywhere in the core. The scheduler owns the shared
//! mode/curve state plus every peripheral handle; subtasks get `&mut`
//! loans, and the scheduler itself performs no I/O.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;
use platform::{AdcSampler, NvSector, RgbLed, SwitchInput};

use crate::attenuation::lm1971::AttenuationStepper;
use crate::attenuation::AttenuationEngine;
use crate::battery::BatteryMonitor;
use crate::display::vu::VuMeter;
use crate::display::DisplayController;
use crate::modes::{Attenuation, LedMode, RvcCurve};
use crate::prefs::{PreferenceStore, Preferences};
use crate::switches::{SwitchBank, SwitchEdge, SwitchEvent, SwitchId};

/// Base tick rate, Hz. The tick counter wraps at this count.
pub const TICK_HZ: u8 = 100;

/// Every this-many ticks: attenuation, VU, render (20 Hz).
pub const RENDER_DIVISOR: u8 = 5;

/// Edge events observed during one tick, surfaced to the host for
/// telemetry. Press events appear here but bind no action.
pub type TickEvents = Vec<SwitchEvent, 4>;

/// The owned aggregate: shared mode state, subcomponent state machines,
/// and every peripheral handle.
pub struct ControlLoop<Adc, ModeSw, CurveSw, Led, Nv, Clk, Dat, Load, D> {
    adc: Adc,
    led: Led,
    delay: D,
    switches: SwitchBank<ModeSw, CurveSw>,
    stepper: AttenuationStepper<Clk, Dat, Load>,
    engine: AttenuationEngine,
    vu: VuMeter,
    display: DisplayController,
    battery: BatteryMonitor,
    prefs: PreferenceStore<Nv>,
    led_mode: LedMode,
    rvc_curve: RvcCurve,
    /// Restored at boot, carried through every persist; no control binds
    /// to it yet.
    rvc_direction_reversed: bool,
    /// 0..TICK_HZ, advanced every tick.
    ticks: u8,
}

impl<Adc, ModeSw, CurveSw, Led, Nv, Clk, Dat, Load, D, E>
    ControlLoop<Adc, ModeSw, CurveSw, Led, Nv, Clk, Dat, Load, D>
where
    Adc: AdcSampler,
    ModeSw: SwitchInput,
    CurveSw: SwitchInput,
    Led: RgbLed,
    Nv: NvSector,
    Clk: OutputPin<Error = E>,
    Dat: OutputPin<Error = E>,
    Load: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Assemble the loop around its peripherals. Call [`Self::init`] before
    /// the first tick.
    #[allow(clippy::too_many_arguments)] // one seam: every peripheral enters here
    pub fn new(
        adc: Adc,
        mode_switch: ModeSw,
        curve_switch: CurveSw,
        led: Led,
        sector: Nv,
        clk: Clk,
        dat: Dat,
        load: Load,
        delay: D,
    ) -> Self {
        Self {
            adc,
            led,
            delay,
            switches: SwitchBank::new(mode_switch, curve_switch),
            stepper: AttenuationStepper::new(clk, dat, load),
            engine: AttenuationEngine::new(),
            vu: VuMeter::new(),
            display: DisplayController::new(),
            battery: BatteryMonitor::new(),
            prefs: PreferenceStore::new(sector),
            led_mode: LedMode::BatteryMonitor,
            rvc_curve: RvcCurve::DefaultWithMute,
            rvc_direction_reversed: false,
            ticks: 0,
        }
    }

    /// Boot-time bring-up: provision and restore preferences, park the
    /// attenuator lines, and force the output to match the knob before the
    /// timer starts.
    ///
    /// Preference failures degrade to defaults; only attenuator pin errors
    /// propagate.
    pub fn init(&mut self) -> Result<(), E> {
        // Provisioning failure is recoverable — read() falls back to
        // defaults and re-derives the cursor.
        let _ = self.prefs.init();
        let restored = self.prefs.read();
        self.led_mode = restored.led_mode;
        self.rvc_curve = restored.rvc_curve;
        self.rvc_direction_reversed = restored.rvc_direction_reversed;
        if self.led_mode == LedMode::VuMeter {
            self.vu.reset_to_full_scale();
        }
        self.stepper.release_lines()?;
        self.engine.update(
            &mut self.adc,
            self.rvc_curve,
            &mut self.stepper,
            &mut self.delay,
            true,
        )
    }

    /// One 100 Hz tick. Invoked from the timer interrupt; runs to
    /// completion.
    pub fn on_tick(&mut self) -> Result<TickEvents, E> {
        let events = self.switches.poll();
        for event in &events {
            self.handle_switch_event(*event);
        }

        let phase = self.ticks % RENDER_DIVISOR;

        // Power the converter up one tick ahead of each sampling tick for
        // 10 ms of settling: phase 4 covers the next 20 Hz frame, and tick
        // 98 covers the battery sample at the end of the wrap tick.
        if phase == RENDER_DIVISOR - 1 || self.ticks == TICK_HZ - 2 {
            self.adc.set_powered(true);
        }

        if phase == 0 {
            self.engine.update(
                &mut self.adc,
                self.rvc_curve,
                &mut self.stepper,
                &mut self.delay,
                false,
            )?;
            if self.led_mode == LedMode::VuMeter {
                self.vu.sample(&mut self.adc);
            }
            self.display
                .render(self.led_mode, &self.battery, &mut self.vu, &mut self.led);
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks >= TICK_HZ {
            self.ticks = 0;
            self.battery.sample(&mut self.adc);
        }

        // Sampling is done for this frame; drop converter power.
        if self.ticks % RENDER_DIVISOR == 1 {
            self.adc.set_powered(false);
        }

        Ok(events)
    }

    /// Active LED mode.
    #[must_use]
    pub fn led_mode(&self) -> LedMode {
        self.led_mode
    }

    /// Active RVC curve.
    #[must_use]
    pub fn rvc_curve(&self) -> RvcCurve {
        self.rvc_curve
    }

    /// Level most recently driven into the attenuator.
    #[must_use]
    pub fn attenuation(&self) -> Attenuation {
        self.engine.current()
    }

    /// Battery monitor state.
    #[must_use]
    pub fn battery(&self) -> &BatteryMonitor {
        &self.battery
    }

    /// Whether the override animation currently owns the LED.
    #[must_use]
    pub fn override_active(&self) -> bool {
        self.display.override_active()
    }

    fn handle_switch_event(&mut self, event: SwitchEvent) {
        // Presses are reported upward but bind no action yet.
        if event.edge != SwitchEdge::Released {
            return;
        }
        match event.switch {
            SwitchId::Mode => {
                self.led_mode = self.led_mode.next();
                if self.led_mode == LedMode::VuMeter {
                    // Start bright and let it decay.
                    self.vu.reset_to_full_scale();
                }
                #[cfg(feature = "defmt")]
                defmt::debug!("led mode -> {}", self.led_mode);
                self.persist();
            }
            SwitchId::Curve => {
                self.rvc_curve = self.rvc_curve.toggled();
                self.display
                    .start_override(self.rvc_curve.flash_count(), &mut self.led);
                #[cfg(feature = "defmt")]
                defmt::debug!("rvc curve -> {}", self.rvc_curve);
                self.persist();
            }
        }
    }

    /// Append the current mode state to the preference log. Failure is
    /// non-fatal: the device keeps running on live state and the next
    /// successful change persists everything again.
    fn persist(&mut self) {
        let record = Preferences {
            rvc_direction_reversed: self.rvc_direction_reversed,
            led_mode: self.led_mode,
            rvc_curve: self.rvc_curve,
        };
        if self.prefs.write(record).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("preference write failed, running on live state");
        }
    }
}
