//! Desktop simulator: the control core wired to mock peripherals.
//!
//! Drives [`control::ControlLoop::on_tick`] exactly as the 100 Hz timer
//! would, through a scripted scenario — knob sweep, mode clicks, a curve
//! toggle, a battery sag — and reports switch events, LED frames, and
//! attenuator levels through `tracing`.
//!
//! ```text
//! cargo run -p simulator            # default 1200 ticks (12 s of device time)
//! cargo run -p simulator -- 3000    # longer run
//! RUST_LOG=debug cargo run -p simulator
//! ```

// Desktop tooling: panics are acceptable crash reports here.
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use control::{ControlLoop, TickEvents};
use platform::mocks::{Line, MockAdc, MockNvSector, MockRgb, MockSwitch, NoopDelay, PinLog};
use platform::{AdcChannel, Rgb};
use tracing::{debug, info};

/// One scripted stimulus, applied before the given tick runs.
struct Cue {
    at_tick: u32,
    describe: &'static str,
    apply: Box<dyn Fn(&Peripherals)>,
}

/// The mock bench the loop is wired to.
struct Peripherals {
    adc: MockAdc,
    mode_sw: MockSwitch,
    curve_sw: MockSwitch,
    led: MockRgb,
    sector: MockNvSector,
}

fn scenario() -> Vec<Cue> {
    let press = |sw: fn(&Peripherals) -> &MockSwitch, down: bool| {
        move |p: &Peripherals| sw(p).set_pressed(down)
    };
    vec![
        Cue {
            at_tick: 100,
            describe: "knob turned toward quiet",
            apply: Box::new(|p| p.adc.set_level(AdcChannel::VolumeControl, 120)),
        },
        Cue {
            at_tick: 200,
            describe: "mode switch down",
            apply: Box::new(press(|p| &p.mode_sw, true)),
        },
        Cue {
            at_tick: 210,
            describe: "mode switch up (battery monitor -> VU meter)",
            apply: Box::new(press(|p| &p.mode_sw, false)),
        },
        Cue {
            at_tick: 300,
            describe: "audio signal present",
            apply: Box::new(|p| p.adc.set_level(AdcChannel::AudioMonitor, 0xB0)),
        },
        Cue {
            at_tick: 500,
            describe: "audio signal gone (watch the decay)",
            apply: Box::new(|p| p.adc.set_level(AdcChannel::AudioMonitor, 0x80)),
        },
        Cue {
            at_tick: 600,
            describe: "curve switch down",
            apply: Box::new(press(|p| &p.curve_sw, true)),
        },
        Cue {
            at_tick: 610,
            describe: "curve switch up (default -> traditional, 2 flashes)",
            apply: Box::new(press(|p| &p.curve_sw, false)),
        },
        Cue {
            at_tick: 900,
            describe: "knob back to loud",
            apply: Box::new(|p| p.adc.set_level(AdcChannel::VolumeControl, 10)),
        },
        Cue {
            at_tick: 1000,
            describe: "battery sagging below the red watermark",
            apply: Box::new(|p| p.adc.set_level(AdcChannel::BatteryMonitor, 80)),
        },
    ]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ticks: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse().expect("tick count must be a number"))
        .unwrap_or(1200);

    let bench = Peripherals {
        adc: MockAdc::new(),
        mode_sw: MockSwitch::new(),
        curve_sw: MockSwitch::new(),
        led: MockRgb::new(),
        sector: MockNvSector::new(),
    };
    // Healthy battery, knob wide open, quiet audio input.
    bench.adc.set_level(AdcChannel::BatteryMonitor, 105);
    bench.adc.set_level(AdcChannel::VolumeControl, 10);
    bench.adc.set_level(AdcChannel::AudioMonitor, 0x80);

    let pins = PinLog::new();
    let mut device = ControlLoop::new(
        bench.adc.clone(),
        bench.mode_sw.clone(),
        bench.curve_sw.clone(),
        bench.led.clone(),
        bench.sector.clone(),
        pins.pin(Line::Clock),
        pins.pin(Line::Data),
        pins.pin(Line::Load),
        NoopDelay,
    );

    device.init().expect("attenuator pins are infallible mocks");
    info!(
        mode = ?device.led_mode(),
        curve = ?device.rvc_curve(),
        attenuation_db = device.attenuation().get(),
        "boot complete"
    );

    let cues = scenario();
    let mut last_frame: Option<Rgb> = None;
    let mut last_level = device.attenuation();

    for tick in 0..ticks {
        for cue in cues.iter().filter(|c| c.at_tick == tick) {
            info!(tick, "cue: {}", cue.describe);
            (cue.apply)(&bench);
        }

        let events: TickEvents = device.on_tick().expect("attenuator pins are infallible mocks");
        for event in &events {
            info!(tick, ?event, "switch edge");
        }

        let level = device.attenuation();
        if level != last_level {
            info!(tick, db = level.get(), "attenuation settled");
            last_level = level;
        }

        let frame = bench.led.last();
        if frame != last_frame {
            if let Some(rgb) = frame {
                debug!(tick, r = rgb.r, g = rgb.g, b = rgb.b, "led frame");
            }
            last_frame = frame;
        }
    }

    info!(
        ticks,
        mode = ?device.led_mode(),
        curve = ?device.rvc_curve(),
        records_written = bench.sector.write_count(),
        led_frames = bench.led.frame_count(),
        "scenario complete"
    );
}
