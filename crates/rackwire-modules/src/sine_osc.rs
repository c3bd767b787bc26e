//! Sine and square oscillator with 1 V/oct pitch.
//!
//! ## Signal Flow
//!
//! ```text
//! pitch = FREQ knob + PITCH input + FM amount × FM input     (volts)
//! f     = C4 × 2^pitch                                        (Hz)
//! phase += f × sample_time                                    (turns, wrapped to [0, 1))
//! SIN   = 5 × sin(2π × phase)
//! SQR   = +5 V for phase < 0.5, else -5 V
//! ```
//!
//! Frequency is clamped below Nyquist so the phase increment never exceeds
//! half a turn.

use core::f32::consts::TAU;

use libm::sinf;
use rackwire_core::math::volts_to_hz;
use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};

/// Peak output voltage.
const AMPLITUDE: f32 = 5.0;

static PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::new("Frequency", -4.0, 4.0, 0.0),
    ParamDescriptor::new("FM amount", 0.0, 1.0, 0.0),
];

/// Audio/LFO oscillator.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Frequency | -4–4 V (octaves around C4) | 0 V |
/// | 1 | FM amount | 0–1 | 0 |
///
/// # Example
///
/// ```rust
/// use rackwire_core::{FrameContext, Module, Ports};
/// use rackwire_modules::SineOsc;
///
/// let mut osc = SineOsc::new();
/// let mut ports = Ports::new(&osc.layout());
/// let frame = FrameContext::new(48000.0);
/// for _ in 0..100 {
///     osc.step(&mut ports, &frame);
/// }
/// assert!(ports.outputs[SineOsc::SIN].value.abs() <= 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SineOsc {
    /// Phase in turns, `[0, 1)`.
    phase: f32,
}

impl SineOsc {
    /// Param: base pitch in volts.
    pub const FREQ: usize = 0;
    /// Param: FM depth.
    pub const FM_AMOUNT: usize = 1;
    /// Input: 1 V/oct pitch.
    pub const PITCH: usize = 0;
    /// Input: frequency modulation.
    pub const FM: usize = 1;
    /// Output: sine, ±5 V.
    pub const SIN: usize = 0;
    /// Output: square, ±5 V.
    pub const SQR: usize = 1;
    /// Light: lit during the positive half-cycle.
    pub const PHASE_LIGHT: usize = 0;

    /// Creates an oscillator at phase 0.
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current phase in turns.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Module for SineOsc {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&PARAMS, 2, 2, 1)
    }

    fn step(&mut self, ports: &mut Ports, frame: &FrameContext) {
        let pitch = ports.param(Self::FREQ)
            + ports.input(Self::PITCH, 0.0)
            + ports.param(Self::FM_AMOUNT) * ports.input(Self::FM, 0.0);
        let freq = volts_to_hz(pitch).min(frame.sample_rate * 0.5);

        ports.set_output(Self::SIN, AMPLITUDE * sinf(TAU * self.phase));
        let square = if self.phase < 0.5 { AMPLITUDE } else { -AMPLITUDE };
        ports.set_output(Self::SQR, square);
        ports.lights[Self::PHASE_LIGHT].set_brightness(if square > 0.0 { 1.0 } else { 0.0 });

        self.phase += freq * frame.sample_time;
        self.phase -= libm::floorf(self.phase);
    }

    fn on_reset(&mut self, _ports: &mut Ports) {
        self.phase = 0.0;
    }
}
