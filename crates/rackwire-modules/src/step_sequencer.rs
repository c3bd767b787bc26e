//! Eight-step CV/gate sequencer.
//!
//! Each rising edge on CLOCK advances to the next step, wrapping after
//! `Steps` steps. A rising edge on RESET returns to step 0. The CV output
//! holds the current step's knob voltage; the GATE output is high (10 V) while
//! the clock is high and the current step's gate is enabled.
//!
//! The per-step gate switches and the current position are not params: they
//! are persisted through the module's JSON data as
//! `{"gates": [true, false, ...], "step": 3}`.

use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};
use serde_json::{Value, json};

use crate::trigger::SchmittTrigger;

/// Number of steps.
pub const STEPS: usize = 8;

/// Gate output high level.
const GATE_VOLTS: f32 = 10.0;

static PARAMS: [ParamDescriptor; STEPS + 1] = [
    ParamDescriptor::new("Steps", 1.0, STEPS as f32, STEPS as f32)
        .stepped()
        .fixed(),
    ParamDescriptor::new("Step 1", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 2", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 3", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 4", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 5", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 6", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 7", 0.0, 10.0, 0.0),
    ParamDescriptor::new("Step 8", 0.0, 10.0, 0.0),
];

/// Clocked step sequencer.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Steps | 1–8 (stepped, not randomized) | 8 |
/// | 1–8 | Step 1–8 | 0–10 V | 0 V |
///
/// Lights 0–7 mark the current step.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    index: usize,
    gates: [bool; STEPS],
    clock: SchmittTrigger,
    reset: SchmittTrigger,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    /// Param: active step count.
    pub const STEP_COUNT: usize = 0;
    /// Input: advance on rising edge.
    pub const CLOCK: usize = 0;
    /// Input: return to step 0 on rising edge.
    pub const RESET: usize = 1;
    /// Output: current step voltage.
    pub const CV: usize = 0;
    /// Output: gate.
    pub const GATE: usize = 1;

    /// Creates a sequencer at step 0 with every gate enabled.
    pub fn new() -> Self {
        Self {
            index: 0,
            gates: [true; STEPS],
            clock: SchmittTrigger::new(),
            reset: SchmittTrigger::new(),
        }
    }

    /// Param id of step `n`'s voltage knob.
    pub const fn step_param(n: usize) -> usize {
        1 + n
    }

    /// Current step, zero-based.
    pub fn current_step(&self) -> usize {
        self.index
    }

    /// Whether step `n` emits a gate.
    pub fn gate(&self, n: usize) -> bool {
        self.gates.get(n).copied().unwrap_or(false)
    }

    /// Enables or disables step `n`'s gate.
    pub fn set_gate(&mut self, n: usize, enabled: bool) {
        if let Some(g) = self.gates.get_mut(n) {
            *g = enabled;
        }
    }

    fn step_count(ports: &Ports) -> usize {
        (ports.param(Self::STEP_COUNT).round() as usize).clamp(1, STEPS)
    }
}

impl Module for StepSequencer {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&PARAMS, 2, 2, STEPS)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let steps = Self::step_count(ports);

        if self.reset.process(ports.input(Self::RESET, 0.0)) {
            self.index = 0;
        }
        if self.clock.process(ports.input(Self::CLOCK, 0.0)) {
            self.index += 1;
        }
        if self.index >= steps {
            self.index = 0;
        }

        ports.set_output(Self::CV, ports.param(Self::step_param(self.index)));
        let gate = self.clock.is_high() && self.gates[self.index];
        ports.set_output(Self::GATE, if gate { GATE_VOLTS } else { 0.0 });
        for (n, light) in ports.lights.iter_mut().enumerate() {
            light.set_brightness(if n == self.index { 1.0 } else { 0.0 });
        }
    }

    fn on_reset(&mut self, _ports: &mut Ports) {
        self.index = 0;
        self.gates = [true; STEPS];
        self.clock.reset();
        self.reset.reset();
    }

    fn data_to_json(&self) -> Option<Value> {
        Some(json!({
            "gates": self.gates,
            "step": self.index,
        }))
    }

    fn data_from_json(&mut self, data: &Value) {
        if let Some(gates) = data.get("gates").and_then(Value::as_array) {
            for (slot, value) in self.gates.iter_mut().zip(gates) {
                if let Some(b) = value.as_bool() {
                    *slot = b;
                }
            }
        }
        if let Some(step) = data.get("step").and_then(Value::as_u64) {
            self.index = (step as usize).min(STEPS - 1);
        }
    }
}
