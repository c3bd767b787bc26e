//! Scale, invert and offset a signal.

use rackwire_core::math::clamp_safe;
use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};

/// Output rail, in volts.
const RAIL: f32 = 12.0;

static PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::new("Level", -1.0, 1.0, 1.0),
    ParamDescriptor::new("Offset", -10.0, 10.0, 0.0),
];

/// `out = in × level + offset`, clipped to ±12 V.
///
/// With nothing patched the input reads 0 V, so the module doubles as an
/// offset voltage source.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Level | -1–1 | 1 |
/// | 1 | Offset | -10–10 V | 0 V |
#[derive(Debug, Clone, Default)]
pub struct Attenuverter;

impl Attenuverter {
    /// Param: gain, negative values invert.
    pub const LEVEL: usize = 0;
    /// Param: added voltage.
    pub const OFFSET: usize = 1;
    /// Input: signal.
    pub const IN: usize = 0;
    /// Output: scaled signal.
    pub const OUT: usize = 0;

    /// Creates the module.
    pub fn new() -> Self {
        Self
    }
}

impl Module for Attenuverter {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&PARAMS, 1, 1, 0)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.input(Self::IN, 0.0) * ports.param(Self::LEVEL) + ports.param(Self::OFFSET);
        ports.set_output(Self::OUT, clamp_safe(v, -RAIL, RAIL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_and_offsets() {
        let mut m = Attenuverter::new();
        let mut ports = Ports::new(&m.layout());
        ports.inputs[0].active = true;
        ports.inputs[0].value = 2.0;
        ports.params[Attenuverter::LEVEL].value = -0.5;
        ports.params[Attenuverter::OFFSET].value = 3.0;
        m.step(&mut ports, &FrameContext::new(48000.0));
        assert_eq!(ports.outputs[0].value, 2.0);
    }

    #[test]
    fn clips_at_rail() {
        let mut m = Attenuverter::new();
        let mut ports = Ports::new(&m.layout());
        ports.inputs[0].active = true;
        ports.inputs[0].value = 10.0;
        ports.params[Attenuverter::OFFSET].value = 10.0;
        m.step(&mut ports, &FrameContext::new(48000.0));
        assert_eq!(ports.outputs[0].value, RAIL);
    }
}
