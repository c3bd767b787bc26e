//! Four-channel unipolar mixer.

use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};

/// Number of mixer channels.
pub const CHANNELS: usize = 4;

static PARAMS: [ParamDescriptor; CHANNELS + 1] = [
    ParamDescriptor::new("Level 1", 0.0, 1.0, 1.0),
    ParamDescriptor::new("Level 2", 0.0, 1.0, 1.0),
    ParamDescriptor::new("Level 3", 0.0, 1.0, 1.0),
    ParamDescriptor::new("Level 4", 0.0, 1.0, 1.0),
    ParamDescriptor::new("Master", 0.0, 1.0, 1.0),
];

/// Sums four inputs, each through its own level knob, then a master level.
///
/// The single light shows the absolute output level relative to 10 V.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0–3 | Level 1–4 | 0–1 | 1 |
/// | 4 | Master | 0–1 | 1 |
#[derive(Debug, Clone, Default)]
pub struct Mixer;

impl Mixer {
    /// Param: master level.
    pub const MASTER: usize = CHANNELS;
    /// Output: the mix.
    pub const OUT: usize = 0;
    /// Light: output level.
    pub const LEVEL_LIGHT: usize = 0;

    /// Creates the module.
    pub fn new() -> Self {
        Self
    }
}

impl Module for Mixer {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&PARAMS, CHANNELS, 1, 1)
    }

    fn step(&mut self, ports: &mut Ports, frame: &FrameContext) {
        let sum: f32 = (0..CHANNELS)
            .map(|ch| ports.input(ch, 0.0) * ports.param(ch))
            .sum();
        let out = sum * ports.param(Self::MASTER);
        ports.set_output(Self::OUT, out);
        ports.lights[Self::LEVEL_LIGHT].set_brightness_smooth(out.abs() / 10.0, frame.sample_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_sum() {
        let mut m = Mixer::new();
        let mut ports = Ports::new(&m.layout());
        for (ch, v) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            ports.inputs[ch].active = true;
            ports.inputs[ch].value = v;
        }
        ports.params[1].value = 0.5;
        ports.params[Mixer::MASTER].value = 0.5;
        m.step(&mut ports, &FrameContext::new(48000.0));
        // (1 + 1 + 3 + 4) * 0.5
        assert_eq!(ports.outputs[Mixer::OUT].value, 4.5);
        assert!(ports.lights[Mixer::LEVEL_LIGHT].value > 0.0);
    }

    #[test]
    fn unpatched_inputs_are_silent() {
        let mut m = Mixer::new();
        let mut ports = Ports::new(&m.layout());
        ports.inputs[0].value = 7.0;
        m.step(&mut ports, &FrameContext::new(48000.0));
        assert_eq!(ports.outputs[Mixer::OUT].value, 0.0);
    }
}
