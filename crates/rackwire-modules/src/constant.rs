//! A fixed voltage source.

use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};

static PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::new("Value", -10.0, 10.0, 0.0)];

/// Outputs the voltage set on its knob.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | Value | -10–10 V | 0 V |
#[derive(Debug, Clone, Default)]
pub struct Constant;

impl Constant {
    /// Param: output voltage.
    pub const VALUE: usize = 0;
    /// Output: the voltage.
    pub const OUT: usize = 0;

    /// Creates the module.
    pub fn new() -> Self {
        Self
    }
}

impl Module for Constant {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&PARAMS, 0, 1, 0)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.param(Self::VALUE);
        ports.set_output(Self::OUT, v);
    }
}
