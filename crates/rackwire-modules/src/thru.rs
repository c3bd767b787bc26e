//! A unity buffer.

use rackwire_core::{FrameContext, Module, ModuleLayout, Ports};

/// Copies its input to its output. Each hop through a `Thru` adds one frame
/// of delay, which makes it handy for latency checks.
#[derive(Debug, Clone, Default)]
pub struct Thru;

impl Thru {
    /// Input: signal.
    pub const IN: usize = 0;
    /// Output: the same signal.
    pub const OUT: usize = 0;

    /// Creates the module.
    pub fn new() -> Self {
        Self
    }
}

impl Module for Thru {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&[], 1, 1, 0)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.input(Self::IN, 0.0);
        ports.set_output(Self::OUT, v);
    }
}
