//! The [`Module`] trait and the per-frame [`FrameContext`].
//!
//! A module is an independent signal-processing unit. It declares a fixed
//! [`ModuleLayout`], and once per frame the rack hands it its own [`Ports`] to
//! read inputs and params from and write outputs and lights to. Modules never
//! see each other; all signal exchange goes through wires.
//!
//! ## Design Decisions
//!
//! - **Ports live outside the module**: the rack owns each module's `Ports`
//!   next to the boxed module, so wire propagation and plug lights never need
//!   to downcast or call into the module.
//! - **Object-safe**: the rack stores `Box<dyn Module>` and never depends on
//!   concrete types.
//! - **No allocations in `step`**: `step` runs on the engine thread under the
//!   graph lock and must not allocate, block or perform I/O.

use serde_json::Value;

use crate::param_info::ModuleLayout;
use crate::port::Ports;

/// Timing information for the frame being computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Duration of one frame in seconds (`1 / sample_rate`).
    pub sample_time: f32,
    /// Number of frames the rack completed before this one.
    pub frame: u64,
}

impl FrameContext {
    /// Context for the first frame at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sample_time: 1.0 / sample_rate,
            frame: 0,
        }
    }
}

/// A signal-processing unit that can be registered in a rack.
///
/// # Example
///
/// ```rust
/// use rackwire_core::{FrameContext, Module, ModuleLayout, ParamDescriptor, Ports};
///
/// static PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::new("Gain", 0.0, 2.0, 1.0)];
///
/// struct Vca;
///
/// impl Module for Vca {
///     fn layout(&self) -> ModuleLayout {
///         ModuleLayout::new(&PARAMS, 1, 1, 0)
///     }
///
///     fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
///         let out = ports.input(0, 0.0) * ports.param(0);
///         ports.set_output(0, out);
///     }
/// }
/// ```
pub trait Module: Send {
    /// Port counts and parameter table. Must return the same layout every call.
    fn layout(&self) -> ModuleLayout;

    /// Computes one frame.
    fn step(&mut self, ports: &mut Ports, frame: &FrameContext);

    /// Called when the rack's sample rate changes, before the next step.
    fn on_sample_rate_change(&mut self, _sample_rate: f32) {}

    /// Called once after construction, before the module is registered.
    fn on_create(&mut self) {}

    /// Called once after the module is unregistered, before it is dropped.
    fn on_delete(&mut self) {}

    /// Called after the rack restored every param to its default.
    ///
    /// Clear internal state here (sequencer position, envelopes).
    fn on_reset(&mut self, _ports: &mut Ports) {}

    /// Called after the rack randomized every randomizable param.
    fn on_randomize(&mut self, _ports: &mut Ports) {}

    /// Module-specific state to persist beyond params.
    ///
    /// Returns `None` when the module has nothing to save.
    fn data_to_json(&self) -> Option<Value> {
        None
    }

    /// Restores state produced by [`data_to_json`](Self::data_to_json).
    ///
    /// Unknown or malformed data should be ignored, not rejected.
    fn data_from_json(&mut self, _data: &Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_context_sample_time() {
        let ctx = FrameContext::new(48000.0);
        assert_eq!(ctx.sample_time, 1.0 / 48000.0);
        assert_eq!(ctx.frame, 0);
    }
}
