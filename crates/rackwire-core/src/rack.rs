//! The rack: live module set, wire set, and the per-frame step.
//!
//! [`Rack`] is the single-threaded heart of the engine. It owns every
//! registered module together with its [`Ports`], every [`Wire`], the sample
//! rate, and the parameter smoothing slot. The threaded engine wraps a `Rack`
//! in a mutex; tests and offline rendering drive it directly.
//!
//! # Frame protocol
//!
//! [`step()`](Rack::step) computes one frame:
//!
//! 1. Advance the active parameter smoothing (if any).
//! 2. Step every module in registration order. Bypassed modules are skipped
//!    and their outputs held at 0 V. With the power meter on, each step is
//!    timed and folded into the module's `cpu_time`.
//! 3. Refresh plug lights of active jacks.
//! 4. Propagate every wire: `input.value = output.value`.
//!
//! Because propagation happens after all modules stepped, a value written at
//! frame N is visible downstream at frame N+1 regardless of module order, and
//! cycles are just wires like any other.
//!
//! # Mutation contract
//!
//! - At most one wire terminates at a given input; outputs fan out freely.
//! - A module can be removed only once no wire references it.
//! - Handles are never reused, so stale handles fail with
//!   [`RackError::ModuleNotFound`] / [`RackError::WireNotFound`].
//!
//! Every mutation validates before it changes anything.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;

use crate::error::RackError;
use crate::ids::{InputRef, ModuleId, OutputRef, PortKind, WireId};
use crate::module::{FrameContext, Module};
use crate::param_info::ModuleLayout;
use crate::port::Ports;
use crate::smoothing::{ParamRamp, SmoothingConfig};
use crate::wire::{Wire, WireSlot};

/// Default sample rate for a new rack.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

struct ModuleSlot {
    id: ModuleId,
    module: Box<dyn Module>,
    ports: Ports,
    layout: ModuleLayout,
    bypassed: bool,
    cpu_time: f32,
}

struct ActiveSmoothing {
    module: ModuleId,
    param: usize,
    ramp: ParamRamp,
}

/// A graph of modules and wires that can be stepped one frame at a time.
///
/// # Example
///
/// ```rust
/// use rackwire_core::{FrameContext, InputRef, Module, ModuleLayout, OutputRef, Ports, Rack};
///
/// struct Five;
/// impl Module for Five {
///     fn layout(&self) -> ModuleLayout { ModuleLayout::new(&[], 0, 1, 0) }
///     fn step(&mut self, ports: &mut Ports, _: &FrameContext) { ports.set_output(0, 5.0); }
/// }
///
/// struct Thru;
/// impl Module for Thru {
///     fn layout(&self) -> ModuleLayout { ModuleLayout::new(&[], 1, 1, 0) }
///     fn step(&mut self, ports: &mut Ports, _: &FrameContext) {
///         let v = ports.input(0, 0.0);
///         ports.set_output(0, v);
///     }
/// }
///
/// let mut rack = Rack::new(48000.0);
/// let src = rack.add_module(Box::new(Five));
/// let thru = rack.add_module(Box::new(Thru));
/// rack.add_wire(OutputRef::new(src, 0), InputRef::new(thru, 0)).unwrap();
///
/// rack.step();
/// assert_eq!(rack.output_value(OutputRef::new(thru, 0)).unwrap(), 0.0);
/// rack.step();
/// assert_eq!(rack.output_value(OutputRef::new(thru, 0)).unwrap(), 5.0);
/// ```
pub struct Rack {
    modules: Vec<ModuleSlot>,
    index: HashMap<ModuleId, usize>,
    wires: Vec<WireSlot>,
    next_module: u32,
    next_wire: u32,
    frame: FrameContext,
    smoothing_config: SmoothingConfig,
    smoothing: Option<ActiveSmoothing>,
    power_meter: bool,
}

impl Default for Rack {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl Rack {
    /// Creates an empty rack running at `sample_rate` Hz.
    ///
    /// A non-positive or non-finite rate falls back to
    /// [`DEFAULT_SAMPLE_RATE`], the same rates `set_sample_rate` ignores.
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        Self {
            modules: Vec::new(),
            index: HashMap::new(),
            wires: Vec::new(),
            next_module: 1,
            next_wire: 1,
            frame: FrameContext::new(sample_rate),
            smoothing_config: SmoothingConfig::default(),
            smoothing: None,
            power_meter: false,
        }
    }

    // --- Module membership ---

    /// Registers a module and returns its handle.
    ///
    /// The module's ports are allocated from its layout with params at their
    /// defaults, and its sample-rate hook is called with the current rate.
    pub fn add_module(&mut self, mut module: Box<dyn Module>) -> ModuleId {
        let id = ModuleId(self.next_module);
        self.next_module += 1;

        let layout = module.layout();
        module.on_sample_rate_change(self.frame.sample_rate);
        self.index.insert(id, self.modules.len());
        self.modules.push(ModuleSlot {
            id,
            module,
            ports: Ports::new(&layout),
            layout,
            bypassed: false,
            cpu_time: 0.0,
        });
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_add: {id}");
        id
    }

    /// Unregisters a module and hands it back to the caller.
    ///
    /// Fails with [`RackError::ModuleHasWires`] while any wire references the
    /// module. A smoothing in progress on one of its params is dropped.
    pub fn remove_module(&mut self, id: ModuleId) -> Result<Box<dyn Module>, RackError> {
        let idx = self.slot_index(id)?;
        let attached = self
            .wires
            .iter()
            .filter(|w| w.wire.output.module == id || w.wire.input.module == id)
            .count();
        if attached > 0 {
            return Err(RackError::ModuleHasWires {
                module: id,
                count: attached,
            });
        }

        if self.smoothing.as_ref().is_some_and(|s| s.module == id) {
            self.smoothing = None;
        }
        let slot = self.modules.remove(idx);
        self.reindex();
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_remove: {id}");
        Ok(slot.module)
    }

    /// True if `id` is registered.
    pub fn contains_module(&self, id: ModuleId) -> bool {
        self.index.contains_key(&id)
    }

    /// Handles of all registered modules, in step order.
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().map(|s| s.id)
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Layout of a registered module.
    pub fn module_layout(&self, id: ModuleId) -> Result<ModuleLayout, RackError> {
        Ok(self.slot(id)?.layout)
    }

    /// The module and its ports, for read access.
    pub fn module(&self, id: ModuleId) -> Option<(&dyn Module, &Ports)> {
        let slot = self.modules.get(*self.index.get(&id)?)?;
        Some((slot.module.as_ref(), &slot.ports))
    }

    /// The module and its ports, for write access outside the frame loop.
    pub fn module_mut(&mut self, id: ModuleId) -> Option<(&mut dyn Module, &mut Ports)> {
        let idx = *self.index.get(&id)?;
        let slot = self.modules.get_mut(idx)?;
        Some((slot.module.as_mut(), &mut slot.ports))
    }

    // --- Wires ---

    /// Connects `output` to `input` and returns the new wire's handle.
    ///
    /// Both modules must be registered and both ports in range. The input
    /// must be free; use [`wire_at_input`](Self::wire_at_input) and
    /// [`remove_wire`](Self::remove_wire) to replace an existing connection.
    /// A module may be wired to itself.
    pub fn add_wire(&mut self, output: OutputRef, input: InputRef) -> Result<WireId, RackError> {
        let out_idx = self.slot_index(output.module)?;
        let in_idx = self.slot_index(input.module)?;

        let out_count = self.modules[out_idx].ports.outputs.len();
        if output.port >= out_count {
            return Err(RackError::port_out_of_range(
                output.module,
                PortKind::Output,
                output.port,
                out_count,
            ));
        }
        let in_count = self.modules[in_idx].ports.inputs.len();
        if input.port >= in_count {
            return Err(RackError::port_out_of_range(
                input.module,
                PortKind::Input,
                input.port,
                in_count,
            ));
        }
        if let Some(existing) = self.wire_at_input(input) {
            return Err(RackError::InputOccupied { input, existing });
        }

        let id = WireId(self.next_wire);
        self.next_wire += 1;
        self.wires.push(WireSlot {
            wire: Wire { id, output, input },
            out_idx,
            in_idx,
        });
        self.refresh_active();
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_connect: {output} -> {input} as {id}");
        Ok(id)
    }

    /// Removes a wire and returns it.
    ///
    /// The destination input drops to 0 V and both endpoints are marked
    /// inactive unless another wire still uses them.
    pub fn remove_wire(&mut self, id: WireId) -> Result<Wire, RackError> {
        let pos = self
            .wires
            .iter()
            .position(|w| w.wire.id == id)
            .ok_or(RackError::WireNotFound(id))?;
        let slot = self.wires.remove(pos);
        if let Some(input) = self.modules[slot.in_idx]
            .ports
            .inputs
            .get_mut(slot.wire.input.port)
        {
            input.value = 0.0;
        }
        self.refresh_active();
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_disconnect: {id}");
        Ok(slot.wire)
    }

    /// Removes every wire, zeroing the inputs they fed. Returns how many
    /// were removed.
    pub fn remove_all_wires(&mut self) -> usize {
        let removed = self.wires.len();
        for slot in self.wires.drain(..) {
            if let Some(input) = self.modules[slot.in_idx]
                .ports
                .inputs
                .get_mut(slot.wire.input.port)
            {
                input.value = 0.0;
            }
        }
        self.refresh_active();
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_disconnect_all: {removed}");
        removed
    }

    /// Looks up a wire.
    pub fn wire(&self, id: WireId) -> Option<Wire> {
        self.wires.iter().find(|w| w.wire.id == id).map(|w| w.wire)
    }

    /// All wires, in registration order.
    pub fn wires(&self) -> impl Iterator<Item = Wire> + '_ {
        self.wires.iter().map(|w| w.wire)
    }

    /// Number of registered wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// The wire terminating at `input`, if any.
    pub fn wire_at_input(&self, input: InputRef) -> Option<WireId> {
        self.wires
            .iter()
            .find(|w| w.wire.input == input)
            .map(|w| w.wire.id)
    }

    /// Every wire leaving `output`.
    pub fn wires_from_output(&self, output: OutputRef) -> Vec<WireId> {
        self.wires
            .iter()
            .filter(|w| w.wire.output == output)
            .map(|w| w.wire.id)
            .collect()
    }

    /// Every wire touching `module` on either end.
    pub fn wires_of(&self, module: ModuleId) -> Vec<WireId> {
        self.wires
            .iter()
            .filter(|w| w.wire.output.module == module || w.wire.input.module == module)
            .map(|w| w.wire.id)
            .collect()
    }

    // --- Sample rate ---

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.frame.sample_rate
    }

    /// Duration of one frame in seconds.
    pub fn sample_time(&self) -> f32 {
        self.frame.sample_time
    }

    /// Changes the sample rate and notifies every module.
    ///
    /// Setting the current rate again, or a non-positive or non-finite rate,
    /// does nothing. A smoothing in progress continues at the new rate and
    /// still ends at the same wall-clock time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) || sample_rate == self.frame.sample_rate
        {
            return;
        }
        self.frame.sample_rate = sample_rate;
        self.frame.sample_time = 1.0 / sample_rate;
        for slot in &mut self.modules {
            slot.module.on_sample_rate_change(sample_rate);
        }
        if let Some(active) = &mut self.smoothing {
            active.ramp.set_sample_rate(sample_rate);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("rack_sample_rate: {sample_rate} Hz");
    }

    /// Context of the next frame to be computed.
    pub fn frame_context(&self) -> FrameContext {
        self.frame
    }

    /// Number of frames computed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame.frame
    }

    // --- Params ---

    /// Reads a param value.
    pub fn param(&self, module: ModuleId, param: usize) -> Result<f32, RackError> {
        let slot = self.slot(module)?;
        slot.ports
            .params
            .get(param)
            .map(|p| p.value)
            .ok_or(RackError::ParamOutOfRange {
                module,
                index: param,
                count: slot.ports.params.len(),
            })
    }

    /// Sets a param immediately, clamped to its declared range.
    ///
    /// A smoothing in progress on the same param is cancelled. NaN and
    /// infinite values are rejected.
    pub fn set_param(&mut self, module: ModuleId, param: usize, value: f32) -> Result<(), RackError> {
        let idx = self.param_slot(module, param)?;
        check_finite(module, param, value)?;
        let slot = &mut self.modules[idx];
        slot.ports.params[param].value = slot.layout.params[param].clamp(value);
        if self
            .smoothing
            .as_ref()
            .is_some_and(|s| s.module == module && s.param == param)
        {
            self.smoothing = None;
        }
        Ok(())
    }

    /// Starts moving a param toward `value`, one step per frame.
    ///
    /// Only one param is smoothed at a time: targeting a different param
    /// first jumps the previously smoothed one to its target.
    pub fn set_param_smooth(
        &mut self,
        module: ModuleId,
        param: usize,
        value: f32,
    ) -> Result<(), RackError> {
        let idx = self.param_slot(module, param)?;
        check_finite(module, param, value)?;
        let target = self.modules[idx].layout.params[param].clamp(value);

        if let Some(previous) = self.smoothing.take()
            && (previous.module != module || previous.param != param)
            && let Some(&prev_idx) = self.index.get(&previous.module)
            && let Some(p) = self.modules[prev_idx].ports.params.get_mut(previous.param)
        {
            p.value = previous.ramp.target();
        }

        let from = self.modules[idx].ports.params[param].value;
        self.smoothing = Some(ActiveSmoothing {
            module,
            param,
            ramp: ParamRamp::new(&self.smoothing_config, from, target, self.frame.sample_rate),
        });
        Ok(())
    }

    /// The value a param is heading to: the smoothing target if the param is
    /// being smoothed, else its current value.
    pub fn smooth_param_target(&self, module: ModuleId, param: usize) -> Result<f32, RackError> {
        if let Some(active) = &self.smoothing
            && active.module == module
            && active.param == param
        {
            return Ok(active.ramp.target());
        }
        self.param(module, param)
    }

    /// True while a smoothing is in progress.
    pub fn is_smoothing(&self) -> bool {
        self.smoothing.is_some()
    }

    /// Current smoothing settings.
    pub fn smoothing_config(&self) -> SmoothingConfig {
        self.smoothing_config
    }

    /// Replaces the smoothing settings. Takes effect on the next smoothed write.
    pub fn set_smoothing_config(&mut self, config: SmoothingConfig) {
        self.smoothing_config = config;
    }

    // --- Per-module state ---

    /// Restores every param to its default, then calls the module's reset hook.
    pub fn reset_module(&mut self, id: ModuleId) -> Result<(), RackError> {
        let idx = self.slot_index(id)?;
        let slot = &mut self.modules[idx];
        for (p, d) in slot.ports.params.iter_mut().zip(slot.layout.params) {
            p.value = d.default;
        }
        slot.module.on_reset(&mut slot.ports);
        self.cancel_smoothing_on(id);
        Ok(())
    }

    /// Gives every randomizable param a uniform value within its range, then
    /// calls the module's randomize hook.
    pub fn randomize_module(&mut self, id: ModuleId) -> Result<(), RackError> {
        self.randomize_module_with(id, &mut rand::rng())
    }

    /// [`randomize_module`](Self::randomize_module) with a caller-supplied
    /// random source.
    pub fn randomize_module_with<R: Rng>(
        &mut self,
        id: ModuleId,
        rng: &mut R,
    ) -> Result<(), RackError> {
        let idx = self.slot_index(id)?;
        let slot = &mut self.modules[idx];
        for (p, d) in slot.ports.params.iter_mut().zip(slot.layout.params) {
            if d.randomizable && d.min.is_finite() && d.max.is_finite() && d.max > d.min {
                p.value = d.clamp(rng.random_range(d.min..=d.max));
            }
        }
        slot.module.on_randomize(&mut slot.ports);
        self.cancel_smoothing_on(id);
        Ok(())
    }

    /// Bypasses or re-enables a module.
    pub fn set_bypass(&mut self, id: ModuleId, bypassed: bool) -> Result<(), RackError> {
        let idx = self.slot_index(id)?;
        self.modules[idx].bypassed = bypassed;
        Ok(())
    }

    /// True if the module is bypassed.
    pub fn is_bypassed(&self, id: ModuleId) -> Result<bool, RackError> {
        Ok(self.slot(id)?.bypassed)
    }

    /// Enables or disables per-module step timing.
    pub fn set_power_meter(&mut self, enabled: bool) {
        self.power_meter = enabled;
    }

    /// True if per-module step timing is on.
    pub fn power_meter(&self) -> bool {
        self.power_meter
    }

    /// Smoothed step duration of a module in seconds (0 with the meter off).
    pub fn module_cpu_time(&self, id: ModuleId) -> Result<f32, RackError> {
        Ok(self.slot(id)?.cpu_time)
    }

    // --- Port reads ---

    /// Current value of an output.
    pub fn output_value(&self, output: OutputRef) -> Result<f32, RackError> {
        let slot = self.slot(output.module)?;
        slot.ports
            .outputs
            .get(output.port)
            .map(|o| o.value)
            .ok_or_else(|| {
                RackError::port_out_of_range(
                    output.module,
                    PortKind::Output,
                    output.port,
                    slot.ports.outputs.len(),
                )
            })
    }

    /// Current value of an input.
    pub fn input_value(&self, input: InputRef) -> Result<f32, RackError> {
        let slot = self.slot(input.module)?;
        slot.ports
            .inputs
            .get(input.port)
            .map(|i| i.value)
            .ok_or_else(|| {
                RackError::port_out_of_range(
                    input.module,
                    PortKind::Input,
                    input.port,
                    slot.ports.inputs.len(),
                )
            })
    }

    /// Current brightness of a module light.
    pub fn light_value(&self, module: ModuleId, light: usize) -> Result<f32, RackError> {
        let slot = self.slot(module)?;
        slot.ports
            .lights
            .get(light)
            .map(|l| l.value)
            .ok_or_else(|| {
                RackError::port_out_of_range(module, PortKind::Light, light, slot.ports.lights.len())
            })
    }

    // --- Processing ---

    /// Computes one frame.
    pub fn step(&mut self) {
        self.advance_smoothing();

        let frame = self.frame;
        for slot in &mut self.modules {
            if slot.bypassed {
                slot.ports.clear_outputs();
                slot.cpu_time = 0.0;
            } else if self.power_meter {
                let start = Instant::now();
                slot.module.step(&mut slot.ports, &frame);
                let elapsed = start.elapsed().as_secs_f32();
                slot.cpu_time += (elapsed - slot.cpu_time) * frame.sample_time / 2.0;
            } else {
                slot.module.step(&mut slot.ports, &frame);
            }
            slot.ports.update_plug_lights(frame.sample_time);
        }

        for w in &self.wires {
            let value = self.modules[w.out_idx].ports.outputs[w.wire.output.port].value;
            self.modules[w.in_idx].ports.inputs[w.wire.input.port].value = value;
        }

        self.frame.frame += 1;
    }

    /// Computes `frames` frames.
    pub fn step_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step();
        }
    }

    // --- Internal ---

    fn slot_index(&self, id: ModuleId) -> Result<usize, RackError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(RackError::ModuleNotFound(id))
    }

    fn slot(&self, id: ModuleId) -> Result<&ModuleSlot, RackError> {
        Ok(&self.modules[self.slot_index(id)?])
    }

    fn param_slot(&self, module: ModuleId, param: usize) -> Result<usize, RackError> {
        let idx = self.slot_index(module)?;
        let count = self.modules[idx].ports.params.len();
        if param >= count {
            return Err(RackError::ParamOutOfRange {
                module,
                index: param,
                count,
            });
        }
        Ok(idx)
    }

    fn cancel_smoothing_on(&mut self, id: ModuleId) {
        if self.smoothing.as_ref().is_some_and(|s| s.module == id) {
            self.smoothing = None;
        }
    }

    fn advance_smoothing(&mut self) {
        let Some(active) = &mut self.smoothing else {
            return;
        };
        let value = active.ramp.advance();
        if let Some(&idx) = self.index.get(&active.module)
            && let Some(p) = self.modules[idx].ports.params.get_mut(active.param)
        {
            p.value = value;
        }
        if active.ramp.is_settled() {
            self.smoothing = None;
        }
    }

    /// Rebuilds the id map and cached wire endpoints after a removal.
    fn reindex(&mut self) {
        self.index.clear();
        for (i, slot) in self.modules.iter().enumerate() {
            self.index.insert(slot.id, i);
        }
        for w in &mut self.wires {
            if let Some(&i) = self.index.get(&w.wire.output.module) {
                w.out_idx = i;
            }
            if let Some(&i) = self.index.get(&w.wire.input.module) {
                w.in_idx = i;
            }
        }
    }

    /// Recomputes every jack's `active` flag from the wire set.
    fn refresh_active(&mut self) {
        for slot in &mut self.modules {
            for input in slot.ports.inputs.iter_mut() {
                input.active = false;
            }
            for output in slot.ports.outputs.iter_mut() {
                output.active = false;
            }
        }
        for w in &self.wires {
            self.modules[w.out_idx].ports.outputs[w.wire.output.port].active = true;
            self.modules[w.in_idx].ports.inputs[w.wire.input.port].active = true;
        }
    }
}

fn check_finite(module: ModuleId, param: usize, value: f32) -> Result<(), RackError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RackError::ParamNotFinite {
            module,
            index: param,
            value,
        })
    }
}

impl core::fmt::Debug for Rack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rack")
            .field("modules", &self.modules.len())
            .field("wires", &self.wires.len())
            .field("sample_rate", &self.frame.sample_rate)
            .field("frame", &self.frame.frame)
            .finish()
    }
}
