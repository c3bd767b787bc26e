//! Integration tests for the rackwire-core rack.
//!
//! Drives small patches through the public API only: wire latency, feedback
//! loops, fan-out, rewiring, sample-rate changes and smoothed param writes
//! observed through module outputs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rackwire_core::{
    FrameContext, InputRef, Module, ModuleId, ModuleLayout, OutputRef, ParamDescriptor, Ports,
    Rack, RackError, SmoothingConfig, SmoothingMode,
};

const SAMPLE_RATE: f32 = 48000.0;

static VALUE: [ParamDescriptor; 1] = [ParamDescriptor::new("Value", -10.0, 10.0, 0.0)];

/// Emits its param on output 0.
struct Constant;

impl Module for Constant {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&VALUE, 0, 1, 0)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.param(0);
        ports.set_output(0, v);
    }
}

/// Copies input 0 to output 0 and lights light 0 when the signal is positive.
struct Thru;

impl Module for Thru {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&[], 1, 1, 1)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.input(0, 0.0);
        ports.set_output(0, v);
        ports.lights[0].set_brightness(if v > 0.0 { 1.0 } else { 0.0 });
    }
}

/// Outputs input 0 plus one. Wired to itself it counts frames.
struct Increment;

impl Module for Increment {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(&[], 1, 1, 0)
    }

    fn step(&mut self, ports: &mut Ports, _frame: &FrameContext) {
        let v = ports.input(0, 0.0) + 1.0;
        ports.set_output(0, v);
    }
}

/// Records the sample time it was told about and checks every frame against it.
struct RateWatcher {
    expected_time: f32,
    mismatches: Arc<AtomicU32>,
}

impl Module for RateWatcher {
    fn layout(&self) -> ModuleLayout {
        ModuleLayout::empty()
    }

    fn step(&mut self, _ports: &mut Ports, frame: &FrameContext) {
        if frame.sample_time != self.expected_time {
            self.mismatches.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_sample_rate_change(&mut self, sample_rate: f32) {
        self.expected_time = 1.0 / sample_rate;
    }
}

fn out(module: ModuleId) -> OutputRef {
    OutputRef::new(module, 0)
}

fn inp(module: ModuleId) -> InputRef {
    InputRef::new(module, 0)
}

// ============================================================================
// 1. Latency
// ============================================================================

#[test]
fn constant_into_thru_arrives_after_one_frame() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let c = rack.add_module(Box::new(Constant));
    let t = rack.add_module(Box::new(Thru));
    rack.set_param(c, 0, 5.0).unwrap();
    rack.add_wire(out(c), inp(t)).unwrap();

    rack.step();
    assert_eq!(rack.output_value(out(t)).unwrap(), 0.0);
    rack.step();
    assert_eq!(rack.output_value(out(t)).unwrap(), 5.0);
}

#[test]
fn chain_adds_one_frame_per_hop() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let c = rack.add_module(Box::new(Constant));
    rack.set_param(c, 0, 1.0).unwrap();

    let hops = 6;
    let mut prev = c;
    let mut chain = Vec::new();
    for _ in 0..hops {
        let t = rack.add_module(Box::new(Thru));
        rack.add_wire(out(prev), inp(t)).unwrap();
        chain.push(t);
        prev = t;
    }
    let tail = prev;

    for frame in 1..=hops {
        rack.step();
        assert_eq!(
            rack.output_value(out(tail)).unwrap(),
            0.0,
            "tail must be silent at frame {frame}"
        );
    }
    rack.step();
    assert_eq!(rack.output_value(out(tail)).unwrap(), 1.0);
    assert_eq!(chain.len(), hops);
}

// ============================================================================
// 2. Feedback
// ============================================================================

#[test]
fn self_loop_counts_frames() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let inc = rack.add_module(Box::new(Increment));
    rack.add_wire(out(inc), inp(inc)).unwrap();
    rack.step_frames(1000);
    assert_eq!(rack.output_value(out(inc)).unwrap(), 1000.0);
}

#[test]
fn two_module_ring_steps_indefinitely() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let a = rack.add_module(Box::new(Thru));
    let b = rack.add_module(Box::new(Thru));
    rack.add_wire(out(a), inp(b)).unwrap();
    rack.add_wire(out(b), inp(a)).unwrap();
    rack.step_frames(100_000);
    assert_eq!(rack.frame_count(), 100_000);
    assert_eq!(rack.wire_count(), 2);
    assert_eq!(rack.output_value(out(a)).unwrap(), 0.0);
}

// ============================================================================
// 3. Rewiring
// ============================================================================

#[test]
fn replacing_a_wire_requires_removing_the_old_one() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let c1 = rack.add_module(Box::new(Constant));
    let c2 = rack.add_module(Box::new(Constant));
    let t = rack.add_module(Box::new(Thru));
    rack.set_param(c1, 0, 1.0).unwrap();
    rack.set_param(c2, 0, 2.0).unwrap();

    let first = rack.add_wire(out(c1), inp(t)).unwrap();
    assert!(matches!(
        rack.add_wire(out(c2), inp(t)),
        Err(RackError::InputOccupied { .. })
    ));

    let old = rack.wire_at_input(inp(t)).unwrap();
    assert_eq!(old, first);
    rack.remove_wire(old).unwrap();
    rack.add_wire(out(c2), inp(t)).unwrap();
    rack.step_frames(2);
    assert_eq!(rack.output_value(out(t)).unwrap(), 2.0);
}

#[test]
fn removing_a_module_leaves_no_dangling_wires() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let c = rack.add_module(Box::new(Constant));
    let t = rack.add_module(Box::new(Thru));
    let u = rack.add_module(Box::new(Thru));
    rack.add_wire(out(c), inp(t)).unwrap();
    rack.add_wire(out(t), inp(u)).unwrap();

    assert!(matches!(
        rack.remove_module(t),
        Err(RackError::ModuleHasWires { count: 2, .. })
    ));
    for w in rack.wires_of(t) {
        rack.remove_wire(w).unwrap();
    }
    let module = rack.remove_module(t).unwrap();
    drop(module);

    assert!(rack.wires().all(|w| w.output.module != t && w.input.module != t));
    assert_eq!(rack.module_ids().collect::<Vec<_>>(), vec![c, u]);
    assert!(matches!(
        rack.set_param(t, 0, 1.0),
        Err(RackError::ModuleNotFound(_))
    ));
}

// ============================================================================
// 4. Sample rate
// ============================================================================

#[test]
fn no_frame_observes_a_stale_sample_time() {
    let mismatches = Arc::new(AtomicU32::new(0));
    let mut rack = Rack::new(44100.0);
    rack.add_module(Box::new(RateWatcher {
        expected_time: 0.0,
        mismatches: Arc::clone(&mismatches),
    }));
    for rate in [44100.0, 48000.0, 96000.0, 22050.0] {
        rack.set_sample_rate(rate);
        rack.step_frames(64);
    }
    assert_eq!(mismatches.load(Ordering::SeqCst), 0);
    assert_eq!(rack.sample_rate(), 22050.0);
}

// ============================================================================
// 5. Params and lights
// ============================================================================

#[test]
fn smoothed_param_glides_into_downstream_module() {
    let mut rack = Rack::new(1000.0);
    rack.set_smoothing_config(SmoothingConfig {
        mode: SmoothingMode::Linear,
        time_ms: 100.0,
    });
    let c = rack.add_module(Box::new(Constant));
    let t = rack.add_module(Box::new(Thru));
    rack.add_wire(out(c), inp(t)).unwrap();

    rack.set_param_smooth(c, 0, 10.0).unwrap();
    let mut previous = 0.0;
    for _ in 0..101 {
        rack.step();
        let v = rack.output_value(out(t)).unwrap();
        assert!(v >= previous, "ramp must be monotonic");
        previous = v;
    }
    assert_eq!(previous, 10.0);
    assert_eq!(rack.smooth_param_target(c, 0).unwrap(), 10.0);
}

#[test]
fn module_lights_are_readable() {
    let mut rack = Rack::new(SAMPLE_RATE);
    let c = rack.add_module(Box::new(Constant));
    let t = rack.add_module(Box::new(Thru));
    rack.set_param(c, 0, 3.0).unwrap();
    rack.add_wire(out(c), inp(t)).unwrap();
    rack.step_frames(2);
    assert_eq!(rack.light_value(t, 0).unwrap(), 1.0);
    assert!(rack.light_value(t, 1).is_err());
}
