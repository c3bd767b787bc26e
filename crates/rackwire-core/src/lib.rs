//! Rackwire Core - the modular rack data model and per-frame step
//!
//! This crate provides the single-threaded engine room of rackwire: modules,
//! their ports, the wires between them, and the [`Rack`] that advances the
//! whole graph one audio frame at a time. Threading, persistence and the
//! module catalog live in sibling crates.
//!
//! # Core Abstractions
//!
//! ## Modules and Ports
//!
//! - [`Module`] - Object-safe trait for every signal-processing unit
//! - [`ModuleLayout`] / [`ParamDescriptor`] - Declared port counts and param ranges
//! - [`Ports`] - A module's fixed-size [`Param`], [`Input`], [`Output`] and [`Light`] slots
//! - [`FrameContext`] - Sample rate, sample time and frame counter passed to `step`
//!
//! ## Graph
//!
//! - [`Rack`] - Live module and wire sets, the frame step, param writes
//! - [`Wire`] - A directed output-to-input connection
//! - [`ModuleId`] / [`WireId`] - Stable handles, never reused within a rack
//! - [`OutputRef`] / [`InputRef`] - Port addresses
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothingConfig`] - Ramp shape and time for smoothed param writes
//! - [`SmoothedValue`] - Exponential approach (one-pole)
//! - [`LinearRamp`] - Constant-rate approach
//!
//! ## Utilities
//!
//! - [`math`] - 1 V/oct pitch conversion, rescaling, crossfades
//!
//! # Example
//!
//! ```rust
//! use rackwire_core::{FrameContext, InputRef, Module, ModuleLayout, OutputRef, ParamDescriptor, Ports, Rack};
//!
//! static LEVEL: [ParamDescriptor; 1] = [ParamDescriptor::new("Level", -10.0, 10.0, 0.0)];
//!
//! struct Offset;
//! impl Module for Offset {
//!     fn layout(&self) -> ModuleLayout { ModuleLayout::new(&LEVEL, 1, 1, 0) }
//!     fn step(&mut self, ports: &mut Ports, _: &FrameContext) {
//!         let v = ports.input(0, 0.0) + ports.param(0);
//!         ports.set_output(0, v);
//!     }
//! }
//!
//! let mut rack = Rack::new(48000.0);
//! let a = rack.add_module(Box::new(Offset));
//! let b = rack.add_module(Box::new(Offset));
//! rack.set_param(a, 0, 1.0)?;
//! rack.set_param(b, 0, 2.0)?;
//! rack.add_wire(OutputRef::new(a, 0), InputRef::new(b, 0))?;
//!
//! rack.step_frames(2);
//! assert_eq!(rack.output_value(OutputRef::new(b, 0))?, 3.0);
//! # Ok::<(), rackwire_core::RackError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations in [`Rack::step`]
//! - **One frame per hop**: wires propagate after all modules stepped, so
//!   feedback needs no topological sort
//! - **Validate, then mutate**: a failed mutation leaves the graph unchanged

pub mod error;
pub mod ids;
pub mod math;
pub mod module;
pub mod param_info;
pub mod port;
pub mod rack;
pub mod smoothing;
pub mod wire;

// Re-export main types at crate root
pub use error::RackError;
pub use ids::{InputRef, ModuleId, OutputRef, PortKind, WireId};
pub use module::{FrameContext, Module};
pub use param_info::{ModuleLayout, ParamDescriptor};
pub use port::{Input, LIGHT_LAMBDA, Light, Output, Param, PlugLights, Ports};
pub use rack::{DEFAULT_SAMPLE_RATE, Rack};
pub use smoothing::{
    DEFAULT_SMOOTHING_MS, LinearRamp, ParamRamp, SmoothedValue, SmoothingConfig, SmoothingMode,
};
pub use wire::Wire;
