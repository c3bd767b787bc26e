//! Rackwire Modules - built-in module catalog
//!
//! This crate provides a small set of modules built on rackwire-core:
//!
//! - [`Constant`] - Fixed voltage source
//! - [`Thru`] - Unity buffer (one frame of delay per hop)
//! - [`Attenuverter`] - Scale, invert and offset
//! - [`Mixer`] - Four-channel mixer with master level
//! - [`SineOsc`] - 1 V/oct sine and square oscillator
//! - [`StepSequencer`] - Eight-step CV/gate sequencer with persisted gate switches
//!
//! Port and param indices are exposed as associated constants
//! (`Constant::VALUE`, `SineOsc::SQR`, ...).
//!
//! ## Example
//!
//! ```rust
//! use rackwire_core::{InputRef, OutputRef, Rack};
//! use rackwire_modules::{Attenuverter, Constant};
//!
//! let mut rack = Rack::new(48000.0);
//! let c = rack.add_module(Box::new(Constant::new()));
//! let a = rack.add_module(Box::new(Attenuverter::new()));
//! rack.set_param(c, Constant::VALUE, 4.0)?;
//! rack.set_param(a, Attenuverter::LEVEL, -0.5)?;
//! rack.add_wire(
//!     OutputRef::new(c, Constant::OUT),
//!     InputRef::new(a, Attenuverter::IN),
//! )?;
//!
//! rack.step_frames(2);
//! assert_eq!(rack.output_value(OutputRef::new(a, Attenuverter::OUT))?, -2.0);
//! # Ok::<(), rackwire_core::RackError>(())
//! ```

pub mod attenuverter;
pub mod constant;
pub mod mixer;
pub mod sine_osc;
pub mod step_sequencer;
pub mod thru;
pub mod trigger;

// Re-export main types at crate root
pub use attenuverter::Attenuverter;
pub use constant::Constant;
pub use mixer::Mixer;
pub use sine_osc::SineOsc;
pub use step_sequencer::StepSequencer;
pub use thru::Thru;
pub use trigger::SchmittTrigger;
