//! Threaded frame engine for rackwire.
//!
//! This crate provides:
//!
//! - **Engine thread**: [`Engine`] owns a [`Rack`](rackwire_core::Rack) behind a
//!   single mutex and steps it continuously on a dedicated thread
//! - **Mutation surface**: module/wire registration, sample rate, pause state
//!   and param writes, all safe to call from the interaction thread while the
//!   engine runs
//! - **Configuration**: [`EngineConfig`], deserializable from TOML or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use rackwire_engine::{Engine, EngineConfig};
//! use rackwire_modules::{Constant, Thru};
//! use rackwire_core::{InputRef, OutputRef};
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let c = engine.add_module(Box::new(Constant::new()));
//! let t = engine.add_module(Box::new(Thru::new()));
//! engine.set_param(c, Constant::VALUE, 5.0)?;
//! engine.add_wire(OutputRef::new(c, 0), InputRef::new(t, 0))?;
//!
//! // Headless: advance on the caller's thread.
//! engine.step_frames(2);
//! assert_eq!(engine.output_value(OutputRef::new(t, 0))?, 5.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::Engine;

/// Error types for engine lifecycle and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `start` was called on an engine whose thread is already running.
    #[error("Engine thread is already running")]
    AlreadyRunning,

    /// The engine thread could not be spawned.
    #[error("Failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A configuration value is outside its valid range.
    #[error("Invalid engine config: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl Error {
    /// Builds an [`Error::InvalidConfig`].
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
