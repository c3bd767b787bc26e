//! Patch documents and configuration files for rackwire.
//!
//! This crate owns everything rackwire reads from or writes to disk:
//! the JSON patch document, the TOML engine configuration, and the checks
//! that decide which parts of a patch can be instantiated.
//!
//! # Features
//!
//! - **Patch Documents**: Load and save the module/wire graph as JSON
//! - **Engine Config**: Read [`EngineConfig`] from TOML
//! - **Validation**: Check a patch against a [`Registry`] and report every issue
//!
//! # Example
//!
//! ```rust,no_run
//! use rackwire_config::{ModuleRecord, PatchDocument, WireRecord, validate_patch};
//! use rackwire_registry::{Registry, FUNDAMENTAL};
//!
//! let patch = PatchDocument::new()
//!     .with_module(ModuleRecord::new(FUNDAMENTAL, "Constant").with_param(0, 5.0))
//!     .with_module(ModuleRecord::new(FUNDAMENTAL, "Thru"))
//!     .with_wire(WireRecord::new(0, 0, 1, 0));
//!
//! assert!(validate_patch(&Registry::new(), &patch).is_empty());
//! patch.save("patches/hello.json").unwrap();
//!
//! let loaded = PatchDocument::load("patches/hello.json").unwrap();
//! assert_eq!(loaded.modules.len(), 2);
//! ```

mod engine_config;
mod error;
mod patch;

/// Patch validation against a registry.
pub mod validation;

pub use engine_config::{engine_config_from_toml, load_engine_config};
pub use error::PatchError;
pub use patch::{ModuleRecord, PATCH_VERSION, ParamRecord, PatchDocument, WireRecord};
pub use validation::{Severity, ValidationIssue, validate_patch, validate_patch_strict};

/// Re-export commonly used types from the engine and registry
pub use rackwire_engine::EngineConfig;
pub use rackwire_registry::Registry;
