//! Patch editing for rackwire.
//!
//! [`PatchEditor`] is the interaction-thread side of a running rack: it
//! creates modules from the registry, keeps the one-wire-per-input rule while
//! rewiring, drives the cable drag state machine, and loads and saves patch
//! files with best-effort recovery.
//!
//! # Example
//!
//! ```rust,no_run
//! use rackwire_editor::PatchEditor;
//! use rackwire_engine::Engine;
//! use rackwire_registry::Registry;
//!
//! let mut editor = PatchEditor::new(Engine::default(), Registry::new());
//! let report = editor.load("patches/hello.json")?;
//! for note in &report.notes {
//!     eprintln!("{note}");
//! }
//! editor.engine().start().expect("engine thread");
//! # Ok::<(), rackwire_editor::EditorError>(())
//! ```

pub mod connection;
mod editor;
mod error;

pub use connection::{
    ConnectionFsm, ConnectionState, DragEvent, PortOccupancy, PortRef, WireAction,
};
pub use editor::PatchEditor;
pub use error::{EditorError, LoadReport};
