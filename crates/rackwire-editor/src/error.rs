//! Editor errors and the load report.

use rackwire_config::PatchError;
use rackwire_core::RackError;
use rackwire_registry::RegistryError;
use thiserror::Error;

/// Errors from editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A plugin or model slug did not resolve.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The rack rejected a mutation.
    #[error(transparent)]
    Rack(#[from] RackError),

    /// A patch file could not be read, parsed or written.
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Outcome of a best-effort patch load.
///
/// Everything that could be instantiated was; each skipped or adjusted
/// part of the patch left one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// One line per skipped or adjusted item, in patch order.
    pub notes: Vec<String>,
    /// Modules registered.
    pub modules_loaded: usize,
    /// Wires registered.
    pub wires_loaded: usize,
}

impl LoadReport {
    /// True when the patch loaded without notes.
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

impl core::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "loaded {} modules and {} wires",
            self.modules_loaded, self.wires_loaded
        )?;
        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }
        Ok(())
    }
}
