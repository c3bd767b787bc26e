//! Errors returned by rack mutations.

use thiserror::Error;

use crate::ids::{InputRef, ModuleId, PortKind, WireId};

/// A rejected rack mutation.
///
/// Every variant describes a contract violation by the caller. The rack
/// checks before it mutates, so a returned error leaves the graph unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RackError {
    /// The module is not registered.
    #[error("{0} is not registered")]
    ModuleNotFound(ModuleId),

    /// The wire is not registered.
    #[error("{0} is not registered")]
    WireNotFound(WireId),

    /// A port or param index exceeds the module's layout.
    #[error("{module} has no {kind} {index} (it has {count})")]
    PortOutOfRange {
        /// Module addressed.
        module: ModuleId,
        /// Port family addressed.
        kind: PortKind,
        /// Requested index.
        index: usize,
        /// Number of ports of that kind.
        count: usize,
    },

    /// The input already terminates another wire.
    #[error("{input} is already driven by {existing}")]
    InputOccupied {
        /// Input addressed.
        input: InputRef,
        /// Wire currently terminating there.
        existing: WireId,
    },

    /// The module still has wires attached.
    #[error("{module} still has {count} wire(s) attached")]
    ModuleHasWires {
        /// Module addressed.
        module: ModuleId,
        /// Number of wires still touching it.
        count: usize,
    },

    /// A param index exceeds the module's param table.
    #[error("{module} has no param {index} (it has {count})")]
    ParamOutOfRange {
        /// Module addressed.
        module: ModuleId,
        /// Requested param index.
        index: usize,
        /// Number of params.
        count: usize,
    },

    /// A param write carried NaN or an infinity.
    #[error("{module} param {index} cannot be set to {value}")]
    ParamNotFinite {
        /// Module addressed.
        module: ModuleId,
        /// Param index.
        index: usize,
        /// Rejected value.
        value: f32,
    },
}

impl RackError {
    /// Builds a [`RackError::PortOutOfRange`].
    pub fn port_out_of_range(module: ModuleId, kind: PortKind, index: usize, count: usize) -> Self {
        Self::PortOutOfRange {
            module,
            kind,
            index,
            count,
        }
    }
}
