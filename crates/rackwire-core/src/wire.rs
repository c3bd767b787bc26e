//! Wires: directed links from one output to one input.
//!
//! A wire owns no processing logic. Once per frame, after every module
//! stepped, the rack copies the source output's value into the destination
//! input, so each hop adds exactly one frame of latency and feedback loops
//! need no special casing.

use crate::ids::{InputRef, OutputRef, WireId};

/// A registered connection. Endpoints never change; rewiring means removing
/// the wire and adding a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wire {
    /// Handle assigned by the rack.
    pub id: WireId,
    /// Source jack.
    pub output: OutputRef,
    /// Destination jack.
    pub input: InputRef,
}

/// A wire plus the dense module indices of its endpoints, refreshed whenever
/// the module list is compacted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WireSlot {
    pub wire: Wire,
    pub out_idx: usize,
    pub in_idx: usize,
}
