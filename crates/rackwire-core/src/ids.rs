//! Stable handles for modules, wires and ports.
//!
//! A [`ModuleId`] or [`WireId`] is assigned sequentially by the rack starting at
//! 1 and is never reused within one rack instance, so a stale handle can only
//! miss, never alias a newer object. Ports are addressed by the owning module
//! plus a zero-based index ([`OutputRef`], [`InputRef`]).

use core::fmt;

/// Unique identifier of a module registered in a rack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Unique identifier of a wire registered in a rack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub(crate) u32);

impl WireId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire#{}", self.0)
    }
}

/// An output port: module plus output index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputRef {
    /// Owning module.
    pub module: ModuleId,
    /// Output index within the module.
    pub port: usize,
}

impl OutputRef {
    /// Creates an output reference.
    pub const fn new(module: ModuleId, port: usize) -> Self {
        Self { module, port }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.out[{}]", self.module, self.port)
    }
}

/// An input port: module plus input index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputRef {
    /// Owning module.
    pub module: ModuleId,
    /// Input index within the module.
    pub port: usize,
}

impl InputRef {
    /// Creates an input reference.
    pub const fn new(module: ModuleId, port: usize) -> Self {
        Self { module, port }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.in[{}]", self.module, self.port)
    }
}

/// Port family addressed by an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Signal enters the module here.
    Input,
    /// Signal leaves the module here.
    Output,
    /// Display-only light.
    Light,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
            Self::Light => f.write_str("light"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ModuleId(3).to_string(), "module#3");
        assert_eq!(WireId(7).to_string(), "wire#7");
        assert_eq!(OutputRef::new(ModuleId(1), 2).to_string(), "module#1.out[2]");
        assert_eq!(InputRef::new(ModuleId(4), 0).to_string(), "module#4.in[0]");
    }

    #[test]
    fn test_ordering_follows_creation() {
        assert!(ModuleId(1) < ModuleId(2));
        assert_eq!(WireId(5).index(), 5);
    }
}
