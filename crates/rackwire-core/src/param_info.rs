//! Declared parameter ranges and module port layouts.
//!
//! Every module declares its ports up front through a [`ModuleLayout`]: a
//! static table of [`ParamDescriptor`]s plus the number of inputs, outputs and
//! lights. The rack sizes the module's [`Ports`](crate::Ports) from this
//! layout once, at registration, and never resizes them.
//!
//! Descriptors are `const`-constructible so a module can keep its table in a
//! `static`:
//!
//! ```rust
//! use rackwire_core::{ModuleLayout, ParamDescriptor};
//!
//! static PARAMS: [ParamDescriptor; 2] = [
//!     ParamDescriptor::new("Level", 0.0, 1.0, 0.5),
//!     ParamDescriptor::new("Mode", 0.0, 2.0, 0.0).stepped(),
//! ];
//!
//! let layout = ModuleLayout::new(&PARAMS, 1, 1, 0);
//! assert_eq!(layout.params[0].default, 0.5);
//! assert_eq!(layout.inputs, 1);
//! ```

/// Range and default of a single parameter.
///
/// The range is enforced by producers (the rack clamps values written through
/// its setters); the [`Param`](crate::Param) itself is a plain value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Display name.
    pub name: &'static str,
    /// Lowest allowed value.
    pub min: f32,
    /// Highest allowed value.
    pub max: f32,
    /// Value after creation and after a reset.
    pub default: f32,
    /// Whether a randomize request may change this parameter.
    pub randomizable: bool,
    /// Whether only integer values are meaningful.
    pub stepped: bool,
}

impl ParamDescriptor {
    /// Creates a continuous, randomizable parameter.
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            randomizable: true,
            stepped: false,
        }
    }

    /// Marks the parameter as excluded from randomization.
    pub const fn fixed(mut self) -> Self {
        self.randomizable = false;
        self
    }

    /// Marks the parameter as integer-valued.
    pub const fn stepped(mut self) -> Self {
        self.stepped = true;
        self
    }

    /// Clamps `value` into `[min, max]`, rounding stepped parameters.
    /// NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let v = value.clamp(self.min, self.max);
        if self.stepped { v.round() } else { v }
    }

    /// Returns true if `value` lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Port counts and parameter table of a module type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleLayout {
    /// Parameter descriptors, indexed by param id.
    pub params: &'static [ParamDescriptor],
    /// Number of inputs.
    pub inputs: usize,
    /// Number of outputs.
    pub outputs: usize,
    /// Number of lights.
    pub lights: usize,
}

impl ModuleLayout {
    /// Creates a layout.
    pub const fn new(
        params: &'static [ParamDescriptor],
        inputs: usize,
        outputs: usize,
        lights: usize,
    ) -> Self {
        Self {
            params,
            inputs,
            outputs,
            lights,
        }
    }

    /// Layout with no ports at all.
    pub const fn empty() -> Self {
        Self::new(&[], 0, 0, 0)
    }
}
