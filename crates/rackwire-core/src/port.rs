//! Port value holders: [`Param`], [`Input`], [`Output`], [`Light`], and the
//! per-module [`Ports`] bundle.
//!
//! These are plain data. The only behavior is unit conversion on read
//! ([`Input::normalize`]) and brightness smoothing on [`Light`]. Signal flow
//! between modules is the rack's job: after every module stepped, each wire
//! copies its source [`Output::value`] into its destination [`Input::value`].

use crate::param_info::ModuleLayout;

/// Decay rate of a smoothed light, in 1/s.
///
/// A light that drops to zero falls to about 37% of its brightness after
/// `1 / LIGHT_LAMBDA` seconds. Rising brightness is applied immediately.
pub const LIGHT_LAMBDA: f32 = 1.0 / 0.075;

/// Voltage at which a plug light reaches full brightness.
pub const PLUG_LIGHT_FULL_SCALE: f32 = 5.0;

/// A module parameter (knob, switch, button).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Param {
    /// Current value. Kept inside the declared range by whoever writes it.
    pub value: f32,
}

/// A display-only brightness accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Light {
    /// Brightness in `0.0..=1.0` (values above 1 are allowed and saturate when drawn).
    pub value: f32,
}

impl Light {
    /// Sets the brightness directly, squaring it for perceptual linearity.
    ///
    /// Negative brightness turns the light off.
    #[inline]
    pub fn set_brightness(&mut self, brightness: f32) {
        self.value = if brightness > 0.0 {
            brightness * brightness
        } else {
            0.0
        };
    }

    /// Moves toward `brightness` with an instant attack and a
    /// [`LIGHT_LAMBDA`] decay.
    #[inline]
    pub fn set_brightness_smooth(&mut self, brightness: f32, sample_time: f32) {
        let v = if brightness > 0.0 {
            brightness * brightness
        } else {
            0.0
        };
        if v < self.value {
            self.value += (v - self.value) * LIGHT_LAMBDA * sample_time;
        } else {
            self.value = v;
        }
    }
}

/// The positive/negative polarity light pair shown on a jack.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlugLights {
    /// Lit by positive voltage.
    pub positive: Light,
    /// Lit by negative voltage.
    pub negative: Light,
}

impl PlugLights {
    /// Updates both lights from the voltage on the jack.
    #[inline]
    pub fn update(&mut self, volts: f32, sample_time: f32) {
        let b = volts / PLUG_LIGHT_FULL_SCALE;
        self.positive.set_brightness_smooth(b, sample_time);
        self.negative.set_brightness_smooth(-b, sample_time);
    }
}

/// A signal input jack.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Input {
    /// Voltage delivered by the wire. Left at its last value (0 V after
    /// disconnection) when inactive.
    pub value: f32,
    /// True while a wire terminates here.
    pub active: bool,
    /// Polarity lights.
    pub plug_lights: PlugLights,
}

impl Input {
    /// Returns the wire's voltage if connected, else `default`.
    ///
    /// This is how unpatched jacks fall back to an internal value, e.g. a
    /// VCA's CV input defaulting to 10 V (fully open).
    #[inline]
    pub fn normalize(&self, default: f32) -> f32 {
        if self.active { self.value } else { default }
    }
}

/// A signal output jack.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Output {
    /// Voltage written by the owning module's step.
    pub value: f32,
    /// True while at least one wire leaves here.
    pub active: bool,
    /// Polarity lights.
    pub plug_lights: PlugLights,
}

/// The fixed-size port collections of one module.
///
/// Sized once from a [`ModuleLayout`]. Boxed slices cannot grow, so a module
/// keeps the same port count for its whole life.
#[derive(Debug, Clone)]
pub struct Ports {
    /// Parameters, indexed by param id.
    pub params: Box<[Param]>,
    /// Inputs, indexed by input id.
    pub inputs: Box<[Input]>,
    /// Outputs, indexed by output id.
    pub outputs: Box<[Output]>,
    /// Lights, indexed by light id.
    pub lights: Box<[Light]>,
}

impl Ports {
    /// Allocates ports for `layout`, with every param at its default.
    pub fn new(layout: &ModuleLayout) -> Self {
        Self {
            params: layout
                .params
                .iter()
                .map(|d| Param { value: d.default })
                .collect(),
            inputs: vec![Input::default(); layout.inputs].into_boxed_slice(),
            outputs: vec![Output::default(); layout.outputs].into_boxed_slice(),
            lights: vec![Light::default(); layout.lights].into_boxed_slice(),
        }
    }

    /// Reads param `id`, or 0 if out of range.
    #[inline]
    pub fn param(&self, id: usize) -> f32 {
        self.params.get(id).map_or(0.0, |p| p.value)
    }

    /// Reads input `id` with [`Input::normalize`] semantics.
    #[inline]
    pub fn input(&self, id: usize, default: f32) -> f32 {
        self.inputs.get(id).map_or(default, |i| i.normalize(default))
    }

    /// True if input `id` has a wire.
    #[inline]
    pub fn is_input_active(&self, id: usize) -> bool {
        self.inputs.get(id).is_some_and(|i| i.active)
    }

    /// True if output `id` has at least one wire.
    #[inline]
    pub fn is_output_active(&self, id: usize) -> bool {
        self.outputs.get(id).is_some_and(|o| o.active)
    }

    /// Writes output `id`. Out-of-range writes are ignored.
    #[inline]
    pub fn set_output(&mut self, id: usize, volts: f32) {
        if let Some(o) = self.outputs.get_mut(id) {
            o.value = volts;
        }
    }

    /// Zeroes every output.
    pub fn clear_outputs(&mut self) {
        for o in self.outputs.iter_mut() {
            o.value = 0.0;
        }
    }

    /// Refreshes plug lights of every active jack.
    pub(crate) fn update_plug_lights(&mut self, sample_time: f32) {
        for input in self.inputs.iter_mut().filter(|i| i.active) {
            let v = input.value;
            input.plug_lights.update(v, sample_time);
        }
        for output in self.outputs.iter_mut().filter(|o| o.active) {
            let v = output.value;
            output.plug_lights.update(v, sample_time);
        }
    }
}
