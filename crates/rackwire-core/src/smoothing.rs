//! Parameter ramps for click-free knob changes.
//!
//! A jump in a parameter value is audible as a click when the parameter drives
//! a level or a frequency. The rack therefore offers a smoothed write path
//! ([`Rack::set_param_smooth`](crate::Rack::set_param_smooth)) that moves the
//! parameter toward its target a little every frame. The ramp shape is chosen
//! by [`SmoothingConfig`]:
//!
//! - **Exponential** (one-pole lowpass, [`SmoothedValue`]): fast at first, then
//!   settles. The default time constant of 1000/60 ms matches a decay rate of
//!   60 per second.
//! - **Linear** ([`LinearRamp`]): constant rate, reaches the target after
//!   exactly `time_ms`.
//!
//! ```rust
//! use rackwire_core::{SmoothingConfig, SmoothingMode, ParamRamp};
//!
//! let config = SmoothingConfig { mode: SmoothingMode::Linear, time_ms: 10.0 };
//! let mut ramp = ParamRamp::new(&config, 0.0, 1.0, 48000.0);
//! for _ in 0..480 {
//!     ramp.advance();
//! }
//! assert!(ramp.is_settled());
//! assert_eq!(ramp.value(), 1.0);
//! ```

use libm::expf;
use serde::{Deserialize, Serialize};

/// Default smoothing time in milliseconds (one time constant at 60/s).
pub const DEFAULT_SMOOTHING_MS: f32 = 1000.0 / 60.0;

/// Shape of a smoothed parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// One-pole exponential approach; `time_ms` is the time constant.
    #[default]
    Exponential,
    /// Straight line; `time_ms` is the total ramp duration.
    Linear,
}

/// Smoothing settings shared by every parameter of a rack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Ramp shape.
    #[serde(default)]
    pub mode: SmoothingMode,
    /// Time constant (exponential) or duration (linear) in milliseconds.
    #[serde(default = "default_time_ms")]
    pub time_ms: f32,
}

fn default_time_ms() -> f32 {
    DEFAULT_SMOOTHING_MS
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            mode: SmoothingMode::Exponential,
            time_ms: DEFAULT_SMOOTHING_MS,
        }
    }
}

/// One-pole exponential smoother.
///
/// `y[n] = y[n-1] + coeff * (target - y[n-1])` with
/// `coeff = 1 - exp(-1 / (tau * sample_rate))`. A non-positive time or rate
/// disables smoothing (`coeff = 1`).
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    coeff: f32,
    time_ms: f32,
}

impl SmoothedValue {
    /// Creates a smoother starting at `initial` with the given time constant.
    pub fn new(initial: f32, sample_rate: f32, time_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: one_pole_coeff(sample_rate, time_ms),
            time_ms,
        }
    }

    /// Recomputes the coefficient for a new rate, keeping the time constant.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.coeff = one_pole_coeff(sample_rate, self.time_ms);
    }

    /// Sets a new target without moving the current value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advances one frame and returns the new value.
    ///
    /// Snaps to the target once a step no longer changes the value, which
    /// happens when the remaining distance is below float granularity.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let next = self.current + self.coeff * (self.target - self.current);
        if next == self.current {
            self.current = self.target;
        } else {
            self.current = next;
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the current value equals the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

fn one_pole_coeff(sample_rate: f32, time_ms: f32) -> f32 {
    if time_ms <= 0.0 || sample_rate <= 0.0 {
        return 1.0;
    }
    let samples = time_ms * sample_rate / 1000.0;
    1.0 - expf(-1.0 / samples)
}

/// Linear ramp with a fixed duration.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    increment: f32,
    frames_remaining: u32,
    sample_rate: f32,
}

impl LinearRamp {
    /// Creates a ramp from `initial` to `target` lasting `time_ms`.
    ///
    /// A duration shorter than one frame jumps straight to the target.
    pub fn new(initial: f32, target: f32, sample_rate: f32, time_ms: f32) -> Self {
        let frames = (time_ms * sample_rate / 1000.0).round().max(0.0) as u32;
        if frames == 0 {
            return Self {
                current: target,
                target,
                increment: 0.0,
                frames_remaining: 0,
                sample_rate,
            };
        }
        Self {
            current: initial,
            target,
            increment: (target - initial) / frames as f32,
            frames_remaining: frames,
            sample_rate,
        }
    }

    /// Re-times the rest of the ramp for a new rate.
    ///
    /// The remaining wall-clock duration is kept, so the ramp still ends
    /// when it would have at the old rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if self.frames_remaining == 0 || self.sample_rate <= 0.0 {
            self.sample_rate = sample_rate;
            return;
        }
        let frames =
            (self.frames_remaining as f32 * sample_rate / self.sample_rate).round() as u32;
        self.sample_rate = sample_rate;
        if frames == 0 {
            self.current = self.target;
            self.frames_remaining = 0;
            self.increment = 0.0;
        } else {
            self.increment = (self.target - self.current) / frames as f32;
            self.frames_remaining = frames;
        }
    }

    /// Advances one frame and returns the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.frames_remaining > 0 {
            self.current += self.increment;
            self.frames_remaining -= 1;
            if self.frames_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the ramp has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.frames_remaining == 0
    }
}

/// A ramp of either shape, as selected by [`SmoothingConfig`].
#[derive(Debug, Clone)]
pub enum ParamRamp {
    /// Exponential approach.
    Exponential(SmoothedValue),
    /// Constant-rate approach.
    Linear(LinearRamp),
}

impl ParamRamp {
    /// Builds a ramp from `from` toward `to` using the configured shape.
    pub fn new(config: &SmoothingConfig, from: f32, to: f32, sample_rate: f32) -> Self {
        match config.mode {
            SmoothingMode::Exponential => {
                let mut value = SmoothedValue::new(from, sample_rate, config.time_ms);
                value.set_target(to);
                Self::Exponential(value)
            }
            SmoothingMode::Linear => {
                Self::Linear(LinearRamp::new(from, to, sample_rate, config.time_ms))
            }
        }
    }

    /// Carries the ramp over to a new sample rate without changing its shape
    /// or its remaining duration.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        match self {
            Self::Exponential(v) => v.set_sample_rate(sample_rate),
            Self::Linear(r) => r.set_sample_rate(sample_rate),
        }
    }

    /// Advances one frame and returns the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self {
            Self::Exponential(v) => v.advance(),
            Self::Linear(r) => r.advance(),
        }
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f32 {
        match self {
            Self::Exponential(v) => v.value(),
            Self::Linear(r) => r.value(),
        }
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        match self {
            Self::Exponential(v) => v.target(),
            Self::Linear(r) => r.target(),
        }
    }

    /// True once the ramp reached its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        match self {
            Self::Exponential(v) => v.is_settled(),
            Self::Linear(r) => r.is_settled(),
        }
    }
}
