//! Engine configuration.

use rackwire_core::{DEFAULT_SAMPLE_RATE, SmoothingConfig};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings read once when an [`Engine`](crate::Engine) is built.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```rust
/// use rackwire_engine::EngineConfig;
///
/// let config: EngineConfig = toml::from_str("sample_rate = 96000.0").unwrap();
/// assert_eq!(config.sample_rate, 96000.0);
/// assert_eq!(config.frames_per_lock, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial sample rate in Hz.
    pub sample_rate: f32,
    /// Frames stepped per acquisition of the graph lock.
    pub frames_per_lock: usize,
    /// Time every module step and keep a smoothed per-module reading.
    pub power_meter: bool,
    /// How far ahead of wall-clock time the engine thread may run before it
    /// starts sleeping, in seconds.
    pub ahead_max_secs: f64,
    /// Shape and time of smoothed param writes.
    pub smoothing: SmoothingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frames_per_lock: 1,
            power_meter: false,
            ahead_max_secs: 1.0,
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::invalid_config(
                "sample_rate",
                format!("must be a positive number, got {}", self.sample_rate),
            ));
        }
        if self.frames_per_lock == 0 {
            return Err(Error::invalid_config("frames_per_lock", "must be at least 1"));
        }
        if !(self.ahead_max_secs.is_finite() && self.ahead_max_secs >= 0.0) {
            return Err(Error::invalid_config(
                "ahead_max_secs",
                format!("must be zero or positive, got {}", self.ahead_max_secs),
            ));
        }
        if !(self.smoothing.time_ms.is_finite() && self.smoothing.time_ms >= 0.0) {
            return Err(Error::invalid_config(
                "smoothing.time_ms",
                format!("must be zero or positive, got {}", self.smoothing.time_ms),
            ));
        }
        Ok(())
    }
}
