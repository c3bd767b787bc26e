//! Unit conversions for control-voltage signals.
//!
//! Signals in a rack are plain volts. Pitch follows the 1 V/octave convention
//! with 0 V at C4 ([`C4_HZ`]); audio and bipolar modulation sit in ±5 V, and
//! unipolar modulation in 0..10 V.
//!
//! All functions are allocation-free and safe to call from
//! [`Module::step`](crate::Module::step).

use libm::{expf, log2f, powf};

/// Frequency of C4 in Hz, the pitch at 0 V.
pub const C4_HZ: f32 = 261.625_58;

/// Converts a 1 V/oct pitch voltage to a frequency in Hz.
///
/// ```rust
/// use rackwire_core::math::{volts_to_hz, C4_HZ};
///
/// assert!((volts_to_hz(0.0) - C4_HZ).abs() < 1e-3);
/// assert!((volts_to_hz(1.0) - 2.0 * C4_HZ).abs() < 1e-2);
/// ```
#[inline]
pub fn volts_to_hz(volts: f32) -> f32 {
    C4_HZ * powf(2.0, volts)
}

/// Converts a frequency in Hz to a 1 V/oct pitch voltage.
#[inline]
pub fn hz_to_volts(hz: f32) -> f32 {
    log2f(hz.max(f32::MIN_POSITIVE) / C4_HZ)
}

/// Linearly maps `x` from `[x_min, x_max]` to `[y_min, y_max]`.
///
/// No clamping is applied; inputs outside the source range extrapolate.
#[inline]
pub fn rescale(x: f32, x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> f32 {
    y_min + (x - x_min) / (x_max - x_min) * (y_max - y_min)
}

/// Clamps `x` between two bounds given in either order.
#[inline]
pub fn clamp_safe(x: f32, a: f32, b: f32) -> f32 {
    x.clamp(a.min(b), a.max(b))
}

/// Crossfades from `a` (at `t = 0`) to `b` (at `t = 1`).
#[inline]
pub fn crossfade(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Converts decibels to a linear gain factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_round_trip() {
        for v in [-3.0, -0.5, 0.0, 0.25, 2.0, 4.5] {
            let back = hz_to_volts(volts_to_hz(v));
            assert!((back - v).abs() < 1e-4, "{v} -> {back}");
        }
    }

    #[test]
    fn rescale_maps_endpoints() {
        assert_eq!(rescale(0.0, 0.0, 1.0, -5.0, 5.0), -5.0);
        assert_eq!(rescale(1.0, 0.0, 1.0, -5.0, 5.0), 5.0);
        assert_eq!(rescale(0.5, 0.0, 1.0, -5.0, 5.0), 0.0);
    }

    #[test]
    fn clamp_safe_accepts_reversed_bounds() {
        assert_eq!(clamp_safe(7.0, 5.0, -5.0), 5.0);
        assert_eq!(clamp_safe(-7.0, 5.0, -5.0), -5.0);
    }

    #[test]
    fn db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.02) - 0.5).abs() < 1e-2);
    }

    #[test]
    fn crossfade_endpoints() {
        assert_eq!(crossfade(2.0, 4.0, 0.0), 2.0);
        assert_eq!(crossfade(2.0, 4.0, 1.0), 4.0);
    }
}
