//! Edge detection for clock and reset inputs.

/// Schmitt trigger with a 0 V low threshold and a 1 V high threshold.
///
/// The hysteresis keeps a noisy or slowly rising signal from firing more than
/// once per edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchmittTrigger {
    high: bool,
}

impl SchmittTrigger {
    /// Voltage at or above which the trigger goes high.
    pub const HIGH_THRESHOLD: f32 = 1.0;
    /// Voltage at or below which the trigger goes low.
    pub const LOW_THRESHOLD: f32 = 0.0;

    /// Creates a trigger in the low state.
    pub const fn new() -> Self {
        Self { high: false }
    }

    /// Feeds one sample; returns true on a rising edge.
    #[inline]
    pub fn process(&mut self, volts: f32) -> bool {
        if self.high {
            if volts <= Self::LOW_THRESHOLD {
                self.high = false;
            }
            false
        } else if volts >= Self::HIGH_THRESHOLD {
            self.high = true;
            true
        } else {
            false
        }
    }

    /// True while the input is considered high.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Returns to the low state.
    pub fn reset(&mut self) {
        self.high = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_edge() {
        let mut t = SchmittTrigger::new();
        assert!(!t.process(0.5));
        assert!(t.process(1.0));
        assert!(!t.process(5.0));
        assert!(!t.process(0.5));
        assert!(t.is_high());
        assert!(!t.process(0.0));
        assert!(!t.is_high());
        assert!(t.process(2.0));
    }
}
