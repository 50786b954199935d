//! Blink pattern generator driven by the monotonic clock.
//!
//! Patterns advance one step every 65.536 ms (a 16-bit shift of the
//! microsecond clock), so every consumer sampling the same clock sees the
//! same phase without sharing state.

/// Microsecond shift selecting the pattern step; 1 << 16 us per step.
const STEP_SHIFT: u32 = 16;

/// Startup gate pattern: 3 steps on, 7 off (~200 ms flash per ~650 ms).
const STARTUP_STEPS: &[bool] = &[
    true, true, true, false, false, false, false, false, false, false,
];

/// Error pattern: even 50% square wave, clearly distinct from startup.
const ERROR_STEPS: &[bool] = &[false, true];

/// A repeating on/off pattern indexed by the current time.
#[derive(Debug, Clone, Copy)]
pub struct BlinkPattern {
    steps: &'static [bool],
}

impl BlinkPattern {
    /// Pattern shown while waiting for the first stick movement.
    #[must_use]
    pub const fn startup() -> Self {
        Self {
            steps: STARTUP_STEPS,
        }
    }

    /// Pattern shown while a channel has no usable signal.
    #[must_use]
    pub const fn error() -> Self {
        Self { steps: ERROR_STEPS }
    }

    /// Returns the pattern level for the given timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppm_rover::actuation::BlinkPattern;
    ///
    /// let pattern = BlinkPattern::error();
    /// assert!(!pattern.level_at(0));
    /// assert!(pattern.level_at(1 << 16));
    /// ```
    #[must_use]
    pub fn level_at(&self, now_us: u64) -> bool {
        let step = (now_us >> STEP_SHIFT) as usize % self.steps.len();
        self.steps[step]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_US: u64 = 1 << STEP_SHIFT;

    #[test]
    fn test_startup_pattern_duty() {
        let pattern = BlinkPattern::startup();
        let on_steps = (0..10u64)
            .filter(|step| pattern.level_at(step * STEP_US))
            .count();
        assert_eq!(on_steps, 3);
    }

    #[test]
    fn test_startup_pattern_starts_on() {
        let pattern = BlinkPattern::startup();
        assert!(pattern.level_at(0));
        assert!(pattern.level_at(2 * STEP_US));
        assert!(!pattern.level_at(3 * STEP_US));
    }

    #[test]
    fn test_error_pattern_alternates() {
        let pattern = BlinkPattern::error();
        assert!(!pattern.level_at(0));
        assert!(pattern.level_at(STEP_US));
        assert!(!pattern.level_at(2 * STEP_US));
    }

    #[test]
    fn test_pattern_repeats() {
        let pattern = BlinkPattern::startup();
        for step in 0..10u64 {
            assert_eq!(
                pattern.level_at(step * STEP_US),
                pattern.level_at((step + 10) * STEP_US)
            );
        }
    }

    #[test]
    fn test_level_constant_within_step() {
        let pattern = BlinkPattern::error();
        assert_eq!(pattern.level_at(STEP_US), pattern.level_at(2 * STEP_US - 1));
    }
}
