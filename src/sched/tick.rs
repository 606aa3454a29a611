//! Tick to real-time conversion.
//!
//! The host measures intervals in fixed-duration simulation ticks; the
//! scheduling layer works in real time. The conversion lives here as a pure
//! function so it can be tested independently of any timer machinery.

use std::time::Duration;

use crate::constants::tick::TICK_DURATION;

/// Converts tick counts into real-time durations for a fixed tick quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    tick: Duration,
}

impl TickClock {
    /// Create a clock with a custom tick duration.
    pub const fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Clock using the host's standard 50 ms tick.
    pub const fn standard() -> Self {
        Self {
            tick: TICK_DURATION,
        }
    }

    /// Duration of a single tick.
    pub const fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Real-time delay equivalent to `ticks` ticks. Saturates on overflow.
    pub fn delay(&self, ticks: u64) -> Duration {
        let millis = (self.tick.as_millis() as u64).saturating_mul(ticks);
        Duration::from_millis(millis)
    }

    /// Repeat period for an interval of `ticks` ticks.
    ///
    /// A zero interval is clamped to one tick; timers cannot run at a zero
    /// period.
    pub fn period(&self, ticks: u64) -> Duration {
        let delay = self.delay(ticks);
        if delay.is_zero() {
            self.tick
        } else {
            delay
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ticks_is_zero_delay() {
        assert_eq!(TickClock::standard().delay(0), Duration::ZERO);
    }

    #[test]
    fn test_delay_scales_linearly_with_ticks() {
        let clock = TickClock::standard();
        for ticks in [1u64, 2, 5, 20, 1200] {
            assert_eq!(clock.delay(ticks), Duration::from_millis(ticks * 50));
        }
    }

    #[test]
    fn test_custom_tick_duration() {
        let clock = TickClock::new(Duration::from_millis(25));
        assert_eq!(clock.delay(4), Duration::from_millis(100));
    }

    #[test]
    fn test_delay_saturates_on_overflow() {
        let clock = TickClock::standard();
        // Must not panic for absurd tick counts.
        let huge = clock.delay(u64::MAX);
        assert!(huge >= clock.delay(u64::MAX / 50));
    }

    #[test]
    fn test_period_clamps_zero_interval() {
        let clock = TickClock::standard();
        assert_eq!(clock.period(0), clock.tick_duration());
        assert_eq!(clock.period(3), Duration::from_millis(150));
    }
}
