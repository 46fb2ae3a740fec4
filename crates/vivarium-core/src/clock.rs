//! World clock for the Vivarium simulation.
//!
//! The clock is the single source of truth for simulated time. It counts
//! completed ticks and derives elapsed simulated milliseconds from the
//! configured tick interval; elapsed time is never stored independently.
//!
//! All temporal derivations use checked or saturating arithmetic.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Tick counter and simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldClock {
    /// Completed ticks since the last reset.
    tick: u64,

    /// Simulated milliseconds per tick.
    tick_interval_ms: u64,
}

impl WorldClock {
    /// Create a clock at tick 0.
    pub const fn new(tick_interval_ms: u64) -> Self {
        Self {
            tick: 0,
            tick_interval_ms,
        }
    }

    /// Create a clock at an explicit tick (state restoration).
    pub const fn from_parts(tick: u64, tick_interval_ms: u64) -> Self {
        Self {
            tick,
            tick_interval_ms,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the configured milliseconds per tick.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Change the milliseconds per tick. Already elapsed ticks are
    /// re-interpreted at the new rate.
    pub const fn set_tick_interval_ms(&mut self, ms: u64) {
        self.tick_interval_ms = ms;
    }

    /// Simulated milliseconds since the last reset, saturating.
    pub const fn elapsed_ms(&self) -> u64 {
        self.tick.saturating_mul(self.tick_interval_ms)
    }

    /// Return to tick 0, keeping the interval.
    pub const fn reset(&mut self) {
        self.tick = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = WorldClock::new(16);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_ms(), 0);
    }

    #[test]
    fn clock_advances() {
        let mut clock = WorldClock::new(16);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.elapsed_ms(), 32);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = WorldClock::from_parts(u64::MAX, 1);
        assert!(matches!(clock.advance(), Err(ClockError::TickOverflow)));
        assert_eq!(clock.tick(), u64::MAX);
    }

    #[test]
    fn elapsed_saturates() {
        let clock = WorldClock::from_parts(u64::MAX, 10);
        assert_eq!(clock.elapsed_ms(), u64::MAX);
    }

    #[test]
    fn reset_keeps_interval() {
        let mut clock = WorldClock::from_parts(500, 20);
        clock.reset();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.tick_interval_ms(), 20);
    }
}
