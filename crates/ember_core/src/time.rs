//! Session time and clock abstraction
//!
//! Gameplay deadlines (attack windows, hit cooldowns, shunt expiry) are
//! polled against a [`Clock`] rather than read from the system clock inline,
//! so tests can drive time explicitly.

use std::cell::Cell;
use std::ops::Add;
use std::time::{Duration, Instant};

/// A point in session time, measured in seconds since the clock started.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct GameTime(f64);

impl GameTime {
    /// The start of the session.
    pub const ZERO: Self = Self(0.0);

    /// Create from seconds since session start.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since session start.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Elapsed time since `earlier`, saturating to zero if `earlier` is
    /// in the future.
    pub fn duration_since(&self, earlier: GameTime) -> Duration {
        Duration::try_from_secs_f64((self.0 - earlier.0).max(0.0)).unwrap_or(Duration::ZERO)
    }
}

impl Add<Duration> for GameTime {
    type Output = GameTime;

    fn add(self, rhs: Duration) -> GameTime {
        GameTime(self.0 + rhs.as_secs_f64())
    }
}

/// Source of session time.
pub trait Clock {
    /// Current session time.
    fn now(&self) -> GameTime;
}

/// Monotonic wall clock, anchored at construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> GameTime {
        GameTime(self.start.elapsed().as_secs_f64())
    }
}

/// Manually driven clock for tests.
pub struct ManualClock {
    current: Cell<f64>,
}

impl ManualClock {
    /// Create a clock at session start.
    pub fn new() -> Self {
        Self {
            current: Cell::new(0.0),
        }
    }

    /// Advance by a duration.
    pub fn advance(&self, delta: Duration) {
        self.current.set(self.current.get() + delta.as_secs_f64());
    }

    /// Jump to an absolute session time.
    pub fn set(&self, time: GameTime) {
        self.current.set(time.as_secs_f64());
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> GameTime {
        GameTime(self.current.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_comparison() {
        let start = GameTime::ZERO;
        let deadline = start + Duration::from_millis(500);

        assert!(GameTime::from_secs_f64(0.4) < deadline);
        assert!(GameTime::from_secs_f64(0.6) > deadline);
        assert_eq!(GameTime::from_secs_f64(0.5), deadline);
    }

    #[test]
    fn test_duration_since() {
        let a = GameTime::from_secs_f64(1.0);
        let b = GameTime::from_secs_f64(2.5);

        assert_eq!(b.duration_since(a), Duration::from_millis(1500));
        // Saturates instead of going negative
        assert_eq!(a.duration_since(b), Duration::ZERO);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), GameTime::ZERO);

        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), GameTime::from_secs_f64(0.032));

        clock.set(GameTime::from_secs_f64(10.0));
        assert_eq!(clock.now().as_secs_f64(), 10.0);
    }
}
