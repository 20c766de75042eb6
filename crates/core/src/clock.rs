//! Time sources for tracking timestamps.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;

/// Supplies "now" for tracking events.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Deterministic eviction order in tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the Unix epoch plus `millis`.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn set_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = DateTime::from_timestamp_millis(millis).unwrap_or_default();
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.now().timestamp_millis(), 1_000);
        clock.advance(TimeDelta::milliseconds(250));
        assert_eq!(clock.now().timestamp_millis(), 1_250);
        clock.set_millis(3);
        assert_eq!(clock.now().timestamp_millis(), 3);
    }
}
