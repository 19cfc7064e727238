//! Monotonic nanosecond clock for message timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use feed_core::Time;

/// Wall-clock time in nanoseconds since the Unix epoch.
pub fn wall_clock_nanos() -> Time {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(Time::MAX)
}

/// Clock that never moves backwards.
///
/// Readings follow the underlying source but are clamped to the last value
/// handed out, so a wall-clock step backwards yields repeated timestamps
/// rather than decreasing ones. Equal timestamps are ordered by insertion in
/// the store.
#[derive(Debug)]
pub struct MonotonicClock {
    source: fn() -> Time,
    last: AtomicI64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Clock backed by the system wall clock.
    pub fn new() -> Self {
        Self::with_source(wall_clock_nanos)
    }

    /// Clock backed by an arbitrary source.
    pub fn with_source(source: fn() -> Time) -> Self {
        Self {
            source,
            last: AtomicI64::new(Time::MIN),
        }
    }

    /// Current reading, never less than any previous one.
    pub fn now(&self) -> Time {
        let reading = (self.source)();
        let previous = self.last.fetch_max(reading, Ordering::AcqRel);
        previous.max(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;

    static SCRIPTED: AtomicI64 = AtomicI64::new(0);

    fn scripted() -> Time {
        SCRIPTED.load(Ordering::SeqCst)
    }

    #[test]
    fn test_wall_clock_is_nonnegative() {
        assert!(MonotonicClock::new().now() > 0);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let clock = MonotonicClock::with_source(scripted);

        SCRIPTED.store(100, Ordering::SeqCst);
        assert_eq!(clock.now(), 100);

        SCRIPTED.store(50, Ordering::SeqCst);
        assert_eq!(clock.now(), 100);

        SCRIPTED.store(150, Ordering::SeqCst);
        assert_eq!(clock.now(), 150);
    }

    #[test]
    fn test_constant_source_repeats() {
        let clock = MonotonicClock::with_source(|| 7);
        assert_eq!(clock.now(), 7);
        assert_eq!(clock.now(), 7);
    }
}
