use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::{TimeSource, time::duration_millis};

/// A clock that samples the wall clock once and then only moves forward.
///
/// Construction records `SystemTime::now()` next to an [`Instant`]; every
/// read returns that wall-clock anchor plus the monotonic time elapsed since.
/// Later wall-clock adjustments are ignored, so the generator never sees a
/// regression, at the cost of drifting from the system clock over long
/// uptimes.
///
/// Copies share the same anchor.
///
/// # Example
///
/// ```
/// use flakegen::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new();
/// let a = clock.current_millis();
/// let b = clock.current_millis();
/// assert!(b >= a);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    start_millis: u64,
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time.
    pub fn new() -> Self {
        let start_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, duration_millis);
        Self {
            start: Instant::now(),
            start_millis,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.start_millis
            .saturating_add(duration_millis(self.start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemClock;
    use std::{thread, time::Duration};

    #[test]
    fn starts_near_the_system_clock() {
        let system = SystemClock.current_millis();
        let clock = MonotonicClock::new();
        let mono = clock.current_millis();
        assert!(mono.abs_diff(system) < 1_000, "mono {mono}, system {system}");
    }

    #[test]
    fn never_goes_backwards() {
        let clock = MonotonicClock::new();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_with_elapsed_time() {
        let clock = MonotonicClock::new();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(5));
        assert!(clock.current_millis() >= before + 5);
    }
}
