use core::time::Duration;
use std::sync::Arc;

/// Default epoch: Saturday, January 1, 2022 00:00:00 UTC+8
/// (2021-12-31 16:00:00 UTC)
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_640_966_400_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// The generator reads the clock once per ID while holding its lock, so an
/// implementation should be cheap and must not block. Nothing requires the
/// reported time to be monotonic; the generator copes with regressions.
///
/// Plugging in a hand-written source makes clock behaviour deterministic in
/// tests.
///
/// # Example
///
/// ```
/// use flakegen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_700_000_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_700_000_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epochs_are_in_order() {
        assert!(TWITTER_EPOCH < DISCORD_EPOCH);
        assert!(DISCORD_EPOCH < DEFAULT_EPOCH);
        assert_eq!(duration_millis(DEFAULT_EPOCH), 1_640_966_400_000);
    }

    #[test]
    fn duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
        assert_eq!(duration_millis(Duration::from_micros(1_999)), 1);
    }
}
