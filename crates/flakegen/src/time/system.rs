use std::time::{SystemTime, UNIX_EPOCH};

use crate::{TimeSource, time::duration_millis};

/// The operating system's wall clock.
///
/// Every call reads `SystemTime::now()`, so NTP corrections, manual changes
/// and VM pauses show up as they happen, including jumps backwards. A system
/// time earlier than 1970 reads as `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, duration_millis)
    }
}
