use core::{cmp::Ordering, fmt, marker::PhantomData, time::Duration};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    DEFAULT_EPOCH, Error, Result, Snowflake, SnowflakeId, SystemClock, TimeSource,
    generator::mutex::{Mutex, lock},
    time::duration_millis,
};

/// The mutable half of a generator: the last timestamp handed out, in
/// milliseconds since the Unix epoch, and the sequence used within it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    pub(crate) last_timestamp: u64,
    pub(crate) sequence: u64,
}

/// A lock-based Snowflake ID generator for multi-threaded use.
///
/// The last timestamp and sequence live together in an [`Arc<Mutex<_>>`]
/// and every call to [`next_id`] holds the lock from the clock read until the
/// ID is encoded. Clones share that state, so cloning a generator into
/// several threads behaves exactly like sharing one by reference.
///
/// Build exactly one generator (and clones of it) per instance ID. Two
/// independent generators with the same instance ID will collide.
///
/// ## Clock handling
///
/// - Clock ahead of the last timestamp: adopt it and restart the sequence.
/// - Same millisecond: bump the sequence. When all sequence values of the
///   millisecond are used up, borrow the next millisecond instead of waiting
///   for the clock.
/// - Clock behind the last timestamp: ignore it and advance the last
///   timestamp by one millisecond.
///
/// The last rule keeps IDs unique through clock regressions, but every call
/// made while the clock is behind pushes the generator one more millisecond
/// ahead of real time. Nothing bounds that drift; a long enough regression
/// under load ends in [`Error::EpochExhausted`].
///
/// ## Failure modes
///
/// The classic Snowflake scheme fails only on epoch exhaustion. This
/// generator also returns [`Error::ClockBeforeEpoch`] when its time is
/// earlier than the epoch, instead of encoding a negative offset. Callers
/// matching on the error should handle both.
///
/// [`next_id`]: IdGenerator::next_id
pub struct IdGenerator<ID = SnowflakeId, T = SystemClock>
where
    ID: Snowflake,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    instance_id: u64,
    epoch: u64,
    time: T,
    _id: PhantomData<fn() -> ID>,
}

impl IdGenerator {
    /// Creates a generator for `instance_id` using the system clock and
    /// [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstanceId`] if `instance_id` is larger than
    /// [`SnowflakeId::max_instance_id`] (1023).
    ///
    /// # Example
    ///
    /// ```
    /// use flakegen::{Error, IdGenerator};
    ///
    /// assert!(IdGenerator::new(1023).is_ok());
    /// assert!(matches!(
    ///     IdGenerator::new(1024),
    ///     Err(Error::InvalidInstanceId { instance_id: 1024, max: 1023 })
    /// ));
    /// ```
    pub fn new(instance_id: u64) -> Result<Self> {
        Self::with_clock(instance_id, SystemClock)
    }
}

impl<ID, T> IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    /// Creates a generator reading time from `clock`, measured against
    /// [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstanceId`] if `instance_id` does not fit the
    /// layout's instance ID field.
    ///
    /// # Example
    ///
    /// ```
    /// use flakegen::{IdGenerator, MonotonicClock, SnowflakeId};
    ///
    /// let generator: IdGenerator<SnowflakeId, _> =
    ///     IdGenerator::with_clock(3, MonotonicClock::new())?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.instance_id(), 3);
    /// # Ok::<(), flakegen::Error>(())
    /// ```
    pub fn with_clock(instance_id: u64, clock: T) -> Result<Self> {
        Self::with_epoch(instance_id, DEFAULT_EPOCH, clock)
    }

    /// Creates a generator with a custom epoch, given as the time since
    /// 1970-01-01 UTC.
    ///
    /// IDs only decode to the right instant against the same epoch, so every
    /// generator sharing an ID space must use the same one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstanceId`] if `instance_id` does not fit the
    /// layout's instance ID field.
    pub fn with_epoch(instance_id: u64, epoch: Duration, clock: T) -> Result<Self> {
        Self::from_components(0, instance_id, 0, epoch, clock)
    }

    /// Creates a generator preloaded with explicit state.
    ///
    /// `last_timestamp` is in milliseconds since the Unix epoch, like the
    /// clock. `sequence` is masked to the layout's sequence width. Useful for
    /// resuming close to a previously recorded position or for driving the
    /// generator to the edges of its layout.
    ///
    /// In typical use, prefer [`Self::with_clock`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstanceId`] if `instance_id` does not fit the
    /// layout's instance ID field.
    pub fn from_components(
        last_timestamp: u64,
        instance_id: u64,
        sequence: u64,
        epoch: Duration,
        clock: T,
    ) -> Result<Self> {
        const { assert!(ID::LAYOUT_FITS, "snowflake layout does not fit in 63 bits") };

        if instance_id > ID::INSTANCE_ID_MASK {
            return Err(Error::InvalidInstanceId {
                instance_id,
                max: ID::INSTANCE_ID_MASK,
            });
        }

        let state = State {
            last_timestamp,
            sequence: sequence & ID::SEQUENCE_MASK,
        };
        let epoch = duration_millis(epoch);

        #[cfg(feature = "tracing")]
        tracing::debug!(instance_id, epoch, "created id generator");

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
            instance_id,
            epoch,
            time: clock,
            _id: PhantomData,
        })
    }

    /// The instance ID encoded into every ID from this generator.
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// The epoch timestamps are measured from.
    pub fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch)
    }

    /// Generates the next ID.
    ///
    /// Never blocks beyond acquiring the lock and never waits for the clock.
    ///
    /// # Errors
    ///
    /// - [`Error::EpochExhausted`] once the time since the epoch no longer
    ///   fits the timestamp field. The generator stays exhausted.
    /// - [`Error::ClockBeforeEpoch`] if the generator's time is earlier than
    ///   its epoch, for example a custom epoch set in the future. Plain
    ///   Snowflake generators have no such error; handle it alongside
    ///   exhaustion.
    ///
    /// # Example
    ///
    /// ```
    /// use flakegen::{IdGenerator, Snowflake, TimeSource};
    ///
    /// struct FixedTime;
    /// impl TimeSource for FixedTime {
    ///     fn current_millis(&self) -> u64 {
    ///         1_700_000_000_000
    ///     }
    /// }
    ///
    /// let generator: IdGenerator<flakegen::SnowflakeId, _> = IdGenerator::with_clock(1, FixedTime)?;
    /// let first = generator.next_id()?;
    /// let second = generator.next_id()?;
    ///
    /// assert_eq!(first.timestamp(), second.timestamp());
    /// assert_eq!(second.sequence(), first.sequence() + 1);
    /// # Ok::<(), flakegen::Error>(())
    /// ```
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self), fields(instance_id = self.instance_id))
    )]
    pub fn next_id(&self) -> Result<ID> {
        let mut state = lock(&self.state);
        let now = self.time.current_millis();

        match state.last_timestamp.cmp(&now) {
            Ordering::Less => {
                state.last_timestamp = now;
                state.sequence = 0;
            }
            Ordering::Equal => {
                state.sequence = (state.sequence + 1) & ID::SEQUENCE_MASK;
                if state.sequence == 0 {
                    state.last_timestamp = state.last_timestamp.saturating_add(1);
                }
            }
            Ordering::Greater => Self::cold_clock_behind(&mut state, now),
        }

        self.encode(&state)
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(state: &mut State, _now: u64) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            now = _now,
            last_timestamp = state.last_timestamp,
            "clock behind last timestamp, advancing logical clock"
        );
        state.last_timestamp = state.last_timestamp.saturating_add(1);
        state.sequence = 0;
    }

    fn encode(&self, state: &State) -> Result<ID> {
        let Some(elapsed) = state.last_timestamp.checked_sub(self.epoch) else {
            return Err(Error::ClockBeforeEpoch {
                now: state.last_timestamp,
                epoch: self.epoch,
            });
        };

        if elapsed > ID::TIMESTAMP_MASK {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                elapsed,
                max = ID::TIMESTAMP_MASK,
                "epoch exhausted, generator can no longer issue ids"
            );
            return Err(Error::EpochExhausted {
                elapsed,
                max: ID::TIMESTAMP_MASK,
            });
        }

        Ok(ID::from_components(elapsed, self.instance_id, state.sequence))
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> State {
        *lock(&self.state)
    }
}

impl<ID, T> Clone for IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            instance_id: self.instance_id,
            epoch: self.epoch,
            time: self.time.clone(),
            _id: PhantomData,
        }
    }
}

impl<ID, T> fmt::Debug for IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("instance_id", &self.instance_id)
            .field("epoch", &self.epoch)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
