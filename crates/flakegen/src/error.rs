/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `flakegen` can produce.
///
/// None of them are transient: retrying the same call on the same generator
/// yields the same failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The instance ID does not fit in the layout's instance ID field.
    ///
    /// Returned only by the generator constructors.
    #[error("instance id {instance_id} out of range, must be between 0 and {max}")]
    InvalidInstanceId {
        /// The rejected instance ID.
        instance_id: u64,
        /// The largest instance ID the layout can encode.
        max: u64,
    },

    /// The elapsed time since the epoch no longer fits in the timestamp
    /// field.
    ///
    /// Either the deployment has outlived its epoch or repeated clock
    /// regressions pushed the generator's logical clock out of range. The
    /// generator cannot recover from this.
    #[error("epoch exhausted, elapsed {elapsed}ms exceeds the {max}ms timestamp budget")]
    EpochExhausted {
        /// Milliseconds since the epoch that failed to encode.
        elapsed: u64,
        /// The largest timestamp the layout can encode.
        max: u64,
    },

    /// The generator's logical clock is earlier than its epoch.
    ///
    /// This happens when the clock reports a time before the configured
    /// epoch, which usually means the epoch is wrong.
    #[error("clock reads {now}ms, which is before the epoch at {epoch}ms")]
    ClockBeforeEpoch {
        /// The generator's timestamp, in milliseconds since the Unix epoch.
        now: u64,
        /// The configured epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = Error::InvalidInstanceId {
            instance_id: 1024,
            max: 1023,
        };
        assert_eq!(
            err.to_string(),
            "instance id 1024 out of range, must be between 0 and 1023"
        );

        let err = Error::EpochExhausted {
            elapsed: 16,
            max: 15,
        };
        assert!(err.to_string().contains("16ms"));
    }
}
