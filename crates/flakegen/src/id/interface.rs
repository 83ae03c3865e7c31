use core::{fmt, hash::Hash, time::Duration};

use crate::time::duration_millis;

/// Returns a mask with the low `bits` bits set.
const fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// A packed Snowflake layout: timestamp, instance ID and sequence fields laid
/// out from the most to the least significant bit of a non-negative `i64`.
///
/// Implementors only name the three field widths and the raw conversions;
/// shifts, masks, encoding and decoding are derived from those widths. The
/// widths must add up to at most 63 bits so the sign bit stays clear, which
/// is checked at compile time wherever the layout is encoded.
///
/// # Example
///
/// ```
/// use flakegen::{Snowflake, SnowflakeId};
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.instance_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_raw(), (1000 << 22) | (2 << 12) | 1);
/// ```
pub trait Snowflake:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Width of the timestamp field.
    const TIMESTAMP_BITS: u32;

    /// Width of the instance ID field.
    const INSTANCE_ID_BITS: u32;

    /// Width of the sequence field.
    const SEQUENCE_BITS: u32;

    /// The sequence occupies the lowest bits.
    const SEQUENCE_SHIFT: u32 = 0;

    /// The instance ID sits directly above the sequence.
    const INSTANCE_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;

    /// The timestamp sits directly above the instance ID.
    const TIMESTAMP_SHIFT: u32 = Self::INSTANCE_ID_SHIFT + Self::INSTANCE_ID_BITS;

    /// Largest encodable timestamp, in milliseconds since the epoch.
    const TIMESTAMP_MASK: u64 = low_mask(Self::TIMESTAMP_BITS);

    /// Largest encodable instance ID.
    const INSTANCE_ID_MASK: u64 = low_mask(Self::INSTANCE_ID_BITS);

    /// Largest sequence value within one millisecond.
    const SEQUENCE_MASK: u64 = low_mask(Self::SEQUENCE_BITS);

    /// Whether the three fields fit below the sign bit.
    const LAYOUT_FITS: bool =
        Self::TIMESTAMP_BITS + Self::INSTANCE_ID_BITS + Self::SEQUENCE_BITS < i64::BITS;

    /// Bits above the timestamp field; always zero in a valid ID.
    const RESERVED_MASK: u64 = !low_mask(Self::TIMESTAMP_SHIFT + Self::TIMESTAMP_BITS);

    /// Wraps a raw integer without validation.
    fn from_raw(raw: i64) -> Self;

    /// Returns the raw integer.
    fn to_raw(&self) -> i64;

    /// Packs the three fields into an ID.
    ///
    /// Each field is masked to its width. Debug builds assert that nothing
    /// was cut off.
    fn from_components(timestamp: u64, instance_id: u64, sequence: u64) -> Self {
        const { assert!(Self::LAYOUT_FITS, "snowflake layout does not fit in 63 bits") };
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(instance_id <= Self::INSTANCE_ID_MASK, "instance_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");

        let raw = ((timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT)
            | ((instance_id & Self::INSTANCE_ID_MASK) << Self::INSTANCE_ID_SHIFT)
            | ((sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT);
        // The sign bit is never set, see `LAYOUT_FITS`.
        Self::from_raw(raw as i64)
    }

    /// Milliseconds since the layout's epoch.
    fn timestamp(&self) -> u64 {
        (self.to_raw() as u64 >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// The instance that issued this ID.
    fn instance_id(&self) -> u64 {
        (self.to_raw() as u64 >> Self::INSTANCE_ID_SHIFT) & Self::INSTANCE_ID_MASK
    }

    /// Position of this ID within its millisecond.
    fn sequence(&self) -> u64 {
        (self.to_raw() as u64 >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Returns the maximum possible value for the instance ID field.
    fn max_instance_id() -> u64 {
        Self::INSTANCE_ID_MASK
    }

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns `true` if no bit outside the three fields is set.
    ///
    /// Every generated ID is valid; raw integers from elsewhere might not be.
    fn is_valid(&self) -> bool {
        (self.to_raw() as u64 & Self::RESERVED_MASK) == 0
    }

    /// The issue time in milliseconds since the Unix epoch, given the epoch
    /// the ID was generated against.
    fn unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp().saturating_add(duration_millis(epoch))
    }

    /// Decodes all three fields at once.
    fn components(&self) -> Components {
        Components {
            timestamp: self.timestamp(),
            instance_id: self.instance_id(),
            sequence: self.sequence(),
        }
    }
}

/// The decoded fields of a Snowflake ID.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Components {
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    /// The issuing instance.
    pub instance_id: u64,
    /// Position within the millisecond.
    pub sequence: u64,
}
