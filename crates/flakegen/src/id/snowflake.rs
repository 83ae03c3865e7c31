use core::fmt;

use crate::Snowflake;

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved (always zero, so the ID is a non-negative `i64`)
/// - 41 bits timestamp (ms since the generator's epoch, about 69 years)
/// - 10 bits instance ID (1024 instances)
/// - 12 bits sequence (4096 IDs per instance per millisecond)
///
/// ```text
///  Bit Index:  63           63 62            22 21              12 11             0
///              +--------------+----------------+------------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | instance ID (10) | sequence (12) |
///              +--------------+----------------+------------------+---------------+
///              |<----------- MSB ----------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering follows the raw integer, which sorts by timestamp first.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: i64,
}

impl SnowflakeId {
    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for extracting the 10-bit instance ID field. Occupies bits 12
    /// through 21.
    pub const INSTANCE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = 22;

    /// Number of bits to shift the instance ID to its position (bit 12).
    pub const INSTANCE_ID_SHIFT: u32 = 12;

    /// Creates an ID from its fields, masking each to its width.
    pub const fn new(timestamp: u64, instance_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let instance_id = (instance_id & Self::INSTANCE_ID_MASK) << Self::INSTANCE_ID_SHIFT;
        let sequence = sequence & Self::SEQUENCE_MASK;
        Self {
            id: (timestamp | instance_id | sequence) as i64,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id as u64 >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the instance ID from the packed ID.
    pub const fn instance_id(&self) -> u64 {
        (self.id as u64 >> Self::INSTANCE_ID_SHIFT) & Self::INSTANCE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        self.id as u64 & Self::SEQUENCE_MASK
    }

    /// Returns the ID as a zero-padded 19-digit string, which sorts
    /// lexicographically in the same order as the integers.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }
}

impl Snowflake for SnowflakeId {
    const TIMESTAMP_BITS: u32 = 41;
    const INSTANCE_ID_BITS: u32 = 10;
    const SEQUENCE_BITS: u32 = 12;

    fn from_raw(raw: i64) -> Self {
        Self { id: raw }
    }

    fn to_raw(&self) -> i64 {
        self.id
    }

    fn from_components(timestamp: u64, instance_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(instance_id <= Self::INSTANCE_ID_MASK, "instance_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::new(timestamp, instance_id, sequence)
    }

    fn timestamp(&self) -> u64 {
        self.timestamp()
    }

    fn instance_id(&self) -> u64 {
        self.instance_id()
    }

    fn sequence(&self) -> u64 {
        self.sequence()
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.id
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("instance_id", &self.instance_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SnowflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        s.serialize_i64(self.id)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SnowflakeId {
    /// Deserializes from the raw integer, rejecting values with the reserved
    /// bit set.
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = <i64 as serde::Deserialize>::deserialize(d)?;
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(serde::de::Error::custom(format_args!(
                "{raw} is not a valid snowflake id"
            )));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_bounds() {
        let ts = SnowflakeId::max_timestamp();
        let iid = SnowflakeId::max_instance_id();
        let seq = SnowflakeId::max_sequence();

        let id = SnowflakeId::new(ts, iid, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.instance_id(), iid);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.to_raw(), i64::MAX);
        assert_eq!(SnowflakeId::from_components(ts, iid, seq), id);
        assert!(id.is_valid());
    }

    #[test]
    fn trait_constants_match_inherent_ones() {
        assert_eq!(<SnowflakeId as Snowflake>::TIMESTAMP_MASK, SnowflakeId::TIMESTAMP_MASK);
        assert_eq!(
            <SnowflakeId as Snowflake>::INSTANCE_ID_MASK,
            SnowflakeId::INSTANCE_ID_MASK
        );
        assert_eq!(<SnowflakeId as Snowflake>::SEQUENCE_MASK, SnowflakeId::SEQUENCE_MASK);
        assert_eq!(<SnowflakeId as Snowflake>::TIMESTAMP_SHIFT, SnowflakeId::TIMESTAMP_SHIFT);
        assert_eq!(
            <SnowflakeId as Snowflake>::INSTANCE_ID_SHIFT,
            SnowflakeId::INSTANCE_ID_SHIFT
        );
        assert_eq!(<SnowflakeId as Snowflake>::RESERVED_MASK, 1 << 63);
    }

    #[test]
    fn re_encoding_decoded_fields_reproduces_the_id() {
        for raw in [0_i64, 1, 4095, 4096, 1 << 22, 123_456_789_012_345, i64::MAX] {
            let id = SnowflakeId::from_raw(raw);
            let c = id.components();
            let rebuilt = (c.timestamp << 22) | (c.instance_id << 12) | c.sequence;
            assert_eq!(rebuilt as i64, raw);
            assert_eq!(SnowflakeId::from_components(c.timestamp, c.instance_id, c.sequence), id);
        }
    }

    #[test]
    fn negative_raw_is_invalid() {
        assert!(!SnowflakeId::from_raw(-1).is_valid());
        assert!(!SnowflakeId::from_raw(i64::MIN).is_valid());
    }

    #[test]
    fn unix_millis_adds_the_epoch() {
        let id = SnowflakeId::new(1_500, 0, 0);
        let epoch = core::time::Duration::from_millis(1_640_966_400_000);
        assert_eq!(id.unix_millis(epoch), 1_640_966_401_500);
    }

    #[test]
    fn ordering_follows_timestamp_then_instance_then_sequence() {
        let a = SnowflakeId::new(10, 1023, 4095);
        let b = SnowflakeId::new(11, 0, 0);
        let c = SnowflakeId::new(11, 0, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn display_and_padding() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.to_padded_string(), "0000000000000000042");
        assert_eq!(SnowflakeId::from_raw(i64::MAX).to_padded_string().len(), 19);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        let ts = SnowflakeId::max_timestamp() + 1;
        SnowflakeId::from_components(ts, 0, 0);
    }

    #[test]
    #[should_panic(expected = "instance_id overflow")]
    fn instance_id_overflow_panics() {
        let iid = SnowflakeId::max_instance_id() + 1;
        SnowflakeId::from_components(0, iid, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        let seq = SnowflakeId::max_sequence() + 1;
        SnowflakeId::from_components(0, 0, seq);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_the_raw_integer() {
        let id = SnowflakeId::new(1_000, 3, 7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<SnowflakeId>("-5").is_err());

        let c = serde_json::to_value(id.components()).unwrap();
        assert_eq!(
            c,
            serde_json::json!({ "timestamp": 1000, "instance_id": 3, "sequence": 7 })
        );
    }
}
