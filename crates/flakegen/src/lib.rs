//! # flakegen
//!
//! Coordination-free, roughly time-sortable 64-bit IDs using the Snowflake
//! scheme: a millisecond timestamp, an externally assigned instance ID and a
//! per-millisecond sequence packed into a single non-negative `i64`.
//!
//! ```text
//!  Bit Index:  63           63 62            22 21              12 11             0
//!              +--------------+----------------+------------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | instance ID (10) | sequence (12) |
//!              +--------------+----------------+------------------+---------------+
//!              |<----------- MSB ----------- 64 bits ----------- LSB ------------>|
//! ```
//!
//! The generator keeps its last timestamp and sequence behind one mutex, so a
//! single [`IdGenerator`] can be shared by any number of threads. Uniqueness
//! across processes relies on every generator being built with a distinct
//! instance ID; choosing those IDs is up to the caller.
//!
//! ```
//! use flakegen::{IdGenerator, SnowflakeId};
//!
//! let generator = IdGenerator::new(7)?;
//! let a: SnowflakeId = generator.next_id()?;
//! let b = generator.next_id()?;
//!
//! assert_ne!(a, b);
//! assert_eq!(a.instance_id(), 7);
//! # Ok::<(), flakegen::Error>(())
//! ```
//!
//! ## Features
//!
//! - `parking-lot`: guard the state with `parking_lot::Mutex` instead of
//!   `std::sync::Mutex`.
//! - `cache-padded`: pad the guarded state to a cache line.
//! - `serde`: `Serialize`/`Deserialize` for [`SnowflakeId`] and
//!   [`Components`].
//! - `tracing`: instrument ID generation and report clock regressions and
//!   epoch exhaustion as `tracing` events.

mod error;
mod generator;
mod id;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
