//! Bloom filter over heterogeneous values and value ranges.
//!
//! Answers "has this value possibly been seen before?" for integers,
//! fractional numbers, timestamps and anything that can be rendered as text,
//! and "has every value of this range been seen?" for inclusive ranges.
//!
//! HowTo:
//!    * Normalization: every input is reduced to a canonical integer key.
//!      Integers are kept as is (at any width), fractional numbers are
//!      scaled by `10^precision` and truncated, timestamps collapse to the configured
//!      granularity (year, month, day, hour, minute) and everything else is
//!      hashed with SHA-256 and read as a big-endian integer.
//!    * Membership: keys are stored in a standard Bloom filter sized from the
//!      expected number of records and the target error rate.
//!
//! Insertion:
//!     * A single value sets the bits of its key.
//!     * A list inserts each element independently.
//!     * A range `(start, end)` inserts `start, start + step, ...` up to `end`.
//! Query:
//!     * A list or range is present only if every element or stepped key is.
//!     * When `step` does not divide `end - start`, `end` itself is never
//!       enumerated.
//!
//! Obvious problems:
//!     * False Positives: a check can succeed for a value never inserted, and
//!       the rate grows past the configured one once capacity is exceeded.
//!     * Text values with the same string form are indistinguishable.
//!     * Ranges over hashed text span astronomically many keys and are
//!       stopped by the range guard.
//!
//! ```
//! use universal_bloom_rs::{FilterConfigBuilder, DateGranularity, UniversalBloomFilter};
//!
//! let config = FilterConfigBuilder::default()
//!     .date_granularity(DateGranularity::Day)
//!     .step(2)
//!     .build()
//!     .unwrap();
//! let mut filter = UniversalBloomFilter::new(config).unwrap();
//!
//! filter.insert((10, 20)).unwrap();
//! assert!(filter.check(14).unwrap());
//! assert!(filter.check((10, 20)).unwrap());
//! ```
pub mod bloom;
mod config;
mod error;
mod filter;
mod hash;
mod key;
mod normalize;
mod snapshot;
mod value;

pub use bloom::{BloomSet, BloomSnapshot, ProbabilisticSet};
pub use config::{
    DateGranularity, FilterConfig, FilterConfigBuilder, FilterConfigBuilderError,
};
pub use error::{FilterError, Result};
pub use filter::UniversalBloomFilter;
pub use hash::{
    HashFunction, default_hash_function, optimal_bit_vector_size,
    optimal_num_hashes, sha256_digest,
};
pub use key::{Key, RangeKeys, range_len};
pub use normalize::Normalizer;
pub use snapshot::{FilterSnapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use value::{Input, Value};
