//! Standard Bloom filter used as the backing probabilistic set
pub mod config;
pub mod filter;
pub mod traits;

pub use config::BloomParams;
pub use filter::{BloomSet, BloomSnapshot};
pub use traits::ProbabilisticSet;
