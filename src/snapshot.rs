//! File persistence for [`UniversalBloomFilter`].
//!
//! A snapshot is the bincode encoding (standard config) of [`FilterSnapshot`]:
//! a magic tag and format version, the filter configuration and the exported
//! state of the Bloom set.
use crate::bloom::{BloomSet, BloomSnapshot};
use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::filter::UniversalBloomFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"UBF1";
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub magic: [u8; 4],
    pub version: u16,
    pub config: FilterConfig,
    pub set: BloomSnapshot,
}

impl FilterSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(
            self,
            bincode::config::standard(),
        )?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (snapshot, read): (Self, usize) =
            bincode::serde::decode_from_slice(
                bytes,
                bincode::config::standard(),
            )?;

        if snapshot.magic != SNAPSHOT_MAGIC {
            return Err(FilterError::SerializationError(
                "Not a universal bloom filter snapshot".into(),
            ));
        }
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(FilterError::SerializationError(format!(
                "Unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if read != bytes.len() {
            return Err(FilterError::SerializationError(format!(
                "{} trailing bytes after snapshot",
                bytes.len() - read
            )));
        }
        Ok(snapshot)
    }
}

impl UniversalBloomFilter<BloomSet> {
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            config: self.config().clone(),
            set: self.set().snapshot(),
        }
    }

    pub fn from_snapshot(snapshot: FilterSnapshot) -> Result<Self> {
        let config = snapshot.config;
        if config.expected_num_records != snapshot.set.capacity
            || config.error_rate != snapshot.set.error_rate
        {
            return Err(FilterError::SerializationError(
                "Snapshot configuration does not match its Bloom state".into(),
            ));
        }
        config
            .validate()
            .map_err(|e| FilterError::SerializationError(e.to_string()))?;

        let set = BloomSet::from_snapshot(snapshot.set)?;
        Self::with_set(config, set)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.snapshot().to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_snapshot(FilterSnapshot::from_bytes(bytes)?)
    }

    /// Writes the whole filter (configuration and bit state) to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Saved filter");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filter = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), len = filter.len(), "Loaded filter");
        Ok(filter)
    }
}
