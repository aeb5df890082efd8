use super::{BloomParams, ProbabilisticSet};
use crate::error::{FilterError, Result};
use crate::hash::default_hash_function;
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Classic bit-vector Bloom filter sized from capacity and error rate.
///
/// Inserting past capacity never fails; the real false positive rate just
/// climbs above the configured one.
#[derive(Clone, Debug)]
pub struct BloomSet {
    capacity: usize,
    error_rate: f64,
    params: BloomParams,
    bits: BitVec<usize, Lsb0>,
    count: usize,
}

/// Exported state of a [`BloomSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloomSnapshot {
    pub capacity: usize,
    pub error_rate: f64,
    pub bit_len: usize,
    pub num_hashes: usize,
    pub count: usize,
    /// Bits packed LSB-first, `ceil(bit_len / 8)` bytes
    pub bits: Vec<u8>,
}

impl BloomSet {
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        let params = BloomParams::new(capacity, error_rate)?;
        let bits = bitvec![0; params.bit_vector_size];

        Ok(Self {
            capacity,
            error_rate,
            params,
            bits,
            count: 0,
        })
    }

    pub fn params(&self) -> &BloomParams {
        &self.params
    }

    pub fn bit_len(&self) -> usize {
        self.params.bit_vector_size
    }

    pub fn num_hashes(&self) -> usize {
        self.params.num_hashes
    }

    /// Number of set bits.
    pub fn ones(&self) -> usize {
        self.bits.count_ones()
    }

    fn indices(&self, item: &[u8]) -> Vec<u32> {
        default_hash_function(
            item,
            self.params.num_hashes,
            self.params.bit_vector_size,
        )
    }

    pub fn snapshot(&self) -> BloomSnapshot {
        BloomSnapshot {
            capacity: self.capacity,
            error_rate: self.error_rate,
            bit_len: self.params.bit_vector_size,
            num_hashes: self.params.num_hashes,
            count: self.count,
            bits: pack_bits(&self.bits),
        }
    }

    /// Rebuilds a set from a snapshot, rejecting inconsistent state.
    pub fn from_snapshot(snapshot: BloomSnapshot) -> Result<Self> {
        let params = BloomParams::new(snapshot.capacity, snapshot.error_rate)
            .map_err(|e| {
                FilterError::SerializationError(format!(
                    "Invalid Bloom parameters in snapshot: {e}"
                ))
            })?;

        if params.bit_vector_size != snapshot.bit_len
            || params.num_hashes != snapshot.num_hashes
        {
            return Err(FilterError::SerializationError(format!(
                "Snapshot geometry {}x{} does not match capacity {} at error rate {}",
                snapshot.bit_len,
                snapshot.num_hashes,
                snapshot.capacity,
                snapshot.error_rate
            )));
        }
        if snapshot.bits.len() != snapshot.bit_len.div_ceil(8) {
            return Err(FilterError::SerializationError(format!(
                "Expected {} bytes of bit data, got {}",
                snapshot.bit_len.div_ceil(8),
                snapshot.bits.len()
            )));
        }

        Ok(Self {
            capacity: snapshot.capacity,
            error_rate: snapshot.error_rate,
            params,
            bits: unpack_bits(&snapshot.bits, snapshot.bit_len),
            count: snapshot.count,
        })
    }
}

impl ProbabilisticSet for BloomSet {
    fn add(&mut self, item: &[u8]) -> bool {
        let indices = self.indices(item);

        let mut present = true;
        for idx in indices {
            let idx = idx as usize;
            if !self.bits[idx] {
                present = false;
                self.bits.set(idx, true);
            }
        }

        if !present {
            self.count += 1;
            if self.count == self.capacity + 1 {
                warn!(
                    capacity = self.capacity,
                    "Bloom set is past capacity, false positive rate will exceed {}",
                    self.error_rate
                );
            }
        }
        present
    }

    fn contains(&self, item: &[u8]) -> bool {
        self.indices(item)
            .into_iter()
            .all(|idx| self.bits[idx as usize])
    }

    fn len(&self) -> usize {
        self.count
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn error_rate(&self) -> f64 {
        self.error_rate
    }
}

fn pack_bits(bits: &BitVec<usize, Lsb0>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for byte_chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (bit_pos, bit) in byte_chunk.iter().enumerate() {
            if *bit {
                byte |= 1 << bit_pos;
            }
        }
        bytes.push(byte);
    }
    bytes
}

fn unpack_bits(bytes: &[u8], bit_len: usize) -> BitVec<usize, Lsb0> {
    let mut bits = bitvec![0; bit_len];
    for (byte_idx, &byte) in bytes.iter().enumerate() {
        for bit_pos in 0..8 {
            let bit_idx = byte_idx * 8 + bit_pos;
            if bit_idx < bit_len && byte & (1 << bit_pos) != 0 {
                bits.set(bit_idx, true);
            }
        }
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_test_items(count: usize) -> Vec<Vec<u8>> {
        (0..count)
            .map(|i| format!("test_item_{:06}", i).into_bytes())
            .collect()
    }

    #[test]
    fn test_add_and_contains() {
        let mut set = BloomSet::new(1000, 0.01).unwrap();
        assert!(set.is_empty());

        assert!(!set.add(b"hello"));
        assert!(set.contains(b"hello"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicate_add_is_not_counted() {
        let mut set = BloomSet::new(1000, 0.01).unwrap();
        assert!(!set.add(b"dup"));
        assert!(set.add(b"dup"));
        assert!(set.add(b"dup"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_no_false_negatives_past_capacity() {
        let mut set = BloomSet::new(100, 0.1).unwrap();
        let items = generate_test_items(500);
        for item in &items {
            set.add(item);
        }
        for item in &items {
            assert!(set.contains(item), "No false negatives allowed");
        }
        assert!(set.len() <= items.len());
    }

    #[test]
    fn test_false_positive_rate_within_bounds() {
        const FALSE_POSITIVE_RATE: f64 = 0.05;
        let mut set = BloomSet::new(1000, FALSE_POSITIVE_RATE).unwrap();
        for item in generate_test_items(1000) {
            set.add(&item);
        }

        let false_positives = (0..2000)
            .filter(|i| set.contains(format!("absent_{i}").as_bytes()))
            .count();
        let observed_fpr = false_positives as f64 / 2000.0;
        assert!(
            observed_fpr <= FALSE_POSITIVE_RATE * 2.0,
            "False positive rate is too high: observed {}, expected {}",
            observed_fpr,
            FALSE_POSITIVE_RATE
        );
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut set = BloomSet::new(1000, 0.1).unwrap();
        for item in generate_test_items(50) {
            set.add(&item);
        }

        let snapshot = set.snapshot();
        assert_eq!(snapshot.bits.len(), set.bit_len().div_ceil(8));

        let restored = BloomSet::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.len(), set.len());
        assert_eq!(restored.ones(), set.ones());
        assert_eq!(restored.bits, set.bits);
    }

    #[test]
    fn test_snapshot_with_wrong_length_is_rejected() {
        let set = BloomSet::new(1000, 0.1).unwrap();
        let mut snapshot = set.snapshot();
        snapshot.bits.pop();
        assert!(matches!(
            BloomSet::from_snapshot(snapshot),
            Err(FilterError::SerializationError(_))
        ));

        let mut snapshot = set.snapshot();
        snapshot.num_hashes += 1;
        assert!(BloomSet::from_snapshot(snapshot).is_err());
    }
}
