use crate::error::{FilterError, Result};
use crate::hash::{optimal_bit_vector_size, optimal_num_hashes};

/// Derived parameters calculated from capacity and error rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomParams {
    pub bit_vector_size: usize,
    pub num_hashes: usize,
}

impl BloomParams {
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(FilterError::InvalidConfig(
                "Capacity must be > 0".into(),
            ));
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(FilterError::InvalidConfig(
                "Error rate must be between 0 and 1".into(),
            ));
        }

        let bit_vector_size = optimal_bit_vector_size(capacity, error_rate);
        // hash indices are u32
        if bit_vector_size > u32::MAX as usize {
            return Err(FilterError::InvalidConfig(format!(
                "Bit vector of {bit_vector_size} bits exceeds the 32-bit index space"
            )));
        }
        let num_hashes = optimal_num_hashes(capacity, bit_vector_size).max(1);

        Ok(Self {
            bit_vector_size,
            num_hashes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizing() {
        let params = BloomParams::new(1000, 0.1).unwrap();
        assert_eq!(params.bit_vector_size, 4793);
        assert_eq!(params.num_hashes, 3);
    }

    #[test]
    fn test_at_least_one_hash() {
        let params = BloomParams::new(10, 0.99).unwrap();
        assert!(params.bit_vector_size >= 1);
        assert_eq!(params.num_hashes, 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(BloomParams::new(0, 0.1).is_err());
        assert!(BloomParams::new(10, 0.0).is_err());
        assert!(BloomParams::new(10, 1.5).is_err());
        assert!(BloomParams::new(usize::MAX / 2, 1e-9).is_err());
    }
}
