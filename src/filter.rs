use crate::bloom::{BloomSet, ProbabilisticSet};
use crate::config::{DateGranularity, FilterConfig};
use crate::error::{FilterError, Result};
use crate::key::{Key, RangeKeys};
use crate::normalize::Normalizer;
use crate::value::{Input, Value};
use std::fmt;
use tracing::debug;

/// Bloom filter over integers, fractional numbers, timestamps and arbitrary
/// text, with support for inclusive value ranges.
///
/// Every value is first reduced to a canonical integer [`Key`] by the
/// filter's [`Normalizer`]; keys are what the backing set stores.
pub struct UniversalBloomFilter<S = BloomSet> {
    config: FilterConfig,
    normalizer: Normalizer,
    set: S,
}

impl UniversalBloomFilter<BloomSet> {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        let set = BloomSet::new(config.expected_num_records, config.error_rate)?;
        debug!(
            granularity = %config.date_granularity,
            step = config.step,
            precision = config.precision,
            bits = set.bit_len(),
            hashes = set.num_hashes(),
            "Created universal bloom filter"
        );
        Self::with_set(config, set)
    }

    /// Filter with the default configuration (day granularity, step 1,
    /// precision 2, 1000 records at 10% error rate).
    pub fn with_defaults() -> Result<Self> {
        Self::new(FilterConfig::default())
    }
}

impl<S: ProbabilisticSet> UniversalBloomFilter<S> {
    /// Wraps an already constructed set. The set is expected to be sized from
    /// `config.expected_num_records` and `config.error_rate`.
    pub fn with_set(config: FilterConfig, set: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::from_config(&config),
            config,
            set,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn set(&self) -> &S {
        &self.set
    }

    pub fn granularity(&self) -> DateGranularity {
        self.config.date_granularity
    }

    pub fn step(&self) -> u64 {
        self.config.step
    }

    pub fn precision(&self) -> u32 {
        self.config.precision
    }

    pub fn capacity(&self) -> usize {
        self.set.capacity()
    }

    pub fn error_rate(&self) -> f64 {
        self.set.error_rate()
    }

    /// Approximate number of distinct keys inserted. Bloom filters do not
    /// track cardinality, so keys that collide with already-set bits are not
    /// counted and range insertions count every stepped key.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn normalize(&self, value: &Value) -> Result<Key> {
        self.normalizer.normalize(value)
    }

    /// Adds an already normalized key.
    pub fn insert_key(&mut self, key: Key) {
        self.set.add(&key.to_bytes());
    }

    /// Tests an already normalized key.
    pub fn check_key(&self, key: Key) -> bool {
        self.set.contains(&key.to_bytes())
    }

    pub fn insert_single(&mut self, value: impl Into<Value>) -> Result<()> {
        let key = self.normalize(&value.into())?;
        self.insert_key(key);
        Ok(())
    }

    pub fn check_single(&self, value: impl Into<Value>) -> Result<bool> {
        let key = self.normalize(&value.into())?;
        Ok(self.check_key(key))
    }

    /// Inserts every value independently. Stops at the first value that fails
    /// to normalize; values before it stay inserted.
    pub fn insert_list<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.insert_single(value)?;
        }
        Ok(())
    }

    /// True when every value checks true. An empty list is vacuously true.
    pub fn check_list<I, V>(&self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            if !self.check_single(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Unguarded stream of the stepped keys in `[start, end]`. The last key
    /// is `start + floor((end - start) / step) * step`, so `end` itself is
    /// skipped when the step does not divide the span.
    pub fn range_keys(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Result<RangeKeys> {
        let start = self.normalize(&start.into())?;
        let end = self.normalize(&end.into())?;
        Ok(RangeKeys::new(start, end, self.config.step))
    }

    fn guarded_range_keys(&self, start: Value, end: Value) -> Result<RangeKeys> {
        let keys = self.range_keys(start, end)?;
        if let Some(limit) = self.config.max_range_steps {
            if keys.remaining() > u128::from(limit) {
                return Err(FilterError::RangeTooLarge {
                    steps: keys.remaining(),
                    limit,
                });
            }
        }
        Ok(keys)
    }

    /// Inserts every stepped key of the inclusive range. A range whose start
    /// normalizes above its end inserts nothing.
    pub fn insert_range(
        &mut self,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Result<()> {
        let keys = self.guarded_range_keys(start.into(), end.into())?;
        debug!(steps = %keys.remaining(), "Inserting range");
        for key in keys {
            self.insert_key(key);
        }
        Ok(())
    }

    /// True when every stepped key of the inclusive range is present. An
    /// empty range is vacuously true.
    pub fn check_range(
        &self,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Result<bool> {
        let mut keys = self.guarded_range_keys(start.into(), end.into())?;
        debug!(steps = %keys.remaining(), "Checking range");
        Ok(keys.all(|key| self.check_key(key)))
    }

    /// Routes on the argument's container type: list, range or single value.
    pub fn insert(&mut self, input: impl Into<Input>) -> Result<()> {
        match input.into() {
            Input::Single(value) => self.insert_single(value),
            Input::List(values) => self.insert_list(values),
            Input::Range(start, end) => self.insert_range(start, end),
        }
    }

    pub fn check(&self, input: impl Into<Input>) -> Result<bool> {
        match input.into() {
            Input::Single(value) => self.check_single(value),
            Input::List(values) => self.check_list(values),
            Input::Range(start, end) => self.check_range(start, end),
        }
    }

    /// Membership test, same as [`Self::check`].
    pub fn contains(&self, input: impl Into<Input>) -> Result<bool> {
        self.check(input)
    }
}

impl<S: ProbabilisticSet> fmt::Display for UniversalBloomFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<UniversalBloomFilter(granularity={}, step={}, precision={}, expected_num_records={}, error_rate={})>",
            self.config.date_granularity,
            self.config.step,
            self.config.precision,
            self.set.capacity(),
            self.set.error_rate()
        )
    }
}

impl<S: ProbabilisticSet> fmt::Debug for UniversalBloomFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniversalBloomFilter")
            .field("config", &self.config)
            .field("len", &self.set.len())
            .finish()
    }
}
