use crate::error::{FilterError, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time unit at which two timestamps are considered the same value.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    Year,
    Month,
    #[default]
    Day,
    Hour,
    Minute,
}

impl DateGranularity {
    pub const ALL: [DateGranularity; 5] = [
        DateGranularity::Year,
        DateGranularity::Month,
        DateGranularity::Day,
        DateGranularity::Hour,
        DateGranularity::Minute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateGranularity::Year => "year",
            DateGranularity::Month => "month",
            DateGranularity::Day => "day",
            DateGranularity::Hour => "hour",
            DateGranularity::Minute => "minute",
        }
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateGranularity {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        DateGranularity::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| {
                FilterError::InvalidConfig(format!(
                    "Unsupported date granularity: {s}"
                ))
            })
    }
}

/// Configuration of a [`crate::UniversalBloomFilter`]. Fixed for the lifetime
/// of the filter.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// How timestamps collapse to integers
    #[builder(default)]
    pub date_granularity: DateGranularity,

    /// Stride used when enumerating a range
    #[builder(default = "1")]
    pub step: u64,

    /// Decimal digits kept when scaling fractional numbers
    #[builder(default = "2")]
    pub precision: u32,

    /// Expected number of records, forwarded to the Bloom set as capacity
    #[builder(default = "1000")]
    pub expected_num_records: usize,

    /// Target false positive rate (between 0 and 1)
    #[builder(default = "0.1")]
    pub error_rate: f64,

    /// Upper bound on values enumerated by one range operation
    #[builder(default = "Some(10_000_000)")]
    pub max_range_steps: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            date_granularity: DateGranularity::default(),
            step: 1,
            precision: 2,
            expected_num_records: 1000,
            error_rate: 0.1,
            max_range_steps: Some(10_000_000),
        }
    }
}

impl FilterConfigBuilder {
    /// Sets the granularity from its textual name.
    pub fn granularity_name(self, name: &str) -> Result<Self> {
        Ok(self.date_granularity(name.parse()?))
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(FilterError::InvalidConfig(
                "Step must be > 0".into(),
            ));
        }
        if self.expected_num_records == 0 {
            return Err(FilterError::InvalidConfig(
                "Expected number of records must be > 0".into(),
            ));
        }
        if !(self.error_rate > 0.0 && self.error_rate < 1.0) {
            return Err(FilterError::InvalidConfig(format!(
                "Error rate must be between 0 and 1, got {}",
                self.error_rate
            )));
        }
        if self.max_range_steps == Some(0) {
            return Err(FilterError::InvalidConfig(
                "Max range steps must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}
