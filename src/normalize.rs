use crate::config::{DateGranularity, FilterConfig};
use crate::error::{FilterError, Result};
use crate::hash::sha256_digest;
use crate::key::Key;
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

/// Reduces values to [`Key`]s for a fixed granularity and precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalizer {
    granularity: DateGranularity,
    precision: u32,
    scale: f64,
}

impl Normalizer {
    pub fn new(granularity: DateGranularity, precision: u32) -> Self {
        Self {
            granularity,
            precision,
            scale: scale_factor(precision),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.date_granularity, config.precision)
    }

    pub fn granularity(&self) -> DateGranularity {
        self.granularity
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn normalize(&self, value: &Value) -> Result<Key> {
        match value {
            Value::Int(v) => Ok(Key::Int(*v)),
            Value::BigInt(v) => Ok(Key::from(v.clone())),
            Value::Float(v) => self.normalize_float(*v),
            Value::Timestamp(ts) => Ok(Key::Int(self.normalize_timestamp(ts))),
            Value::Text(text) => Ok(Key::from_be_bytes(sha256_digest(text))),
        }
    }

    /// `trunc(value * 10^precision)`, exact at any magnitude
    fn normalize_float(&self, value: f64) -> Result<Key> {
        let scaled = (value * self.scale).trunc();
        if !scaled.is_finite() {
            return Err(FilterError::Normalization(format!(
                "cannot scale {value} by 10^{}",
                self.precision
            )));
        }
        BigInt::from_f64(scaled).map(Key::from).ok_or_else(|| {
            FilterError::Normalization(format!("{value} has no integer value"))
        })
    }

    fn normalize_timestamp(&self, ts: &NaiveDateTime) -> i64 {
        match self.granularity {
            DateGranularity::Year => i64::from(ts.year()),
            DateGranularity::Month => {
                i64::from(ts.year()) * 12 + i64::from(ts.month())
            }
            // whole calendar days, so instants before the epoch floor
            DateGranularity::Day => {
                ts.date().signed_duration_since(epoch_date()).num_days()
            }
            DateGranularity::Hour => {
                ts.signed_duration_since(epoch()).num_seconds() / 3600
            }
            DateGranularity::Minute => {
                ts.signed_duration_since(epoch()).num_seconds() / 60
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// `10^precision` rounded to the nearest `f64`; infinite past `10^308`.
fn scale_factor(precision: u32) -> f64 {
    if precision > f64::MAX_10_EXP as u32 {
        return f64::INFINITY;
    }
    BigInt::from(10u32)
        .pow(precision)
        .to_f64()
        .unwrap_or(f64::INFINITY)
}

fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

fn epoch() -> NaiveDateTime {
    NaiveDateTime::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Value {
        Value::Timestamp(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    fn normalizer(granularity: DateGranularity) -> Normalizer {
        Normalizer::new(granularity, 2)
    }

    #[test]
    fn test_epoch_is_1970() {
        assert_eq!(epoch_date(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(epoch().and_utc().timestamp(), 0);
    }

    #[test]
    fn test_integers_are_not_rescaled() {
        let n = Normalizer::new(DateGranularity::Day, 5);
        assert_eq!(n.normalize(&Value::Int(3)).unwrap(), Key::Int(3));
        assert_eq!(n.normalize(&Value::Int(-7)).unwrap(), Key::Int(-7));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_float_truncates_toward_zero() {
        let n = normalizer(DateGranularity::Day);
        assert_eq!(n.normalize(&Value::Float(3.14159)).unwrap(), Key::Int(314));
        assert_eq!(
            n.normalize(&Value::Float(-3.14159)).unwrap(),
            Key::Int(-314)
        );
        assert_eq!(n.normalize(&Value::Float(0.009)).unwrap(), Key::Int(0));
        assert_eq!(n.normalize(&Value::Float(-0.009)).unwrap(), Key::Int(0));
    }

    #[test]
    fn test_float_precision_zero() {
        let n = Normalizer::new(DateGranularity::Day, 0);
        assert_eq!(n.normalize(&Value::Float(2.99)).unwrap(), Key::Int(2));
        assert_eq!(n.normalize(&Value::Float(-2.99)).unwrap(), Key::Int(-2));
    }

    #[test]
    fn test_float_non_finite_fails() {
        let n = normalizer(DateGranularity::Day);
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e307] {
            assert!(matches!(
                n.normalize(&Value::Float(v)),
                Err(FilterError::Normalization(_))
            ));
        }
        // the scale factor itself overflows
        let n = Normalizer::new(DateGranularity::Day, 309);
        assert!(n.normalize(&Value::Float(0.0)).is_err());
    }

    #[test]
    fn test_float_beyond_i64_is_exact() {
        let n = normalizer(DateGranularity::Day);
        assert_eq!(
            n.normalize(&Value::Float(1e17)).unwrap(),
            Key::from(BigInt::from(10u32).pow(19))
        );
        assert_eq!(
            n.normalize(&Value::Float(-1e17)).unwrap(),
            Key::from(-BigInt::from(10u32).pow(19))
        );
        // 2^70 scaled by 10^2
        assert_eq!(
            n.normalize(&Value::Float(2f64.powi(70))).unwrap(),
            Key::from((BigInt::from(1) << 70u32) * 100u32)
        );
    }

    #[test]
    fn test_high_precision() {
        let n = Normalizer::new(DateGranularity::Day, 25);
        let key = n.normalize(&Value::Float(1.0)).unwrap();
        assert!(matches!(key, Key::Big(_)));
        assert!(key > Key::Int(i64::MAX));
        assert_eq!(n.normalize(&Value::Float(0.0)).unwrap(), Key::Int(0));
        assert_eq!(scale_factor(0), 1.0);
        assert_eq!(scale_factor(22), 1e22);
        assert_eq!(scale_factor(309), f64::INFINITY);
        assert_eq!(scale_factor(u32::MAX), f64::INFINITY);
    }

    #[test]
    fn test_wide_integers_pass_through() {
        let n = normalizer(DateGranularity::Day);
        assert_eq!(
            n.normalize(&Value::from(u64::MAX)).unwrap(),
            Key::from(u64::MAX)
        );
        assert_eq!(n.normalize(&Value::from(5u64)).unwrap(), Key::Int(5));
    }

    #[test]
    fn test_year_and_month() {
        let value = ts(2023, 5, 15, 10, 30, 0);
        assert_eq!(
            normalizer(DateGranularity::Year).normalize(&value).unwrap(),
            Key::Int(2023)
        );
        assert_eq!(
            normalizer(DateGranularity::Month).normalize(&value).unwrap(),
            Key::Int(24281)
        );
    }

    #[test]
    fn test_day_hour_minute() {
        let day = normalizer(DateGranularity::Day);
        assert_eq!(day.normalize(&ts(1970, 1, 2, 0, 0, 0)).unwrap(), Key::Int(1));
        assert_eq!(day.normalize(&ts(1970, 1, 1, 23, 59, 59)).unwrap(), Key::Int(0));

        let hour = normalizer(DateGranularity::Hour);
        assert_eq!(hour.normalize(&ts(1970, 1, 2, 1, 59, 0)).unwrap(), Key::Int(25));

        let minute = normalizer(DateGranularity::Minute);
        assert_eq!(
            minute.normalize(&ts(1970, 1, 1, 1, 1, 59)).unwrap(),
            Key::Int(61)
        );
    }

    #[test]
    fn test_pre_epoch_rounding() {
        // day floors by calendar date, hour and minute truncate toward zero
        let value = ts(1969, 12, 31, 12, 0, 0);
        assert_eq!(
            normalizer(DateGranularity::Day).normalize(&value).unwrap(),
            Key::Int(-1)
        );
        assert_eq!(
            normalizer(DateGranularity::Hour).normalize(&value).unwrap(),
            Key::Int(-12)
        );
        let value = ts(1969, 12, 31, 23, 30, 30);
        assert_eq!(
            normalizer(DateGranularity::Hour).normalize(&value).unwrap(),
            Key::Int(0)
        );
        assert_eq!(
            normalizer(DateGranularity::Minute).normalize(&value).unwrap(),
            Key::Int(-29)
        );
    }

    #[test]
    fn test_text_hashes_identical_strings_identically() {
        let n = normalizer(DateGranularity::Day);
        let a = n.normalize(&Value::Text("hello".into())).unwrap();
        let b = n.normalize(&Value::Text("hello".into())).unwrap();
        let c = n.normalize(&Value::Text("hello!".into())).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_text_digest_is_big_endian_integer() {
        // sha256("abc") = ba7816bf...
        let n = normalizer(DateGranularity::Day);
        match n.normalize(&Value::Text("abc".into())).unwrap() {
            Key::Big(v) => {
                let (_, bytes) = v.to_bytes_be();
                assert_eq!(&bytes[..4], &[0xba, 0x78, 0x16, 0xbf]);
            }
            other => panic!("Expected wide key, got {other:?}"),
        }
    }
}
