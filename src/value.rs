use crate::error::{FilterError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::fmt::{self, Write};

/// A single input value. Each supported kind has its own variant so
/// normalization never has to guess what it was given.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    /// Integer outside the `i64` range
    BigInt(BigInt),
    Float(f64),
    Timestamp(NaiveDateTime),
    /// Anything else, already rendered to text
    Text(String),
}

impl Value {
    /// Renders any displayable value into [`Value::Text`]. A `Display` impl
    /// that reports an error surfaces as [`FilterError::Normalization`].
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Result<Self> {
        let mut text = String::new();
        write!(text, "{value}").map_err(|_| {
            FilterError::Normalization(
                "value has no text representation".into(),
            )
        })?;
        Ok(Value::Text(text))
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    match i64::try_from(v) {
                        Ok(small) => Value::Int(small),
                        Err(_) => Value::BigInt(BigInt::from(v)),
                    }
                }
            }
        )*
    };
}

value_from_wide_int!(isize, usize, u64, i128, u128);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        match v.to_i64() {
            Some(small) => Value::Int(small),
            None => Value::BigInt(v),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.naive_utc())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

/// Argument shape of [`crate::UniversalBloomFilter::insert`] and
/// [`crate::UniversalBloomFilter::check`].
///
/// The container type decides routing: a `Vec` is always a list (even with
/// two elements) and only a 2-tuple is an inclusive range.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Single(Value),
    List(Vec<Value>),
    Range(Value, Value),
}

impl From<Value> for Input {
    fn from(v: Value) -> Self {
        Input::Single(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Input {
    fn from(values: Vec<T>) -> Self {
        Input::List(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Input {
    fn from((start, end): (A, B)) -> Self {
        Input::Range(start.into(), end.into())
    }
}

macro_rules! input_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Input {
                fn from(v: $t) -> Self {
                    Input::Single(Value::from(v))
                }
            }
        )*
    };
}

input_from_scalar!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    isize,
    usize,
    u64,
    i128,
    u128,
    BigInt,
    f32,
    f64,
    NaiveDateTime,
    DateTime<Utc>,
    &str,
    String,
    char
);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_display_renders_text() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
        assert_eq!(
            Value::display(&date).unwrap(),
            Value::Text("2023-05-15".into())
        );
        assert_eq!(
            Value::display(&u64::MAX).unwrap(),
            Value::Text("18446744073709551615".into())
        );
    }

    #[test]
    fn test_display_failure_is_normalization_error() {
        assert!(matches!(
            Value::display(&Broken),
            Err(FilterError::Normalization(_))
        ));
    }

    #[test]
    fn test_input_routing_by_container() {
        assert_eq!(Input::from(5), Input::Single(Value::Int(5)));
        assert_eq!(
            Input::from(vec![1, 2]),
            Input::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            Input::from((1, 2)),
            Input::Range(Value::Int(1), Value::Int(2))
        );
        assert_eq!(Input::from(2.5), Input::Single(Value::Float(2.5)));
        assert_eq!(Input::from("x"), Input::Single(Value::Text("x".into())));
        assert_eq!(
            Input::from(vec![1u64, u64::MAX]),
            Input::List(vec![Value::Int(1), Value::from(u64::MAX)])
        );
    }

    #[test]
    fn test_wide_integers_stay_integers() {
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(-7isize), Value::Int(-7));
        assert_eq!(Value::from(i64::MAX as u128), Value::Int(i64::MAX));
        assert_eq!(
            Value::from(u64::MAX),
            Value::BigInt(BigInt::from(u64::MAX))
        );
        assert_eq!(
            Value::from(i128::MIN),
            Value::BigInt(BigInt::from(i128::MIN))
        );
        assert_eq!(Value::from(BigInt::from(-12)), Value::Int(-12));
    }
}
