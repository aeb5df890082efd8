//! Canonical integer domain shared by every normalized value.
//!
//! Most keys are plain `i64`. Digests of text, very large fractional numbers
//! and wide integer inputs can leave that range; those are kept as arbitrary
//! precision integers. Each integer has exactly one representation, so equal
//! integers always reach the Bloom set as equal bytes.
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    /// Integer outside the `i64` range
    Big(BigInt),
}

const INT_TAG: u8 = 0;
const BIG_TAG: u8 = 1;

impl Key {
    /// Interprets 32 big-endian bytes as an unsigned integer.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Key::from(BigInt::from_bytes_be(Sign::Plus, &bytes))
    }

    /// Bytes handed to the Bloom set.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Key::Int(v) => {
                let mut out = Vec::with_capacity(9);
                out.push(INT_TAG);
                out.extend_from_slice(&v.to_le_bytes());
                out
            }
            Key::Big(v) => {
                let digits = v.to_signed_bytes_le();
                let mut out = Vec::with_capacity(digits.len() + 1);
                out.push(BIG_TAG);
                out.extend_from_slice(&digits);
                out
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Key::Int(v) => Some(*v),
            Key::Big(_) => None,
        }
    }

    pub fn to_bigint(&self) -> BigInt {
        match self {
            Key::Int(v) => BigInt::from(*v),
            Key::Big(v) => v.clone(),
        }
    }

    /// `self + step`, staying on `i64` while it fits.
    fn advance(&self, step: u64) -> Key {
        match self {
            Key::Int(v) => match i64::try_from(step).ok().and_then(|s| v.checked_add(s)) {
                Some(next) => Key::Int(next),
                None => Key::from(BigInt::from(*v) + step),
            },
            Key::Big(v) => Key::from(v + step),
        }
    }
}

impl From<BigInt> for Key {
    fn from(v: BigInt) -> Self {
        match v.to_i64() {
            Some(small) => Key::Int(small),
            None => Key::Big(v),
        }
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<i128> for Key {
    fn from(v: i128) -> Self {
        Key::from(BigInt::from(v))
    }
}

impl From<u64> for Key {
    fn from(v: u64) -> Self {
        Key::from(BigInt::from(v))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            // a big key lies entirely below or above the i64 range
            (Key::Int(_), Key::Big(b)) => match b.sign() {
                Sign::Minus => Ordering::Greater,
                _ => Ordering::Less,
            },
            (Key::Big(a), Key::Int(_)) => match a.sign() {
                Sign::Minus => Ordering::Less,
                _ => Ordering::Greater,
            },
            (Key::Big(a), Key::Big(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{v}"),
            Key::Big(v) => write!(f, "{v}"),
        }
    }
}

/// Number of values a stepped inclusive range enumerates:
/// `floor((end - start) / step) + 1`, or zero when `start > end`. Saturates at
/// `u128::MAX` for spans beyond that.
pub fn range_len(start: &Key, end: &Key, step: u64) -> u128 {
    if start > end {
        return 0;
    }
    if let (Key::Int(a), Key::Int(b)) = (start, end) {
        let span = (i128::from(*b) - i128::from(*a)) as u128;
        return span / u128::from(step) + 1;
    }
    let span = end.to_bigint() - start.to_bigint();
    (span / step + 1u32).to_u128().unwrap_or(u128::MAX)
}

/// Streaming enumeration of `start, start + step, ...` while `<= end`.
#[derive(Clone, Debug)]
pub struct RangeKeys {
    next: Option<Key>,
    step: u64,
    remaining: u128,
}

impl RangeKeys {
    pub fn new(start: Key, end: Key, step: u64) -> Self {
        let remaining = range_len(&start, &end, step);
        Self {
            next: (remaining > 0).then_some(start),
            step,
            remaining,
        }
    }

    /// Values still to be produced (saturating).
    pub fn remaining(&self) -> u128 {
        self.remaining
    }
}

impl Iterator for RangeKeys {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next.take()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next = Some(current.advance(self.step));
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
