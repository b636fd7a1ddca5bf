// Copyright 2026 Tilestore Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for tilestore - runtime values with type information
//!
//! Values are what tiles store and what the sampler hashes when computing
//! per-column cardinalities. Text uses `Arc<str>` for cheap cloning during
//! row operations.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::types::DataType;

/// A runtime value with type information
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value with optional type hint
    Null(DataType),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// Boolean value
    Boolean(bool),

    /// Timestamp (UTC)
    Timestamp(DateTime<Utc>),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    /// Create a NULL value with a type hint
    pub fn null(data_type: DataType) -> Self {
        Value::Null(data_type)
    }

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a float value
    pub fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a timestamp value
    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    /// Create a text value from Arc<str> (zero-copy)
    pub fn text_arc(value: Arc<str>) -> Self {
        Value::Text(value)
    }

    /// Returns true if this value is NULL
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null(dt) => *dt,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Boolean(_) => DataType::Boolean,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Murmur3-family mix hash of this value
    ///
    /// Used by the cardinality estimator to aggregate sampled values into
    /// a hash set. Distinct values map to distinct hashes with the usual
    /// 64-bit collision probability; NULLs all hash alike.
    pub fn mix_hash(&self) -> u64 {
        let tag = self.data_type().as_u8() as u64;
        match self {
            Value::Null(_) => fmix64(tag),
            Value::Integer(i) => fmix64(tag ^ (*i as u64).rotate_left(8)),
            Value::Float(f) => fmix64(tag ^ f.to_bits().rotate_left(8)),
            Value::Boolean(b) => fmix64(tag ^ ((*b as u64) << 8)),
            Value::Timestamp(ts) => fmix64(tag ^ (ts.timestamp_micros() as u64).rotate_left(8)),
            Value::Text(s) => {
                let mut h = fmix64(tag);
                for chunk in s.as_bytes().chunks(8) {
                    let mut word = [0u8; 8];
                    word[..chunk.len()].copy_from_slice(chunk);
                    h = fmix64(h ^ u64::from_le_bytes(word));
                }
                fmix64(h ^ s.len() as u64)
            }
        }
    }

    /// Total ordering across all values
    ///
    /// NULLs sort first; values of different types order by type tag. Used
    /// by ordered indexes, which only ever compare same-typed columns.
    pub fn compare(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null(_), Null(_)) => Ordering::Equal,
            (Null(_), _) => Ordering::Less,
            (_, Null(_)) => Ordering::Greater,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.as_ref().cmp(b.as_ref()),
            _ => self.data_type().as_u8().cmp(&other.data_type().as_u8()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null(a), Null(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            // bit equality so Eq is a proper equivalence even for NaN
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Boolean(a), Boolean(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 64-bit finalizer mix from the MurmurHash3 family
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_data_types() {
        assert_eq!(Value::integer(1).data_type(), DataType::Integer);
        assert_eq!(Value::float(1.5).data_type(), DataType::Float);
        assert_eq!(Value::boolean(true).data_type(), DataType::Boolean);
        assert_eq!(Value::text("x").data_type(), DataType::Text);
        assert_eq!(Value::null(DataType::Integer).data_type(), DataType::Integer);
        assert!(Value::null(DataType::Integer).is_null());
        assert!(!Value::integer(0).is_null());
    }

    #[test]
    fn test_mix_hash_distinguishes_values() {
        assert_ne!(Value::integer(1).mix_hash(), Value::integer(2).mix_hash());
        assert_ne!(
            Value::text("abc").mix_hash(),
            Value::text("abd").mix_hash()
        );
        // same value, same hash
        assert_eq!(Value::integer(7).mix_hash(), Value::integer(7).mix_hash());
        assert_eq!(
            Value::text("hello").mix_hash(),
            Value::text("hello").mix_hash()
        );
        // type is part of the hash
        assert_ne!(
            Value::integer(1).mix_hash(),
            Value::float(f64::from_bits(1)).mix_hash()
        );
    }

    #[test]
    fn test_mix_hash_text_length_matters() {
        // "ab" followed by zero bytes must not collide with plain "ab"
        assert_ne!(
            Value::text("ab\0\0").mix_hash(),
            Value::text("ab").mix_hash()
        );
    }

    #[test]
    fn test_compare_ordering() {
        assert_eq!(
            Value::integer(1).compare(&Value::integer(2)),
            Ordering::Less
        );
        assert_eq!(
            Value::text("b").compare(&Value::text("a")),
            Ordering::Greater
        );
        assert_eq!(
            Value::null(DataType::Integer).compare(&Value::integer(i64::MIN)),
            Ordering::Less
        );
        assert_eq!(
            Value::float(1.0).compare(&Value::float(1.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_float_bit_equality() {
        assert_eq!(Value::float(f64::NAN), Value::float(f64::NAN));
        assert_ne!(Value::float(0.0), Value::float(-0.0));
    }
}
