use std::any::type_name;
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

use super::bytes::Bytes;
use super::value::Value;
use crate::engine::errors::CollectorError;

/// Typed view over a [`Value`].
///
/// Columns declare the Rust type they collect; every value arriving from a row
/// source is converted through this trait before it reaches a collector, and
/// every finalized result converts back for positional access.
pub trait Datum: Sized + Clone + fmt::Debug + Send + 'static {
    fn from_value(value: Value) -> Result<Self, CollectorError>;

    fn into_value(self) -> Value;
}

pub(crate) fn mismatch<T>(found: &Value) -> CollectorError {
    CollectorError::TypeMismatch {
        expected: type_name::<T>(),
        found: found.type_name(),
    }
}

impl Datum for Value {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        Ok(value)
    }

    fn into_value(self) -> Value {
        self
    }
}

impl Datum for bool {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl Datum for i64 {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Int64(i) | Value::Timestamp(i) => Ok(i),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }
}

impl Datum for i32 {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Int64(i) => i32::try_from(i).map_err(|_| mismatch::<Self>(&value)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Int64(self as i64)
    }
}

impl Datum for u64 {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::UInt64(u) => Ok(u),
            Value::Int64(i) if i >= 0 => Ok(i as u64),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::UInt64(self)
    }
}

impl Datum for f64 {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Float64(f) => Ok(f),
            Value::Int64(i) => Ok(i as f64),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Float64(self)
    }
}

impl Datum for String {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Utf8(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Utf8(self)
    }
}

impl Datum for Bytes {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Binary(bytes) => Ok(Bytes::from(bytes)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Binary(self.into_vec())
    }
}

impl Datum for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Timestamp(ms) => {
                DateTime::from_timestamp_millis(ms).ok_or_else(|| mismatch::<Self>(&value))
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Timestamp(self.timestamp_millis())
    }
}

/// `Null` maps to `None`; anything else must convert to `T`.
impl<T: Datum> Datum for Option<T> {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: Datum> Datum for Vec<T> {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Datum::into_value).collect())
    }
}

impl<T: Datum + Eq + Hash> Datum for IndexSet<T> {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Datum::into_value).collect())
    }
}

impl<K: Datum + Eq + Hash, V: Datum> Datum for IndexMap<K, V> {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}
