use std::any::{Any, TypeId};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::engine::errors::CollectorError;
use crate::engine::types::{Datum, Value, mismatch};

/// Per-group accumulator for one column.
///
/// `add` is called in row arrival order for the group that owns the collector.
/// `get` may be called at any time, including before the first `add`, and
/// returns the same result until the next `add`.
pub trait Collector: Send {
    type Output: Datum;

    fn add(&mut self, value: Value) -> Result<(), CollectorError>;

    fn get(&self) -> Result<Self::Output, CollectorError>;
}

/// Object-safe view of a [`Collector`], stored inside a group.
pub(crate) trait ErasedCollector: Send {
    fn add(&mut self, value: Value) -> Result<(), CollectorError>;

    fn output_type(&self) -> TypeId;

    fn get_any(&self) -> Result<Box<dyn Any>, CollectorError>;

    fn get_value(&self) -> Result<Value, CollectorError>;
}

impl<C: Collector> ErasedCollector for C {
    fn add(&mut self, value: Value) -> Result<(), CollectorError> {
        Collector::add(self, value)
    }

    fn output_type(&self) -> TypeId {
        TypeId::of::<C::Output>()
    }

    fn get_any(&self) -> Result<Box<dyn Any>, CollectorError> {
        Ok(Box::new(Collector::get(self)?))
    }

    fn get_value(&self) -> Result<Value, CollectorError> {
        Ok(Collector::get(self)?.into_value())
    }
}

/// Keeps the value of the first `add`, including a null one.
#[derive(Debug, Clone)]
pub struct FirstCollector<T> {
    value: Option<T>,
    seen: bool,
}

impl<T> FirstCollector<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            seen: false,
        }
    }
}

impl<T> Default for FirstCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Datum> Collector for FirstCollector<T> {
    type Output = Option<T>;

    fn add(&mut self, value: Value) -> Result<(), CollectorError> {
        if self.seen {
            return Ok(());
        }
        self.value = Option::<T>::from_value(value)?;
        self.seen = true;
        Ok(())
    }

    fn get(&self) -> Result<Option<T>, CollectorError> {
        Ok(self.value.clone())
    }
}

/// Appends every value in arrival order, duplicates included.
#[derive(Debug, Clone)]
pub struct ListCollector<T> {
    values: Vec<T>,
}

impl<T> ListCollector<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> Default for ListCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Datum> Collector for ListCollector<T> {
    type Output = Vec<T>;

    fn add(&mut self, value: Value) -> Result<(), CollectorError> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    fn get(&self) -> Result<Vec<T>, CollectorError> {
        Ok(self.values.clone())
    }
}

/// Distinct values ordered by first insertion.
#[derive(Debug, Clone)]
pub struct SetCollector<T> {
    values: IndexSet<T>,
}

impl<T> SetCollector<T> {
    pub fn new() -> Self {
        Self {
            values: IndexSet::new(),
        }
    }
}

impl<T> Default for SetCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Datum + Eq + Hash> Collector for SetCollector<T> {
    type Output = IndexSet<T>;

    fn add(&mut self, value: Value) -> Result<(), CollectorError> {
        // a duplicate keeps its original position
        self.values.insert(T::from_value(value)?);
        Ok(())
    }

    fn get(&self) -> Result<IndexSet<T>, CollectorError> {
        Ok(self.values.clone())
    }
}

/// Upserts key/value pairs: the last value for a key wins, the key keeps the
/// position of its first appearance.
#[derive(Debug, Clone)]
pub struct MapCollector<K, V> {
    entries: IndexMap<K, V>,
}

impl<K, V> MapCollector<K, V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<K, V> Default for MapCollector<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Datum + Eq + Hash, V: Datum> Collector for MapCollector<K, V> {
    type Output = IndexMap<K, V>;

    fn add(&mut self, value: Value) -> Result<(), CollectorError> {
        let (key, value) = match value {
            Value::Pair(k, v) => (K::from_value(*k)?, V::from_value(*v)?),
            other => return Err(mismatch::<(K, V)>(&other)),
        };
        self.entries.insert(key, value);
        Ok(())
    }

    fn get(&self) -> Result<IndexMap<K, V>, CollectorError> {
        Ok(self.entries.clone())
    }
}

/// Ignores its input and always yields the same value.
#[derive(Debug, Clone)]
pub struct ConstantCollector<T> {
    value: T,
}

impl<T> ConstantCollector<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Datum> Collector for ConstantCollector<T> {
    type Output = T;

    fn add(&mut self, _value: Value) -> Result<(), CollectorError> {
        Ok(())
    }

    fn get(&self) -> Result<T, CollectorError> {
        Ok(self.value.clone())
    }
}
