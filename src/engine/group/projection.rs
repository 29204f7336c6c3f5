use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Identifies a column requested from a row source and later retrieved from a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    Path(Arc<str>),
    KeyValue(KeyValueLink),
}

impl Projection {
    pub fn path(name: impl Into<Arc<str>>) -> Self {
        Projection::Path(name.into())
    }

    pub fn key_value(key: Projection, value: Projection) -> Self {
        Projection::KeyValue(KeyValueLink::new(key, value))
    }

    pub fn as_key_value(&self) -> Option<&KeyValueLink> {
        match self {
            Projection::KeyValue(link) => Some(link),
            Projection::Path(_) => None,
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Path(name) => f.write_str(name),
            Projection::KeyValue(link) => write!(f, "{}", link),
        }
    }
}

/// A key projection paired with a value projection, backing a map column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValueLink {
    key: Box<Projection>,
    value: Box<Projection>,
}

impl KeyValueLink {
    pub fn new(key: Projection, value: Projection) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn key(&self) -> &Projection {
        &self.key
    }

    pub fn value(&self) -> &Projection {
        &self.value
    }

    pub fn matches(&self, key: &Projection, value: &Projection) -> bool {
        self.key.as_ref() == key && self.value.as_ref() == value
    }
}

impl fmt::Display for KeyValueLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map({}, {})", self.key, self.value)
    }
}

/// Typed handle on a named column. Two columns are equal when their names are.
pub struct Column<T> {
    projection: Projection,
    _type: PhantomData<fn() -> T>,
}

impl<T> Column<T> {
    pub fn new(name: &str) -> Self {
        Self {
            projection: Projection::path(name),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        match &self.projection {
            Projection::Path(name) => name,
            // Column only ever holds a path
            Projection::KeyValue(_) => "",
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            projection: self.projection.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Column").field(&self.name()).finish()
    }
}

impl<T> PartialEq for Column<T> {
    fn eq(&self, other: &Self) -> bool {
        self.projection == other.projection
    }
}

impl<T> Eq for Column<T> {}

impl<T> Hash for Column<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.projection.hash(state);
    }
}

impl<T> From<&Column<T>> for Projection {
    fn from(column: &Column<T>) -> Self {
        column.projection.clone()
    }
}
