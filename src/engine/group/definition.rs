use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::{IndexMap, IndexSet};

use super::collector::{
    Collector, ErasedCollector, FirstCollector, ListCollector, MapCollector, SetCollector,
};
use super::projection::{Column, Projection};
use crate::engine::types::Datum;

static NEXT_DEFINITION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a column definition; clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionId(u64);

impl DefinitionId {
    fn next() -> Self {
        DefinitionId(NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    One,
    List,
    Set,
    Map,
    Custom,
}

type CollectorFactory = dyn Fn() -> Box<dyn ErasedCollector> + Send + Sync;

/// Binds a projection to a factory producing a fresh collector per group.
#[derive(Clone)]
pub struct ColumnDefinition {
    id: DefinitionId,
    projection: Projection,
    strategy: Strategy,
    factory: Arc<CollectorFactory>,
}

impl ColumnDefinition {
    fn new<C, F>(projection: Projection, strategy: Strategy, factory: F) -> Self
    where
        C: Collector + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            id: DefinitionId::next(),
            projection,
            strategy,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn ErasedCollector>),
        }
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub(crate) fn create_collector(&self) -> Box<dyn ErasedCollector> {
        (self.factory)()
    }
}

impl fmt::Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("id", &self.id)
            .field("projection", &self.projection)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl PartialEq for ColumnDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ColumnDefinition {}

/// A [`ColumnDefinition`] that remembers the type its collector produces, so
/// `Group::get_by_definition` can hand it back without a cast at the call site.
pub struct Definition<O> {
    inner: ColumnDefinition,
    _output: PhantomData<fn() -> O>,
}

impl<O> Definition<O> {
    fn wrap(inner: ColumnDefinition) -> Self {
        Self {
            inner,
            _output: PhantomData,
        }
    }

    pub fn column_definition(&self) -> &ColumnDefinition {
        &self.inner
    }

    pub fn id(&self) -> DefinitionId {
        self.inner.id
    }

    pub fn projection(&self) -> &Projection {
        &self.inner.projection
    }

    pub fn strategy(&self) -> Strategy {
        self.inner.strategy
    }
}

impl<O> Clone for Definition<O> {
    fn clone(&self) -> Self {
        Self::wrap(self.inner.clone())
    }
}

impl<O> fmt::Debug for Definition<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<O> From<Definition<O>> for ColumnDefinition {
    fn from(definition: Definition<O>) -> Self {
        definition.inner
    }
}

impl<O> From<&Definition<O>> for ColumnDefinition {
    fn from(definition: &Definition<O>) -> Self {
        definition.inner.clone()
    }
}

impl<O> AsRef<ColumnDefinition> for Definition<O> {
    fn as_ref(&self) -> &ColumnDefinition {
        &self.inner
    }
}

pub fn one<T: Datum>(column: &Column<T>) -> Definition<Option<T>> {
    Definition::wrap(ColumnDefinition::new(
        column.projection().clone(),
        Strategy::One,
        FirstCollector::<T>::new,
    ))
}

pub fn list<T: Datum>(column: &Column<T>) -> Definition<Vec<T>> {
    Definition::wrap(ColumnDefinition::new(
        column.projection().clone(),
        Strategy::List,
        ListCollector::<T>::new,
    ))
}

pub fn set<T: Datum + Eq + Hash>(column: &Column<T>) -> Definition<IndexSet<T>> {
    Definition::wrap(ColumnDefinition::new(
        column.projection().clone(),
        Strategy::Set,
        SetCollector::<T>::new,
    ))
}

/// Map column over one combined key/value projection.
pub fn map<K, V>(key: &Column<K>, value: &Column<V>) -> Definition<IndexMap<K, V>>
where
    K: Datum + Eq + Hash,
    V: Datum,
{
    Definition::wrap(ColumnDefinition::new(
        Projection::key_value(key.projection().clone(), value.projection().clone()),
        Strategy::Map,
        MapCollector::<K, V>::new,
    ))
}

/// Caller-supplied collector. The projection is still requested from the row
/// source; the collector decides what to do with it.
pub fn custom<C, F>(projection: impl Into<Projection>, factory: F) -> Definition<C::Output>
where
    C: Collector + 'static,
    F: Fn() -> C + Send + Sync + 'static,
{
    Definition::wrap(ColumnDefinition::new(
        projection.into(),
        Strategy::Custom,
        factory,
    ))
}
