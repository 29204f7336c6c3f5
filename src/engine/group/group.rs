use std::any::TypeId;
use std::fmt;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use super::collector::ErasedCollector;
use super::definition::{ColumnDefinition, Definition, Strategy};
use super::projection::{Column, Projection};
use super::row_source::Row;
use crate::engine::errors::{CollectorError, GroupingError};
use crate::engine::types::{Datum, Value};

struct Binding {
    definition: ColumnDefinition,
    collector: Box<dyn ErasedCollector>,
}

/// The aggregate for one group key: one collector per column definition, in
/// schema order.
pub struct Group {
    bindings: Vec<Binding>,
}

impl Group {
    pub(crate) fn new(definitions: &[ColumnDefinition]) -> Self {
        let bindings = definitions
            .iter()
            .map(|definition| Binding {
                definition: definition.clone(),
                collector: definition.create_collector(),
            })
            .collect();
        Self { bindings }
    }

    /// Feeds the i-th value of the row to the i-th collector.
    pub(crate) fn add_row(&mut self, row: Row) -> Result<(), CollectorError> {
        for (binding, value) in self.bindings.iter_mut().zip(row) {
            binding.collector.add(value)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.bindings.iter().map(|b| &b.definition)
    }

    pub fn get_one<T: Datum>(&self, column: &Column<T>) -> Result<Option<T>, GroupingError> {
        self.lookup(column.projection(), Strategy::One)
    }

    pub fn get_list<T: Datum>(&self, column: &Column<T>) -> Result<Vec<T>, GroupingError> {
        self.lookup(column.projection(), Strategy::List)
    }

    pub fn get_set<T: Datum + Eq + Hash>(
        &self,
        column: &Column<T>,
    ) -> Result<IndexSet<T>, GroupingError> {
        self.lookup(column.projection(), Strategy::Set)
    }

    pub fn get_map<K, V>(
        &self,
        key: &Column<K>,
        value: &Column<V>,
    ) -> Result<IndexMap<K, V>, GroupingError>
    where
        K: Datum + Eq + Hash,
        V: Datum,
    {
        let projection =
            Projection::key_value(key.projection().clone(), value.projection().clone());
        self.lookup(&projection, Strategy::Map)
    }

    /// Lookup by definition identity, which also reaches custom columns.
    pub fn get_by_definition<O: Datum>(
        &self,
        definition: &Definition<O>,
    ) -> Result<O, GroupingError> {
        let binding = self
            .bindings
            .iter()
            .find(|b| b.definition.id() == definition.id())
            .ok_or_else(|| no_such_column(definition.projection(), definition.strategy()))?;
        downcast::<O>(binding)?
            .ok_or_else(|| no_such_column(definition.projection(), definition.strategy()))
    }

    /// Every collector's current result in schema order.
    pub fn to_positional_array(&self) -> Result<Vec<Value>, GroupingError> {
        self.bindings
            .iter()
            .map(|b| b.collector.get_value().map_err(GroupingError::from))
            .collect()
    }

    fn lookup<O: Datum>(
        &self,
        projection: &Projection,
        strategy: Strategy,
    ) -> Result<O, GroupingError> {
        let candidates = self.bindings.iter().filter(|b| {
            b.definition.strategy() == strategy && b.definition.projection() == projection
        });
        for binding in candidates {
            if let Some(result) = downcast::<O>(binding)? {
                return Ok(result);
            }
        }
        Err(no_such_column(projection, strategy))
    }
}

/// `Ok(None)` when the collector produces a different type than requested.
/// The result is only materialized once the type matches.
fn downcast<O: Datum>(binding: &Binding) -> Result<Option<O>, GroupingError> {
    if binding.collector.output_type() != TypeId::of::<O>() {
        return Ok(None);
    }
    let any = binding.collector.get_any()?;
    Ok(any.downcast::<O>().ok().map(|boxed| *boxed))
}

fn no_such_column(projection: &Projection, strategy: Strategy) -> GroupingError {
    GroupingError::NoSuchColumn(format!("{} ({:?})", projection, strategy))
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| b.definition.projection()))
            .finish()
    }
}
