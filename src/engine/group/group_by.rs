use std::hash::Hash;

use ahash::RandomState as AHashRandomState;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, trace};

use super::definition::{self, ColumnDefinition, Definition};
use super::group::Group;
use super::projection::{Column, Projection};
use super::row_source::{CursorGuard, RowSource};
use super::transformer::{ResultTransformer, TransformerGroupBy};
use crate::engine::errors::{GroupingError, RowSourceError};
use crate::engine::types::Datum;
use crate::shared::config::{CONFIG, model::GroupingConfig};

/// Groups in the order their key was first seen. `None` is the null key.
pub type GroupedResult<K> = IndexMap<Option<K>, Group, AHashRandomState>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    /// Pre-sized capacity of the result map
    pub initial_capacity: usize,
    /// Abort the pass once more distinct keys than this are seen
    pub max_groups: Option<usize>,
}

impl GroupingOptions {
    pub fn from_config(cfg: &GroupingConfig) -> Self {
        Self {
            initial_capacity: cfg.initial_capacity,
            max_groups: cfg.max_groups,
        }
    }
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self::from_config(&CONFIG.grouping)
    }
}

/// Groups rows by the value of the first column and accumulates the remaining
/// columns per group.
///
/// The key column is registered as a first-value column, so the key stays
/// retrievable from every group. Each `with_*` call appends one column; the
/// resulting order is the projection order requested from the row source.
#[derive(Debug, Clone)]
pub struct GroupBy<K> {
    key: Column<K>,
    definitions: Vec<ColumnDefinition>,
    options: GroupingOptions,
}

impl<K: Datum + Eq + Hash> GroupBy<K> {
    pub fn new(key: &Column<K>) -> Self {
        Self {
            key: key.clone(),
            definitions: vec![definition::one(key).into()],
            options: GroupingOptions::default(),
        }
    }

    /// Key column followed by the given definitions, in order.
    pub fn from_definitions<I>(key: &Column<K>, definitions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ColumnDefinition>,
    {
        let mut group_by = Self::new(key);
        group_by
            .definitions
            .extend(definitions.into_iter().map(Into::into));
        group_by
    }

    pub fn with_group(mut self, definition: impl Into<ColumnDefinition>) -> Self {
        self.definitions.push(definition.into());
        self
    }

    pub fn with_one<T: Datum>(self, column: &Column<T>) -> Self {
        self.with_group(definition::one(column))
    }

    pub fn with_list<T: Datum>(self, column: &Column<T>) -> Self {
        self.with_group(definition::list(column))
    }

    pub fn with_set<T: Datum + Eq + Hash>(self, column: &Column<T>) -> Self {
        self.with_group(definition::set(column))
    }

    pub fn with_map<MK, MV>(self, key: &Column<MK>, value: &Column<MV>) -> Self
    where
        MK: Datum + Eq + Hash,
        MV: Datum,
    {
        self.with_group(definition::map(key, value))
    }

    pub fn with_options(mut self, options: GroupingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_transformer<W, F>(self, transformer: F) -> TransformerGroupBy<K, W, F>
    where
        F: Fn(&Group) -> Result<W, GroupingError>,
    {
        TransformerGroupBy::new(self, transformer)
    }

    pub fn key(&self) -> &Column<K> {
        &self.key
    }

    pub fn definitions(&self) -> &[ColumnDefinition] {
        &self.definitions
    }

    pub fn options(&self) -> GroupingOptions {
        self.options
    }

    pub fn contains<O>(&self, definition: &Definition<O>) -> bool {
        self.definitions.iter().any(|d| d.id() == definition.id())
    }

    /// Projections in schema order, one per column.
    pub fn projections(&self) -> Vec<Projection> {
        self.definitions
            .iter()
            .map(|d| d.projection().clone())
            .collect()
    }

    /// Runs one grouping pass over `source`.
    ///
    /// The cursor is closed on every exit path. On failure nothing is returned
    /// but the error.
    pub fn transform<S: RowSource>(
        &self,
        source: &mut S,
    ) -> Result<GroupedResult<K>, GroupingError> {
        self.run_pass(source).inspect_err(|e| e.log_error())
    }

    fn run_pass<S: RowSource>(&self, source: &mut S) -> Result<GroupedResult<K>, GroupingError> {
        let projections = self.projections();
        let width = projections.len();
        debug!(
            target: "rowgroup::group_by",
            key = %self.key.projection(),
            columns = width,
            "Starting grouping pass"
        );

        let mut cursor = CursorGuard::new(source.iterate(&projections)?);
        let mut groups: GroupedResult<K> = IndexMap::with_capacity_and_hasher(
            self.options.initial_capacity,
            AHashRandomState::new(),
        );
        let mut row_count = 0usize;

        while let Some(row) = cursor.next_row()? {
            if row.len() != width {
                return Err(RowSourceError::RowWidth {
                    expected: width,
                    actual: row.len(),
                }
                .into());
            }

            let key = Option::<K>::from_value(row[0].clone())?;
            let group = match groups.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    if let Some(max) = self.options.max_groups {
                        if entry.index() >= max {
                            return Err(GroupingError::GroupLimitExceeded(max));
                        }
                    }
                    trace!(
                        target: "rowgroup::group_by",
                        key = ?entry.key(),
                        position = entry.index(),
                        "Creating group"
                    );
                    entry.insert(Group::new(&self.definitions))
                }
            };
            group.add_row(row)?;
            row_count += 1;
        }

        debug!(
            target: "rowgroup::group_by",
            rows = row_count,
            groups = groups.len(),
            "Grouping pass complete"
        );
        Ok(groups)
    }
}

impl<K: Datum + Eq + Hash> ResultTransformer for GroupBy<K> {
    type Output = GroupedResult<K>;

    fn transform<S: RowSource>(&self, source: &mut S) -> Result<Self::Output, GroupingError> {
        GroupBy::transform(self, source)
    }
}
