use std::hash::Hash;
use std::marker::PhantomData;

use ahash::RandomState as AHashRandomState;
use indexmap::IndexMap;
use tracing::debug;

use super::group::Group;
use super::group_by::GroupBy;
use super::row_source::RowSource;
use crate::engine::errors::GroupingError;
use crate::engine::types::Datum;

/// Something that consumes a row source in one pass and produces a result.
pub trait ResultTransformer {
    type Output;

    fn transform<S: RowSource>(&self, source: &mut S) -> Result<Self::Output, GroupingError>;
}

/// Runs a [`GroupBy`] and maps every finished group to `W`, keeping key order.
///
/// The mapping only borrows each group for the duration of the call.
pub struct TransformerGroupBy<K, W, F> {
    group_by: GroupBy<K>,
    transformer: F,
    _output: PhantomData<fn() -> W>,
}

impl<K, W, F> TransformerGroupBy<K, W, F>
where
    K: Datum + Eq + Hash,
    F: Fn(&Group) -> Result<W, GroupingError>,
{
    pub fn new(group_by: GroupBy<K>, transformer: F) -> Self {
        Self {
            group_by,
            transformer,
            _output: PhantomData,
        }
    }

    pub fn group_by(&self) -> &GroupBy<K> {
        &self.group_by
    }

    pub fn transform<S: RowSource>(
        &self,
        source: &mut S,
    ) -> Result<IndexMap<Option<K>, W, AHashRandomState>, GroupingError> {
        let groups = self.group_by.transform(source)?;
        let mut out = IndexMap::with_capacity_and_hasher(groups.len(), AHashRandomState::new());
        for (key, group) in groups {
            let value = (self.transformer)(&group).inspect_err(|e| e.log_error())?;
            out.insert(key, value);
        }
        debug!(
            target: "rowgroup::transformer",
            groups = out.len(),
            "Transformed grouped result"
        );
        Ok(out)
    }
}

impl<K, W, F> ResultTransformer for TransformerGroupBy<K, W, F>
where
    K: Datum + Eq + Hash,
    F: Fn(&Group) -> Result<W, GroupingError>,
{
    type Output = IndexMap<Option<K>, W, AHashRandomState>;

    fn transform<S: RowSource>(&self, source: &mut S) -> Result<Self::Output, GroupingError> {
        TransformerGroupBy::transform(self, source)
    }
}
