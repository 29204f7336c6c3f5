//! Single-pass row grouping.
//!
//! A [`GroupBy`] pulls rows from a [`RowSource`], partitions them by the value
//! of the first column and accumulates the remaining columns per group with
//! first-value, list, set, map or custom collectors. Groups come back in the
//! order their key was first seen, with the null key as an ordinary member.

pub mod engine;
pub mod logging;
pub mod shared;

pub use engine::errors::{CollectorError, GroupingError, RowSourceError};
pub use engine::group::{
    Collector, Column, ColumnDefinition, Definition, Group, GroupBy, GroupedResult,
    GroupingOptions, KeyValueLink, MemoryRowSource, Projection, ResultTransformer, Row,
    RowCursor, RowSource, Strategy, TransformerGroupBy,
};
pub use engine::types::{Bytes, Datum, Value};

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
