pub mod collector;
pub mod definition;
mod group;
mod group_by;
pub mod projection;
pub mod row_source;
mod transformer;

pub use collector::{
    Collector, ConstantCollector, FirstCollector, ListCollector, MapCollector, SetCollector,
};
pub use definition::{
    ColumnDefinition, Definition, DefinitionId, Strategy, custom, list, map, one, set,
};
pub use group::Group;
pub use group_by::{GroupBy, GroupedResult, GroupingOptions};
pub use projection::{Column, KeyValueLink, Projection};
pub use row_source::{
    FnRowSource, IterCursor, MemoryCursor, MemoryRowSource, Row, RowCursor, RowSource,
};
pub use transformer::{ResultTransformer, TransformerGroupBy};

#[cfg(test)]
mod transformer_test;
