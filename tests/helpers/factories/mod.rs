pub mod row_factory;
pub mod row_source_factory;

pub use row_factory::RowFactory;
pub use row_source_factory::{RowSourceFactory, ScriptedCursor, ScriptedRowSource};
