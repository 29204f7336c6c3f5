use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::errors::RowSourceError;
use crate::engine::group::{Projection, Row, RowCursor, RowSource};

/// Row source that replays a script of rows and failures.
pub struct ScriptedRowSource {
    script: Vec<Result<Row, String>>,
    closes: Arc<AtomicUsize>,
    requested: Vec<Projection>,
}

impl ScriptedRowSource {
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> &[Projection] {
        &self.requested
    }
}

impl RowSource for ScriptedRowSource {
    type Cursor = ScriptedCursor;

    fn iterate(&mut self, projections: &[Projection]) -> Result<ScriptedCursor, RowSourceError> {
        self.requested = projections.to_vec();
        Ok(ScriptedCursor {
            items: self.script.clone().into_iter(),
            closes: Arc::clone(&self.closes),
        })
    }
}

/// Counts every call to `close`, including repeated ones.
pub struct ScriptedCursor {
    items: std::vec::IntoIter<Result<Row, String>>,
    closes: Arc<AtomicUsize>,
}

impl RowCursor for ScriptedCursor {
    fn next_row(&mut self) -> Result<Option<Row>, RowSourceError> {
        match self.items.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(msg)) => Err(RowSourceError::Other(msg)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RowSourceFactory {
    script: Vec<Result<Row, String>>,
}

impl RowSourceFactory {
    pub fn new() -> Self {
        Self { script: Vec::new() }
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.script.extend(rows.into_iter().map(Ok));
        self
    }

    pub fn with_failure(mut self, message: &str) -> Self {
        self.script.push(Err(message.to_string()));
        self
    }

    pub fn create(self) -> ScriptedRowSource {
        ScriptedRowSource {
            script: self.script,
            closes: Arc::new(AtomicUsize::new(0)),
            requested: Vec::new(),
        }
    }
}
