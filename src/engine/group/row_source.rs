use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use super::projection::Projection;
use crate::engine::errors::RowSourceError;
use crate::engine::types::Value;

/// One materialized row: a value per requested projection, in request order.
pub type Row = Vec<Value>;

/// An open, forward-only sequence of rows.
pub trait RowCursor {
    /// `Ok(None)` once the rows are exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, RowSourceError>;

    /// Releases the cursor. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Produces a cursor over rows for an ordered list of projections.
///
/// A map column arrives as one `Value::Pair` slot for its `KeyValue` projection.
pub trait RowSource {
    type Cursor: RowCursor;

    fn iterate(&mut self, projections: &[Projection]) -> Result<Self::Cursor, RowSourceError>;
}

/// Closes the wrapped cursor exactly once when dropped.
pub(crate) struct CursorGuard<C: RowCursor> {
    cursor: C,
}

impl<C: RowCursor> CursorGuard<C> {
    pub(crate) fn new(cursor: C) -> Self {
        Self { cursor }
    }

    pub(crate) fn next_row(&mut self) -> Result<Option<Row>, RowSourceError> {
        self.cursor.next_row()
    }
}

impl<C: RowCursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        trace!(target: "rowgroup::row_source", "Closing row cursor");
        self.cursor.close();
    }
}

/// Cursor over any iterator of fallible rows. Yields `Closed` after `close`.
pub struct IterCursor<I> {
    rows: Option<I>,
}

impl<I> IterCursor<I>
where
    I: Iterator<Item = Result<Row, RowSourceError>>,
{
    pub fn new(rows: I) -> Self {
        Self { rows: Some(rows) }
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_none()
    }
}

impl<R> IterCursor<std::iter::Map<R, fn(Row) -> Result<Row, RowSourceError>>>
where
    R: Iterator<Item = Row>,
{
    pub fn from_rows<T>(rows: T) -> Self
    where
        T: IntoIterator<IntoIter = R>,
    {
        let ok: fn(Row) -> Result<Row, RowSourceError> = Ok;
        Self::new(rows.into_iter().map(ok))
    }
}

impl<I> RowCursor for IterCursor<I>
where
    I: Iterator<Item = Result<Row, RowSourceError>>,
{
    fn next_row(&mut self) -> Result<Option<Row>, RowSourceError> {
        match self.rows.as_mut() {
            Some(rows) => rows.next().transpose(),
            None => Err(RowSourceError::Closed),
        }
    }

    fn close(&mut self) {
        self.rows = None;
    }
}

/// Rows held in memory. Every `iterate` replays them from the start; the
/// requested projections and the number of cursor closes are recorded.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowSource {
    rows: Vec<Row>,
    requested: Vec<Vec<Projection>>,
    closes: Arc<AtomicUsize>,
}

impl MemoryRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            requested: Vec::new(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Projection lists passed to `iterate`, oldest first.
    pub fn requested_projections(&self) -> &[Vec<Projection>] {
        &self.requested
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl RowSource for MemoryRowSource {
    type Cursor = MemoryCursor;

    fn iterate(&mut self, projections: &[Projection]) -> Result<MemoryCursor, RowSourceError> {
        self.requested.push(projections.to_vec());
        Ok(MemoryCursor {
            rows: IterCursor::from_rows(self.rows.clone()),
            closes: Arc::clone(&self.closes),
        })
    }
}

type ReplayRows = std::iter::Map<std::vec::IntoIter<Row>, fn(Row) -> Result<Row, RowSourceError>>;

pub struct MemoryCursor {
    rows: IterCursor<ReplayRows>,
    closes: Arc<AtomicUsize>,
}

impl RowCursor for MemoryCursor {
    fn next_row(&mut self) -> Result<Option<Row>, RowSourceError> {
        self.rows.next_row()
    }

    fn close(&mut self) {
        if !self.rows.is_closed() {
            self.rows.close();
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Adapts a closure into a [`RowSource`].
pub struct FnRowSource<F> {
    open: F,
}

impl<F, C> FnRowSource<F>
where
    F: FnMut(&[Projection]) -> Result<C, RowSourceError>,
    C: RowCursor,
{
    pub fn new(open: F) -> Self {
        Self { open }
    }
}

impl<F, C> RowSource for FnRowSource<F>
where
    F: FnMut(&[Projection]) -> Result<C, RowSourceError>,
    C: RowCursor,
{
    type Cursor = C;

    fn iterate(&mut self, projections: &[Projection]) -> Result<C, RowSourceError> {
        (self.open)(projections)
    }
}
