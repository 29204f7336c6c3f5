use std::io;
use thiserror::Error;
use tracing::{debug, error};

/// Errors that can end a grouping pass or a group lookup.
#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("No such column: {0}")]
    NoSuchColumn(String),

    #[error("Row source failed: {0}")]
    RowSourceFailure(#[from] RowSourceError),

    #[error("Collector failed: {0}")]
    CollectorFailure(#[from] CollectorError),

    #[error("Group limit of {0} exceeded")]
    GroupLimitExceeded(usize),
}

#[derive(Debug, Error)]
pub enum RowSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Row has {actual} values, expected {expected}")]
    RowWidth { expected: usize, actual: usize },

    #[error("Row source already closed")]
    Closed,

    #[error("Other error: {0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollectorError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Collector failed: {0}")]
    Failed(String),
}

impl GroupingError {
    pub fn log_error(&self) {
        match self {
            GroupingError::NoSuchColumn(e) => {
                error!("No such column: {}", e);
                debug!("Column lookup error details: {}", e);
            }
            GroupingError::RowSourceFailure(e) => {
                error!("Row source failed: {}", e);
                debug!("Row source error details: {:?}", e);
            }
            GroupingError::CollectorFailure(e) => {
                error!("Collector failed: {}", e);
                debug!("Collector error details: {:?}", e);
            }
            GroupingError::GroupLimitExceeded(max) => {
                error!("Group limit of {} exceeded", max);
                debug!("Grouping pass aborted after creating {} groups", max);
            }
        }
    }
}
