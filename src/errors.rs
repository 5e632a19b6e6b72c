//! Error taxonomy for the similarity core.
//!
//! Every failure here is local and recoverable: missing precomputed data and
//! unrecognisable table schemas have `*_or_missing` / `*_or_empty` helpers in
//! the loaders that turn them into empty values, so only [`GraphSimError::Parse`]
//! normally reaches the caller of the quick-compare path.
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::RdfFormat;

/// One failed attempt of a parser strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAttempt {
    pub format: RdfFormat,
    pub cause: String,
}

impl fmt::Display for ParseAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.format, self.cause)
    }
}

fn join_attempts(attempts: &[ParseAttempt]) -> String {
    if attempts.is_empty() {
        return "no parser strategy configured".to_string();
    }
    attempts
        .iter()
        .map(ParseAttempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphSimError {
    /// Every configured serialization was tried and none succeeded.
    #[error("graph could not be parsed in any supported format ({})", join_attempts(.attempts))]
    Parse { attempts: Vec<ParseAttempt> },

    #[error("expected data is missing or empty: {}", .path.display())]
    MissingData { path: PathBuf },

    /// No alias of a required logical column matched the table header.
    #[error("table '{table}' has no column for '{field}' under any known spelling")]
    SchemaMismatch { table: String, field: String },

    /// A table was found but lacks columns a view needs.
    #[error("table '{table}' is missing columns {missing:?} (available: {available:?})")]
    MissingColumns {
        table: String,
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("malformed table: {message}")]
    Schema { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphSimError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        GraphSimError::Schema {
            message: message.into(),
        }
    }

    /// True for the conditions the loaders treat as "data unavailable".
    pub fn is_recoverable_absence(&self) -> bool {
        matches!(
            self,
            GraphSimError::MissingData { .. } | GraphSimError::SchemaMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GraphSimError>;
