use chrono::NaiveDate;
use thiserror::Error;

use crate::data::record::Metric;

/// Why a selection transition was refused. The previous selection is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("at least one entity must stay active")]
    EmptyEntitySet,
    #[error("date range is inverted: {start} is after {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    /// A record carries a non-finite value for a metric it claims to have.
    #[error("record for `{entity}` on {date} has a non-finite {metric}")]
    DataIntegrity {
        entity: String,
        date: NaiveDate,
        metric: Metric,
    },

    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    /// The same key was classified as both entering and exiting.
    #[error("keys both entering and exiting in one reconciliation: {keys:?}")]
    ReconciliationInvariant { keys: Vec<String> },

    #[error("dataset contains no entities")]
    EmptyDataset,

    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Parse(String),
}

impl DashboardError {
    pub fn is_invalid_selection(&self) -> bool {
        matches!(self, DashboardError::InvalidSelection(_))
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
