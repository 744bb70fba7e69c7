//! Error types for the gymtable core.

use thiserror::Error;

/// Errors that can occur in schedule ingestion and query operations.
///
/// Only caller errors (`InvalidQuery`, `UnknownGym`) and total-failure
/// conditions cross the crate boundary; per-feed and per-row failures are
/// absorbed inside the ingestion pipeline with a log line.
#[derive(Error, Debug)]
pub enum GymTableError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown gym: {0}")]
    UnknownGym(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Feed fetch error: {0}")]
    FeedFetch(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("All feeds failed to fetch")]
    AllFeedsFailed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gymtable operations.
pub type GymTableResult<T> = Result<T, GymTableError>;
