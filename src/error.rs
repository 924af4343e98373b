//! Error taxonomy for the occupancy engine.
//!
//! Library code returns these typed errors; the binary wraps startup
//! failures in `anyhow` and the routes gateway maps [`EngineError`] onto
//! HTTP status codes.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

// ---

/// Failure talking to the reading store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error("reading store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a whole aggregation request. No partial results are returned.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown section: {0}")]
    UnknownSection(String),
    #[error("invalid date range: start {start:?}, end {end:?}")]
    InvalidRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    #[error("reading store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Failure loading the section table at startup.
#[derive(Debug, Error)]
pub enum SectionConfigError {
    #[error("failed to read sections file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse sections file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid section table: {0}")]
    Invalid(String),
}
