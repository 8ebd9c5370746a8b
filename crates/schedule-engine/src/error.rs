//! Error types for schedule-engine operations.
//!
//! Validation rejections are not errors: they come back as
//! [`ValidationResult::Rejected`](crate::validator::ValidationResult). The
//! variants here are input-contract violations only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// A time-of-day string that is not `HH:MM[:SS]` or is out of range.
    #[error("Malformed time: {0:?}")]
    MalformedTime(String),

    /// A date string whose first 10 characters are not a `YYYY-MM-DD` date.
    #[error("Malformed date: {0:?}")]
    MalformedDate(String),

    /// A reservation snapshot that is not valid reservation JSON.
    #[error("Invalid reservation JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
