//! # Error Types
//!
//! Typed failures for the reminder core.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! `ParseError` is always recovered at the command boundary into a fixed
//! user-facing apology. `StorageError` is not expected in normal operation
//! and is surfaced as a fatal startup condition, since silently dropping
//! reminders is unacceptable.

use thiserror::Error;

/// A time expression that could not be turned into a future instant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The argument text matched none of the accepted shapes, or had no
    /// message after the time expression.
    #[error("unrecognized time expression: {0:?}")]
    UnrecognizedExpression(String),

    /// The shape matched, but the values are not a real calendar instant
    /// (month 13, February 30th, hour 24, ...).
    #[error("invalid value for date {date:?} and/or time {time:?}")]
    InvalidCalendar { date: String, time: String },

    /// A date-bearing expression resolved to the present or the past. Only
    /// time-only expressions roll forward to the next day.
    #[error("requested instant is not in the future")]
    NotInFuture,
}

/// A reminder file that could not be read or written.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reminder storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed reminder record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}
