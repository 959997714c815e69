//! Error types for the hearth core.

use thiserror::Error;

/// Errors produced while normalizing a raw source record into an [`Event`].
///
/// These are always recovered locally: the offending record is dropped and
/// counted, and the rest of the calendar's sync continues.
///
/// [`Event`]: crate::event::Event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The upstream collaborator could not retrieve this record at all
    /// (transport or auth failure surfaced per-record).
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("malformed time spec: {0}")]
    MalformedTimeSpec(String),
}

/// Errors that abort a single calendar's sync cycle.
///
/// The calendar's previously stored events are left untouched when one of
/// these occurs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("sync timed out after {0}s")]
    Timeout(u64),

    #[error("authentication expired for calendar '{0}'")]
    AuthExpired(String),

    #[error("failed to parse source data: {0}")]
    ParseFailure(String),

    #[error("calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("sync failed: {0}")]
    Unknown(String),
}

/// Errors from the temporal projection engine.
///
/// A malformed individual event never produces one of these; only invalid
/// caller input does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("invalid view parameters: {0}")]
    InvalidViewParameters(String),
}

/// Errors from loading or persisting the event store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
