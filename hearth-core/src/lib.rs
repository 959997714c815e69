//! Aggregation and projection core for the hearth household calendar.
//!
//! Raw per-source records go in (iCal feeds, Notion databases, Google
//! Calendar, local entries); bucketed, sorted events for a timeline, week
//! or month view come out. The pieces in between:
//!
//! - `event` / `normalize`: the canonical [`Event`] model and per-source
//!   normalization into it
//! - `store`: the shared event store (snapshot reads, atomic per-calendar
//!   replace, JSON persistence)
//! - `registry`: the merged calendar list and selection filtering
//! - `sync`: per-calendar sync cycles with timeout and fault isolation
//! - `project`: day-bucket projection for the three views
//!
//! [`Hearth`] ties them together for consumers.
//!
//! [`Event`]: event::Event

pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod hearth;
pub mod normalize;
pub mod project;
pub mod registry;
pub mod store;
pub mod sync;

pub use calendar::{Calendar, CalendarConfig};
pub use error::{NormalizeError, ProjectionError, StoreError, SyncError};
pub use event::{Event, Source, TimeSpec};
pub use hearth::{Hearth, SyncTarget};
pub use normalize::{normalize, normalize_batch, RawRecord, RawUnavailable};
pub use project::{project, DayBucket, Projection, View};
pub use registry::registry;
pub use store::{Snapshot, Store};
pub use sync::{SourceFetch, SyncEngine, SyncOutcome, SyncStats, SyncStatus};
