//! The sync orchestrator: per-calendar fetch -> normalize -> replace
//! cycles with independent fault isolation.
//!
//! Fetching is the only suspension point in the core and is delegated to
//! an external [`SourceFetch`] collaborator (the wire parsers live behind
//! it). Each calendar syncs at most once at a time: a trigger while a
//! cycle is running is a no-op, not a queued retry. A failed cycle leaves
//! the calendar's previously stored events untouched, so a sync error
//! never masquerades as an empty calendar.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::calendar::CalendarConfig;
use crate::error::SyncError;
use crate::normalize::{normalize_batch, RawRecord};
use crate::store::Store;

/// Upper bound on a single calendar's fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the raw records for one calendar from its source.
///
/// Implementations own transport, credentials and wire parsing; the core
/// only sees unvalidated [`RawRecord`]s or a [`SyncError`].
#[async_trait]
pub trait SourceFetch: Send + Sync {
    async fn fetch(&self, calendar: &CalendarConfig) -> Result<Vec<RawRecord>, SyncError>;
}

/// Per-calendar sync state. Transient: resets to `Idle` on restart, and
/// terminal states reset to `Idle` once read via
/// [`SyncEngine::take_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success {
        at: DateTime<Utc>,
        stored: usize,
        dropped: usize,
    },
    Error(SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub fetched: usize,
    pub stored: usize,
    /// Records dropped because they failed normalization.
    pub dropped: usize,
}

/// What a trigger actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncStats),
    /// The calendar was already mid-cycle; nothing was started.
    AlreadySyncing,
    /// The calendar has sync disabled.
    Disabled,
}

pub type SyncResults = Vec<(String, Result<SyncOutcome, SyncError>)>;

/// Drives sync cycles against a shared [`Store`].
///
/// Cheap to clone; clones share status and store.
#[derive(Clone)]
pub struct SyncEngine {
    store: Arc<Store>,
    fetcher: Arc<dyn SourceFetch>,
    status: Arc<Mutex<HashMap<String, SyncStatus>>>,
    fetch_timeout: Duration,
}

impl SyncEngine {
    pub fn new(store: Arc<Store>, fetcher: Arc<dyn SourceFetch>) -> Self {
        SyncEngine {
            store,
            fetcher,
            status: Arc::new(Mutex::new(HashMap::new())),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Run one sync cycle for a calendar.
    ///
    /// Errors are both returned and recorded in the calendar's status, so
    /// fire-and-forget callers (webhooks, scheduler) lose nothing.
    pub async fn sync_calendar(&self, calendar_id: &str) -> Result<SyncOutcome, SyncError> {
        let calendar = self
            .store
            .get_calendar(calendar_id)
            .ok_or_else(|| SyncError::CalendarNotFound(calendar_id.to_string()))?;

        if !calendar.enabled {
            return Ok(SyncOutcome::Disabled);
        }

        if !self.begin(calendar_id) {
            tracing::debug!(calendar_id, "sync already in progress, ignoring trigger");
            return Ok(SyncOutcome::AlreadySyncing);
        }

        match self.run_cycle(&calendar).await {
            Ok(stats) => {
                let now = Utc::now();
                self.store.set_last_sync(calendar_id, now);
                self.finish(
                    calendar_id,
                    SyncStatus::Success {
                        at: now,
                        stored: stats.stored,
                        dropped: stats.dropped,
                    },
                );
                tracing::info!(
                    calendar_id,
                    stored = stats.stored,
                    dropped = stats.dropped,
                    "sync complete"
                );
                Ok(SyncOutcome::Completed(stats))
            }
            Err(err) => {
                self.finish(calendar_id, SyncStatus::Error(err.clone()));
                tracing::warn!(calendar_id, %err, "sync failed, keeping stored events");
                Err(err)
            }
        }
    }

    /// fetch -> normalize -> replace. On any error the store is not
    /// touched, so partial data never reaches readers.
    async fn run_cycle(&self, calendar: &CalendarConfig) -> Result<SyncStats, SyncError> {
        let records = timeout(self.fetch_timeout, self.fetcher.fetch(calendar))
            .await
            .map_err(|_| SyncError::Timeout(self.fetch_timeout.as_secs()))??;

        let fetched = records.len();
        let (events, stats) = normalize_batch(&records, &calendar.id);
        if events.is_empty() {
            if let Some(reason) = stats.unavailable.first() {
                // Nothing came through and the source reported itself
                // unreachable; replacing with nothing would make the
                // outage look like an empty calendar.
                return Err(SyncError::Unknown(format!("source unavailable: {reason}")));
            }
        }
        let stored = self.store.replace_calendar_events(&calendar.id, events);

        Ok(SyncStats {
            fetched,
            stored,
            dropped: stats.dropped,
        })
    }

    /// Fan out one cycle per enabled calendar, concurrently, and collect
    /// per-calendar results. One calendar's failure never aborts another's
    /// cycle.
    pub async fn sync_all(&self) -> SyncResults {
        let ids: Vec<String> = {
            let snapshot = self.store.snapshot();
            snapshot
                .calendars
                .values()
                .filter(|c| c.enabled)
                .map(|c| c.id.clone())
                .collect()
        };
        self.sync_many(ids).await
    }

    async fn sync_many(&self, ids: Vec<String>) -> SyncResults {
        let mut set = JoinSet::new();
        for id in ids {
            let engine = self.clone();
            set.spawn(async move {
                let result = engine.sync_calendar(&id).await;
                (id, result)
            });
        }

        let mut results = SyncResults::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(pair) => results.push(pair),
                Err(err) => tracing::error!(%err, "sync task panicked"),
            }
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    /// Current status for a calendar. Reading a terminal state
    /// (`Success`/`Error`) resets it to `Idle`.
    pub fn take_status(&self, calendar_id: &str) -> SyncStatus {
        let mut status = self.lock_status();
        match status.get(calendar_id) {
            None => SyncStatus::Idle,
            Some(SyncStatus::Syncing) => SyncStatus::Syncing,
            Some(terminal) => {
                let taken = terminal.clone();
                status.insert(calendar_id.to_string(), SyncStatus::Idle);
                taken
            }
        }
    }

    // =========================================================================
    // Scheduled sync
    // =========================================================================

    /// Calendars whose configured frequency says they are due at `now`.
    pub fn due_calendars(&self, now: DateTime<Utc>) -> Vec<String> {
        let snapshot = self.store.snapshot();
        snapshot
            .calendars
            .values()
            .filter(|c| c.enabled)
            .filter(|c| match c.sync_interval_secs() {
                None => false,
                Some(interval) => match c.last_sync {
                    None => true,
                    Some(last) => (now - last).num_seconds() >= interval,
                },
            })
            .map(|c| c.id.clone())
            .collect()
    }

    /// Sync every currently due calendar.
    pub async fn sync_due(&self) -> SyncResults {
        self.sync_many(self.due_calendars(Utc::now())).await
    }

    /// Periodic scheduler loop. Runs until the task is dropped; each tick
    /// triggers the calendars whose interval has elapsed.
    pub async fn run_scheduler(&self, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let results = self.sync_due().await;
            for (calendar_id, result) in &results {
                if let Err(err) = result {
                    tracing::warn!(calendar_id = calendar_id.as_str(), %err, "scheduled sync failed");
                }
            }
        }
    }

    /// Mark the calendar as syncing. Returns false if a cycle is already
    /// running (the caller must then back off).
    fn begin(&self, calendar_id: &str) -> bool {
        let mut status = self.lock_status();
        if matches!(status.get(calendar_id), Some(SyncStatus::Syncing)) {
            return false;
        }
        status.insert(calendar_id.to_string(), SyncStatus::Syncing);
        true
    }

    fn finish(&self, calendar_id: &str, outcome: SyncStatus) {
        self.lock_status().insert(calendar_id.to_string(), outcome);
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, HashMap<String, SyncStatus>> {
        self.status.lock().expect("sync status lock poisoned")
    }
}
