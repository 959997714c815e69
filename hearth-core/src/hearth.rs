//! The core's public handle, tying store, registry, sync engine and
//! projection together behind the interfaces the rendering and settings
//! collaborators consume.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::calendar::{Calendar, CalendarConfig};
use crate::error::{ProjectionError, StoreResult};
use crate::project::{project, Projection, View};
use crate::registry::registry;
use crate::store::Store;
use crate::sync::{SourceFetch, SyncEngine, SyncResults, SyncStatus};

/// What a sync trigger should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    Calendar(String),
    All,
}

/// Handle to the aggregation core.
///
/// Cloning is cheap; clones share the same store and sync state.
#[derive(Clone)]
pub struct Hearth {
    store: Arc<Store>,
    engine: SyncEngine,
}

impl Hearth {
    pub fn new(fetcher: Arc<dyn SourceFetch>) -> Self {
        Self::with_store(Arc::new(Store::new()), fetcher)
    }

    pub fn with_store(store: Arc<Store>, fetcher: Arc<dyn SourceFetch>) -> Self {
        let engine = SyncEngine::new(Arc::clone(&store), fetcher);
        Hearth { store, engine }
    }

    /// Load persisted calendars and events from `dir`.
    pub fn open(dir: &Path, fetcher: Arc<dyn SourceFetch>) -> StoreResult<Self> {
        let store = Arc::new(Store::load(dir)?);
        Ok(Self::with_store(store, fetcher))
    }

    pub fn save(&self, dir: &Path) -> StoreResult<()> {
        self.store.save(dir)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn sync_engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Notified (with a bumped revision) on every store mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    // =========================================================================
    // Read interfaces
    // =========================================================================

    /// Project the currently selected calendars into `view`.
    pub fn get_projection(
        &self,
        view: View,
        today: NaiveDate,
    ) -> Result<Projection, ProjectionError> {
        let snapshot = self.store.snapshot();
        project(&snapshot, &snapshot.selection, view, today)
    }

    pub fn get_registry(&self) -> Vec<Calendar> {
        registry(&self.store.snapshot())
    }

    pub fn get_selection(&self) -> BTreeSet<String> {
        self.store.selection()
    }

    pub fn get_sync_status(&self, calendar_id: &str) -> SyncStatus {
        self.engine.take_status(calendar_id)
    }

    // =========================================================================
    // Mutation interfaces
    // =========================================================================

    pub async fn trigger_sync(&self, target: SyncTarget) -> SyncResults {
        match target {
            SyncTarget::All => self.engine.sync_all().await,
            SyncTarget::Calendar(id) => {
                let result = self.engine.sync_calendar(&id).await;
                vec![(id, result)]
            }
        }
    }

    pub fn add_calendar(&self, config: CalendarConfig) {
        self.store.upsert_calendar(config);
    }

    pub fn update_calendar(&self, config: CalendarConfig) {
        self.store.upsert_calendar(config);
    }

    /// Remove a calendar, cascading to its events and selection entry.
    pub fn remove_calendar(&self, calendar_id: &str) -> bool {
        self.store.remove_calendar(calendar_id)
    }

    pub fn set_selected(&self, calendar_id: &str, selected: bool) {
        self.store.set_selected(calendar_id, selected);
    }

    pub fn select_all(&self) {
        self.store.select_all();
    }

    pub fn clear_selection(&self) {
        self.store.clear_selection();
    }

    pub fn select_only_with_events(&self) {
        self.store.select_only_with_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::event::Source;
    use crate::normalize::{RawLocalEvent, RawRecord};
    use crate::project::View;
    use async_trait::async_trait;

    /// Serves one local record for any enabled calendar.
    struct OneEventFetcher;

    #[async_trait]
    impl SourceFetch for OneEventFetcher {
        async fn fetch(&self, _calendar: &CalendarConfig) -> Result<Vec<RawRecord>, SyncError> {
            Ok(vec![RawRecord::Local(RawLocalEvent {
                id: Some("movie".into()),
                title: Some("Movie night".into()),
                date: NaiveDate::from_ymd_opt(2026, 3, 9),
                start_time: Some("19:30".into()),
                end_time: None,
                end_date: None,
                location: None,
                description: None,
                color: None,
                duration_text: None,
            })])
        }
    }

    #[tokio::test]
    async fn end_to_end_sync_then_project() {
        let hearth = Hearth::new(Arc::new(OneEventFetcher));
        hearth.add_calendar({
            let mut c = CalendarConfig::new("Home", Source::Local, None);
            c.id = "local-home".into();
            c
        });

        let results = hearth.trigger_sync(SyncTarget::All).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());

        let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let projection = hearth.get_projection(View::Timeline, today).unwrap();
        assert_eq!(projection.buckets[0].events.len(), 1);
        assert_eq!(projection.buckets[0].events[0].title, "Movie night");

        // Deselecting hides the events without touching them.
        hearth.set_selected("local-home", false);
        let projection = hearth.get_projection(View::Timeline, today).unwrap();
        assert!(projection.buckets[0].events.is_empty());
        assert_eq!(hearth.get_registry()[0].event_count, 1);
    }

    #[tokio::test]
    async fn remove_calendar_leaves_no_trace() {
        let hearth = Hearth::new(Arc::new(OneEventFetcher));
        hearth.add_calendar({
            let mut c = CalendarConfig::new("Home", Source::Local, None);
            c.id = "local-home".into();
            c
        });
        hearth
            .trigger_sync(SyncTarget::Calendar("local-home".into()))
            .await;

        assert!(hearth.remove_calendar("local-home"));
        assert!(hearth.get_registry().is_empty());
        assert!(hearth.get_selection().is_empty());
    }
}
