//! The event store: calendars, events, and the selection set.
//!
//! This is the only shared mutable state in the core. All mutation happens
//! under one write lock, so readers (registry, projection) always see a
//! consistent snapshot: a calendar's events are never observable
//! mid-replace, and a cascade removal is all-or-nothing.
//!
//! Two logical tables persist to disk as `calendars.json` and
//! `events.json`, written atomically via tmp-file + rename. Selection and
//! sync status are transient.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::calendar::CalendarConfig;
use crate::error::{StoreError, StoreResult};
use crate::event::Event;

const CALENDARS_FILE: &str = "calendars.json";
const EVENTS_FILE: &str = "events.json";

/// Events keyed by calendar id, then by event id.
type EventTable = BTreeMap<String, BTreeMap<String, Event>>;

#[derive(Default)]
struct Tables {
    calendars: BTreeMap<String, CalendarConfig>,
    events: EventTable,
    selection: BTreeSet<String>,
}

/// A consistent point-in-time view of the store.
///
/// Cheap enough to clone at household scale; the registry and the
/// projection engine only ever work from one of these.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub calendars: BTreeMap<String, CalendarConfig>,
    pub events: EventTable,
    pub selection: BTreeSet<String>,
}

impl Snapshot {
    /// All events across all calendars.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values().flat_map(|by_id| by_id.values())
    }

    pub fn event_count_for(&self, calendar_id: &str) -> usize {
        self.events.get(calendar_id).map_or(0, BTreeMap::len)
    }

    /// Distinct calendar ids observed in stored events.
    pub fn observed_calendar_ids(&self) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(|(_, by_id)| !by_id.is_empty())
            .map(|(id, _)| id.as_str())
    }
}

pub struct Store {
    tables: RwLock<Tables>,
    /// Bumped on every mutation; see [`Store::subscribe`].
    revision: watch::Sender<u64>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Store {
            tables: RwLock::new(Tables::default()),
            revision,
        }
    }

    /// Observe store mutations: the received value is a revision counter
    /// that changes whenever calendars, events or selection change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("store lock poisoned")
    }

    pub fn snapshot(&self) -> Snapshot {
        let tables = self.read();
        Snapshot {
            calendars: tables.calendars.clone(),
            events: tables.events.clone(),
            selection: tables.selection.clone(),
        }
    }

    // =========================================================================
    // Calendar configuration
    // =========================================================================

    pub fn get_calendar(&self, id: &str) -> Option<CalendarConfig> {
        self.read().calendars.get(id).cloned()
    }

    /// Insert or update a calendar config. New calendars start selected.
    pub fn upsert_calendar(&self, config: CalendarConfig) {
        {
            let mut tables = self.write();
            let is_new = !tables.calendars.contains_key(&config.id);
            if is_new {
                tables.selection.insert(config.id.clone());
            }
            tables.calendars.insert(config.id.clone(), config);
        }
        self.notify();
    }

    pub fn set_last_sync(&self, id: &str, at: DateTime<Utc>) {
        {
            let mut tables = self.write();
            if let Some(config) = tables.calendars.get_mut(id) {
                config.last_sync = Some(at);
            }
        }
        self.notify();
    }

    /// Remove a calendar and everything that references it: its config,
    /// every event with its id, and its selection entry. All under one
    /// write lock, so a partial removal is never observable.
    pub fn remove_calendar(&self, id: &str) -> bool {
        let removed = {
            let mut tables = self.write();
            let had_config = tables.calendars.remove(id).is_some();
            let had_events = tables.events.remove(id).is_some();
            tables.selection.remove(id);
            had_config || had_events
        };
        if removed {
            self.notify();
        }
        removed
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Atomically swap a calendar's whole event set.
    ///
    /// Events that were not re-fetched disappear; this is what makes
    /// deleted-upstream events vanish locally. Duplicate ids within one
    /// batch collapse deterministically (last one wins).
    pub fn replace_calendar_events(&self, calendar_id: &str, events: Vec<Event>) -> usize {
        let stored = {
            let mut tables = self.write();
            let by_id: BTreeMap<String, Event> = events
                .into_iter()
                .filter(|e| e.calendar_id == calendar_id)
                .map(|e| (e.id.clone(), e))
                .collect();
            let stored = by_id.len();
            if by_id.is_empty() {
                tables.events.remove(calendar_id);
            } else {
                tables.events.insert(calendar_id.to_string(), by_id);
            }
            stored
        };
        self.notify();
        stored
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> BTreeSet<String> {
        self.read().selection.clone()
    }

    pub fn set_selected(&self, calendar_id: &str, selected: bool) {
        {
            let mut tables = self.write();
            if selected {
                tables.selection.insert(calendar_id.to_string());
            } else {
                tables.selection.remove(calendar_id);
            }
        }
        self.notify();
    }

    /// Select every known calendar (configured or observed in events).
    pub fn select_all(&self) {
        {
            let mut tables = self.write();
            let mut all: BTreeSet<String> = tables.calendars.keys().cloned().collect();
            all.extend(tables.events.keys().cloned());
            tables.selection = all;
        }
        self.notify();
    }

    pub fn clear_selection(&self) {
        {
            let mut tables = self.write();
            tables.selection.clear();
        }
        self.notify();
    }

    /// Select exactly the calendars that currently have stored events.
    pub fn select_only_with_events(&self) {
        {
            let mut tables = self.write();
            tables.selection = tables
                .events
                .iter()
                .filter(|(_, by_id)| !by_id.is_empty())
                .map(|(id, _)| id.clone())
                .collect();
        }
        self.notify();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load the two persisted tables from `dir`. Missing files mean an
    /// empty store. Selection starts as "everything known".
    pub fn load(dir: &Path) -> StoreResult<Store> {
        let calendars: BTreeMap<String, CalendarConfig> = read_json(&dir.join(CALENDARS_FILE))?;
        let events: EventTable = read_json(&dir.join(EVENTS_FILE))?;

        let mut selection: BTreeSet<String> = calendars.keys().cloned().collect();
        selection.extend(events.keys().cloned());

        let (revision, _) = watch::channel(0);
        Ok(Store {
            tables: RwLock::new(Tables {
                calendars,
                events,
                selection,
            }),
            revision,
        })
    }

    pub fn save(&self, dir: &Path) -> StoreResult<()> {
        std::fs::create_dir_all(dir)?;
        let tables = self.read();
        write_json(&dir.join(CALENDARS_FILE), &tables.calendars)?;
        write_json(&dir.join(EVENTS_FILE), &tables.events)?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Write via a temp file and rename, so a crash never leaves a torn table.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
