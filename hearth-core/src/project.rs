//! Temporal projection: turn the stored event set into day buckets for a
//! timeline, week or month view.
//!
//! Projection is a pure, synchronous computation over a store snapshot.
//! It expands multi-day events into every day they occupy, so consumers
//! never re-derive spans, and it applies one sort contract across all
//! three views: multi-day first, then all-day, then timed by start time.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::ProjectionError;
use crate::event::Event;
use crate::store::Snapshot;

/// Timeline view length in days.
const TIMELINE_DAYS: i64 = 3;

/// Which temporal view to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Rolling window of three days starting today. Does not page.
    Timeline,
    /// Seven buckets starting at the Sunday of `today + 7 * offset` days.
    Week { offset: i64 },
    /// Sunday-to-Saturday grid covering the month containing `anchor`.
    Month { anchor: NaiveDate },
}

/// One day's worth of events, sorted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Month view only: this day pads the grid and belongs to an
    /// adjacent month. Always false for timeline and week views.
    pub outside_current_month: bool,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub buckets: Vec<DayBucket>,
}

impl Projection {
    pub fn bucket_for(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.buckets.iter().find(|b| b.date == date)
    }
}

/// Project the selected calendars' events into the requested view.
///
/// `today` is injected so callers (and tests) control the reference day.
/// Events without a color of their own leave here carrying the owning
/// calendar's color, so renderers never have to join against the
/// registry. A malformed individual event can at worst sort oddly; it
/// never makes projection fail. Errors mean the view parameters
/// themselves are unusable (e.g. a week offset past the calendar's
/// representable range).
pub fn project(
    snapshot: &Snapshot,
    selection: &BTreeSet<String>,
    view: View,
    today: NaiveDate,
) -> Result<Projection, ProjectionError> {
    let (start, days, anchor_month) = view_range(view, today)?;

    let visible: Vec<&Event> = snapshot
        .events()
        .filter(|e| selection.contains(&e.calendar_id))
        .collect();

    let mut buckets = Vec::with_capacity(days as usize);
    for i in 0..days {
        let date = start
            .checked_add_signed(Duration::days(i))
            .ok_or_else(|| invalid("view range exceeds representable dates"))?;

        let mut events: Vec<Event> = visible
            .iter()
            .filter(|e| e.occupies(date))
            .map(|e| with_calendar_color((*e).clone(), snapshot))
            .collect();
        sort_bucket(&mut events);

        buckets.push(DayBucket {
            date,
            outside_current_month: anchor_month
                .is_some_and(|(y, m)| date.year() != y || date.month() != m),
            events,
        });
    }

    Ok(Projection { buckets })
}

/// Resolve a view to (first day, bucket count, anchor month for padding
/// flags).
fn view_range(
    view: View,
    today: NaiveDate,
) -> Result<(NaiveDate, i64, Option<(i32, u32)>), ProjectionError> {
    match view {
        View::Timeline => Ok((today, TIMELINE_DAYS, None)),
        View::Week { offset } => {
            let shifted = offset
                .checked_mul(7)
                .and_then(Duration::try_days)
                .and_then(|d| today.checked_add_signed(d))
                .ok_or_else(|| invalid(&format!("week offset {offset} out of range")))?;
            Ok((week_start(shifted), 7, None))
        }
        View::Month { anchor } => {
            let first = anchor
                .with_day(1)
                .ok_or_else(|| invalid("anchor has no first of month"))?;
            let last = last_day_of_month(first)?;
            let grid_start = week_start(first);
            // Pad forward to the Saturday closing the trailing week.
            let grid_end = last + Duration::days(6 - days_from_sunday(last));
            let days = (grid_end - grid_start).num_days() + 1;
            debug_assert_eq!(days % 7, 0);
            Ok((grid_start, days, Some((first.year(), first.month()))))
        }
    }
}

/// The Sunday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(days_from_sunday(date))
}

fn days_from_sunday(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

fn last_day_of_month(first: NaiveDate) -> Result<NaiveDate, ProjectionError> {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_month
        .map(|d| d - Duration::days(1))
        .ok_or_else(|| invalid("anchor month out of range"))
}

fn invalid(msg: &str) -> ProjectionError {
    ProjectionError::InvalidViewParameters(msg.to_string())
}

/// Fill in the owning calendar's color for events that have none of
/// their own. Orphaned calendars (no config) fall back to their
/// source's default color, matching the registry.
fn with_calendar_color(mut event: Event, snapshot: &Snapshot) -> Event {
    if event.color.is_none() {
        let color = snapshot
            .calendars
            .get(&event.calendar_id)
            .map(|c| c.color.clone())
            .unwrap_or_else(|| event.source.default_color().to_string());
        event.color = Some(color);
    }
    event
}

/// Within-day ordering, identical across all views:
/// multi-day < all-day < timed; timed ascending by start; ties broken by
/// case-insensitive title. Total and panic-free, so one odd event can
/// never take down a projection.
fn sort_bucket(events: &mut [Event]) {
    events.sort_by(|a, b| {
        kind_rank(a)
            .cmp(&kind_rank(b))
            .then_with(|| match (a.start_time(), b.start_time()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn kind_rank(event: &Event) -> u8 {
    use crate::event::TimeSpec::*;
    match event.time_spec {
        MultiDay { .. } => 0,
        AllDay => 1,
        Timed { .. } => 2,
    }
}
