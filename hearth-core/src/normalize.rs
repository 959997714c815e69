//! Normalization of raw per-source records into canonical [`Event`]s.
//!
//! The wire parsers (ICS text, Notion pages, Google Calendar REST, local
//! entry forms) live outside the core; they hand over unvalidated
//! [`RawRecord`]s. Everything temporal is classified here, once, from
//! structured fields. A textual span hint ("(3 days)") exists as a
//! last-resort fallback for local records that carry no structured end
//! date; it is deliberately isolated in [`span_hint_from_text`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;
use crate::event::{Event, Source, TimeSpec};

/// A raw record as produced by one of the external fetch collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RawRecord {
    ICal(RawICalEvent),
    Notion(RawNotionPage),
    Google(RawGoogleEvent),
    Local(RawLocalEvent),
    /// Placeholder a collaborator hands over for a record it could not
    /// retrieve (transport or auth failure scoped to that record).
    Unavailable(RawUnavailable),
}

impl RawRecord {
    pub fn source(&self) -> Source {
        match self {
            RawRecord::ICal(_) => Source::ICal,
            RawRecord::Notion(_) => Source::Notion,
            RawRecord::Google(_) => Source::Google,
            RawRecord::Local(_) => Source::Local,
            RawRecord::Unavailable(u) => u.origin,
        }
    }
}

/// A record-shaped fetch failure. Normalizing it always yields
/// [`NormalizeError::SourceUnavailable`], so batch normalization counts
/// it like any other dropped record.
///
/// The field is `origin` rather than `source` because the latter is the
/// [`RawRecord`] serde tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUnavailable {
    pub origin: Source,
    pub reason: String,
}

/// DTSTART/DTEND value from an ICS feed: date for all-day events,
/// datetime otherwise. The ICS parser has already decoded the text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IcsTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawICalEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub start: Option<IcsTime>,
    /// DTEND. Exclusive for date values, per RFC 5545.
    pub end: Option<IcsTime>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// A page from a Notion calendar database, reduced to its event-relevant
/// properties. Date values stay as the ISO strings Notion returns
/// (`2026-03-09` or `2026-03-09T14:00:00.000+01:00`); `date_end` is
/// inclusive, per Notion's date property semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotionPage {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// `start`/`end` of a Google Calendar API event: exactly one of the two
/// fields is set (`date` for all-day events, exclusive end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGoogleEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub start: Option<GoogleTime>,
    pub end: Option<GoogleTime>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// A locally entered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLocalEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    /// `HH:MM` wall-clock strings as entered.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Inclusive end date for multi-day entries.
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Free-text duration label, e.g. "Reunion (3 days)". Only consulted
    /// when no structured end date exists.
    pub duration_text: Option<String>,
}

/// Convert one raw record into a canonical event.
///
/// Pure and idempotent: the same record always yields the same event,
/// including its id (records without a source uid get a deterministic id
/// derived from date and title).
pub fn normalize(raw: &RawRecord, calendar_id: &str) -> Result<Event, NormalizeError> {
    match raw {
        RawRecord::ICal(e) => normalize_ical(e, calendar_id),
        RawRecord::Notion(p) => normalize_notion(p, calendar_id),
        RawRecord::Google(e) => normalize_google(e, calendar_id),
        RawRecord::Local(e) => normalize_local(e, calendar_id),
        RawRecord::Unavailable(u) => Err(NormalizeError::SourceUnavailable(u.reason.clone())),
    }
}

/// Outcome of normalizing a whole fetch result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Records dropped because they failed to normalize.
    pub dropped: usize,
    /// Reasons from records the collaborator could not retrieve at all.
    /// A subset of `dropped`.
    pub unavailable: Vec<String>,
}

/// Normalize every record of a fetch, dropping and counting failures.
///
/// A single malformed upstream item must never fail the whole calendar.
pub fn normalize_batch(
    records: &[RawRecord],
    calendar_id: &str,
) -> (Vec<Event>, NormalizeStats) {
    let mut events = Vec::with_capacity(records.len());
    let mut stats = NormalizeStats::default();

    for record in records {
        match normalize(record, calendar_id) {
            Ok(event) => events.push(event),
            Err(err) => {
                stats.dropped += 1;
                if let NormalizeError::SourceUnavailable(reason) = &err {
                    stats.unavailable.push(reason.clone());
                }
                tracing::warn!(calendar_id, %err, "dropping record that failed to normalize");
            }
        }
    }

    (events, stats)
}

fn normalize_ical(raw: &RawICalEvent, calendar_id: &str) -> Result<Event, NormalizeError> {
    let title = required(&raw.summary, "summary")?;
    let start = raw
        .start
        .ok_or(NormalizeError::MissingRequiredField("dtstart"))?;

    let (date, time_spec) = classify_exclusive(start, raw.end)?;

    Ok(Event {
        id: stable_id(&raw.uid, date, &title),
        calendar_id: calendar_id.to_string(),
        title,
        date,
        time_spec,
        location: raw.location.clone(),
        description: raw.description.clone(),
        color: None,
        source: Source::ICal,
    })
}

fn normalize_google(raw: &RawGoogleEvent, calendar_id: &str) -> Result<Event, NormalizeError> {
    let title = required(&raw.summary, "summary")?;
    let start = raw
        .start
        .as_ref()
        .ok_or(NormalizeError::MissingRequiredField("start"))
        .and_then(parse_google_time)?;
    let end = raw.end.as_ref().map(parse_google_time).transpose()?;

    let (date, time_spec) = classify_exclusive(start, end)?;

    Ok(Event {
        id: stable_id(&raw.id, date, &title),
        calendar_id: calendar_id.to_string(),
        title,
        date,
        time_spec,
        location: raw.location.clone(),
        description: raw.description.clone(),
        color: None,
        source: Source::Google,
    })
}

fn normalize_notion(raw: &RawNotionPage, calendar_id: &str) -> Result<Event, NormalizeError> {
    let title = required(&raw.title, "title")?;
    let start = raw
        .date_start
        .as_deref()
        .ok_or(NormalizeError::MissingRequiredField("date"))
        .and_then(parse_notion_time)?;
    let end = raw.date_end.as_deref().map(parse_notion_time).transpose()?;

    let (date, start_time) = start;
    let time_spec = match end {
        // Notion date ranges are inclusive on both ends.
        Some((end_date, _)) if end_date > date => {
            let span = (end_date - date).num_days() + 1;
            TimeSpec::MultiDay {
                span_days: checked_span(span)?,
            }
        }
        Some((end_date, _)) if end_date < date => {
            return Err(NormalizeError::MalformedTimeSpec(format!(
                "end date {end_date} before start date {date}"
            )));
        }
        _ => match start_time {
            Some(start) => TimeSpec::Timed {
                start,
                end: end.and_then(|(_, t)| t),
            },
            None => TimeSpec::AllDay,
        },
    };

    Ok(Event {
        id: stable_id(&raw.id, date, &title),
        calendar_id: calendar_id.to_string(),
        title,
        date,
        time_spec,
        location: raw.location.clone(),
        description: raw.description.clone(),
        color: None,
        source: Source::Notion,
    })
}

fn normalize_local(raw: &RawLocalEvent, calendar_id: &str) -> Result<Event, NormalizeError> {
    let title = required(&raw.title, "title")?;
    let date = raw.date.ok_or(NormalizeError::MissingRequiredField("date"))?;

    let time_spec = if let Some(end_date) = raw.end_date {
        if end_date < date {
            return Err(NormalizeError::MalformedTimeSpec(format!(
                "end date {end_date} before start date {date}"
            )));
        }
        let span = (end_date - date).num_days() + 1;
        if span >= 2 {
            TimeSpec::MultiDay {
                span_days: checked_span(span)?,
            }
        } else {
            local_single_day(raw)?
        }
    } else if let Some(span) = raw.duration_text.as_deref().and_then(span_hint_from_text) {
        // Low-confidence textual fallback; only reached when the entry
        // carries no structured end date.
        TimeSpec::MultiDay { span_days: span }
    } else {
        local_single_day(raw)?
    };

    Ok(Event {
        id: stable_id(&raw.id, date, &title),
        calendar_id: calendar_id.to_string(),
        title,
        date,
        time_spec,
        location: raw.location.clone(),
        description: raw.description.clone(),
        color: raw.color.clone(),
        source: Source::Local,
    })
}

fn local_single_day(raw: &RawLocalEvent) -> Result<TimeSpec, NormalizeError> {
    match raw.start_time.as_deref() {
        Some(s) => {
            let start = parse_wall_time(s)?;
            let end = raw
                .end_time
                .as_deref()
                .map(parse_wall_time)
                .transpose()?;
            Ok(TimeSpec::Timed { start, end })
        }
        None => Ok(TimeSpec::AllDay),
    }
}

/// Classify a start/end pair where a date-valued end is exclusive
/// (ICS DTEND and Google's all-day `end.date` both work this way).
fn classify_exclusive(
    start: IcsTime,
    end: Option<IcsTime>,
) -> Result<(NaiveDate, TimeSpec), NormalizeError> {
    match (start, end) {
        (IcsTime::Date(d), None) => Ok((d, TimeSpec::AllDay)),
        (IcsTime::Date(d), Some(IcsTime::Date(e))) => {
            let span = (e - d).num_days();
            if span < 0 {
                Err(NormalizeError::MalformedTimeSpec(format!(
                    "end date {e} before start date {d}"
                )))
            } else if span >= 2 {
                Ok((
                    d,
                    TimeSpec::MultiDay {
                        span_days: checked_span(span)?,
                    },
                ))
            } else {
                // span 0 or 1: one whole day either way.
                Ok((d, TimeSpec::AllDay))
            }
        }
        (IcsTime::DateTime(s), None) => Ok((
            s.date(),
            TimeSpec::Timed {
                start: s.time(),
                end: None,
            },
        )),
        (IcsTime::DateTime(s), Some(IcsTime::DateTime(e))) => {
            if e < s {
                return Err(NormalizeError::MalformedTimeSpec(format!(
                    "end {e} before start {s}"
                )));
            }
            // An end at exactly midnight belongs to the previous day.
            let end_day = if e.time() == NaiveTime::MIN {
                e.date().pred_opt().unwrap_or(e.date())
            } else {
                e.date()
            };
            if end_day > s.date() {
                let span = (end_day - s.date()).num_days() + 1;
                Ok((
                    s.date(),
                    TimeSpec::MultiDay {
                        span_days: checked_span(span)?,
                    },
                ))
            } else {
                let end = if e.date() == s.date() {
                    Some(e.time())
                } else {
                    None
                };
                Ok((
                    s.date(),
                    TimeSpec::Timed {
                        start: s.time(),
                        end,
                    },
                ))
            }
        }
        (s, Some(e)) => Err(NormalizeError::MalformedTimeSpec(format!(
            "mixed date/datetime pair: {s:?} / {e:?}"
        ))),
    }
}

fn parse_google_time(t: &GoogleTime) -> Result<IcsTime, NormalizeError> {
    if let Some(date) = t.date.as_deref() {
        let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            NormalizeError::MalformedTimeSpec(format!("unparsable date '{date}'"))
        })?;
        return Ok(IcsTime::Date(d));
    }
    if let Some(dt) = t.date_time.as_deref() {
        let parsed = DateTime::parse_from_rfc3339(dt).map_err(|_| {
            NormalizeError::MalformedTimeSpec(format!("unparsable datetime '{dt}'"))
        })?;
        return Ok(IcsTime::DateTime(parsed.naive_local()));
    }
    Err(NormalizeError::MalformedTimeSpec(
        "neither date nor dateTime set".into(),
    ))
}

/// Parse a Notion date property value into a day and an optional time.
fn parse_notion_time(s: &str) -> Result<(NaiveDate, Option<NaiveTime>), NormalizeError> {
    if s.contains('T') {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|_| {
                NormalizeError::MalformedTimeSpec(format!("unparsable datetime '{s}'"))
            })?;
        Ok((parsed.date(), Some(parsed.time())))
    } else {
        let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            NormalizeError::MalformedTimeSpec(format!("unparsable date '{s}'"))
        })?;
        Ok((d, None))
    }
}

fn parse_wall_time(s: &str) -> Result<NaiveTime, NormalizeError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| NormalizeError::MalformedTimeSpec(format!("unparsable time '{s}'")))
}

/// Plausibility bound for spans computed from structured end dates.
/// Ten years; longer spans are treated as feed corruption.
const MAX_SPAN_DAYS: i64 = 3653;

/// Textual span hints are low confidence and capped much tighter.
const MAX_TEXT_HINT_DAYS: u32 = 366;

fn checked_span(span: i64) -> Result<u32, NormalizeError> {
    if (2..=MAX_SPAN_DAYS).contains(&span) {
        Ok(span as u32)
    } else {
        Err(NormalizeError::MalformedTimeSpec(format!(
            "implausible span of {span} days"
        )))
    }
}

fn required(field: &Option<String>, name: &'static str) -> Result<String, NormalizeError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(NormalizeError::MissingRequiredField(name))
}

/// Extract an "(N days)" span hint from a display string.
///
/// Last-resort path for sources with no structured duration. Returns
/// `None` unless the text unambiguously names a span of 2+ days.
pub fn span_hint_from_text(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let idx = lower.find(" day")?;
    let digits: String = lower[..idx]
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let span: u32 = digits.parse().ok()?;
    (2..=MAX_TEXT_HINT_DAYS).contains(&span).then_some(span)
}

/// Deterministic fallback id for records without a source uid.
fn stable_id(uid: &Option<String>, date: NaiveDate, title: &str) -> String {
    match uid.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(uid) => uid.to_string(),
        None => format!("{}__{}", date.format("%Y-%m-%d"), slugify(title)),
    }
}

fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn ical(summary: &str, start: IcsTime, end: Option<IcsTime>) -> RawRecord {
        RawRecord::ICal(RawICalEvent {
            uid: Some(format!("uid-{summary}")),
            summary: Some(summary.into()),
            start: Some(start),
            end,
            location: None,
            description: None,
        })
    }

    #[test]
    fn timed_ical_event_keeps_start_and_end_times() {
        let raw = ical(
            "Standup",
            IcsTime::DateTime(dt(2026, 3, 9, 9, 30)),
            Some(IcsTime::DateTime(dt(2026, 3, 9, 9, 45))),
        );
        let event = normalize(&raw, "ical-x").unwrap();

        assert_eq!(event.date, date(2026, 3, 9));
        assert_eq!(
            event.time_spec,
            TimeSpec::Timed {
                start: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                end: Some(NaiveTime::from_hms_opt(9, 45, 0).unwrap()),
            }
        );
    }

    #[test]
    fn ical_date_pair_with_exclusive_end_is_all_day() {
        // DTSTART;VALUE=DATE:20260309 / DTEND;VALUE=DATE:20260310
        let raw = ical(
            "Holiday",
            IcsTime::Date(date(2026, 3, 9)),
            Some(IcsTime::Date(date(2026, 3, 10))),
        );
        let event = normalize(&raw, "ical-x").unwrap();
        assert_eq!(event.time_spec, TimeSpec::AllDay);
    }

    #[test]
    fn ical_date_pair_spanning_days_is_multi_day() {
        // Exclusive DTEND: 9th..12th covers three days.
        let raw = ical(
            "Trip",
            IcsTime::Date(date(2026, 3, 9)),
            Some(IcsTime::Date(date(2026, 3, 12))),
        );
        let event = normalize(&raw, "ical-x").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 3 });
    }

    #[test]
    fn structured_span_longer_than_a_year_is_accepted() {
        // A 400-day sabbatical with real start/end dates is not corruption.
        let raw = ical(
            "Sabbatical",
            IcsTime::Date(date(2026, 3, 9)),
            Some(IcsTime::Date(date(2027, 4, 13))),
        );
        let event = normalize(&raw, "ical-x").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 400 });
    }

    #[test]
    fn ical_datetime_pair_crossing_days_is_multi_day() {
        let raw = ical(
            "Festival",
            IcsTime::DateTime(dt(2026, 3, 9, 18, 0)),
            Some(IcsTime::DateTime(dt(2026, 3, 11, 2, 0))),
        );
        let event = normalize(&raw, "ical-x").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 3 });
    }

    #[test]
    fn ical_event_ending_at_midnight_stays_single_day() {
        let raw = ical(
            "Movie night",
            IcsTime::DateTime(dt(2026, 3, 9, 21, 0)),
            Some(IcsTime::DateTime(dt(2026, 3, 10, 0, 0))),
        );
        let event = normalize(&raw, "ical-x").unwrap();
        assert!(matches!(event.time_spec, TimeSpec::Timed { .. }));
        assert_eq!(event.date, date(2026, 3, 9));
    }

    #[test]
    fn missing_summary_is_dropped_not_defaulted() {
        let raw = RawRecord::ICal(RawICalEvent {
            uid: Some("u1".into()),
            summary: Some("   ".into()),
            start: Some(IcsTime::Date(date(2026, 3, 9))),
            end: None,
            location: None,
            description: None,
        });
        assert_eq!(
            normalize(&raw, "ical-x"),
            Err(NormalizeError::MissingRequiredField("summary"))
        );
    }

    #[test]
    fn end_before_start_is_malformed() {
        let raw = ical(
            "Backwards",
            IcsTime::DateTime(dt(2026, 3, 9, 12, 0)),
            Some(IcsTime::DateTime(dt(2026, 3, 8, 12, 0))),
        );
        assert!(matches!(
            normalize(&raw, "ical-x"),
            Err(NormalizeError::MalformedTimeSpec(_))
        ));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = ical(
            "Standup",
            IcsTime::DateTime(dt(2026, 3, 9, 9, 30)),
            Some(IcsTime::DateTime(dt(2026, 3, 9, 9, 45))),
        );
        assert_eq!(normalize(&raw, "ical-x").unwrap(), normalize(&raw, "ical-x").unwrap());
    }

    #[test]
    fn record_without_uid_gets_deterministic_id() {
        let raw = RawRecord::Local(RawLocalEvent {
            id: None,
            title: Some("Bake Sale!".into()),
            date: Some(date(2026, 4, 1)),
            start_time: None,
            end_time: None,
            end_date: None,
            location: None,
            description: None,
            color: None,
            duration_text: None,
        });
        let a = normalize(&raw, "local-home").unwrap();
        let b = normalize(&raw, "local-home").unwrap();
        assert_eq!(a.id, "2026-04-01__bake-sale");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn google_all_day_uses_exclusive_end_date() {
        let raw = RawRecord::Google(RawGoogleEvent {
            id: Some("g1".into()),
            summary: Some("Conference".into()),
            start: Some(GoogleTime {
                date: Some("2026-03-09".into()),
                date_time: None,
            }),
            end: Some(GoogleTime {
                date: Some("2026-03-11".into()),
                date_time: None,
            }),
            location: None,
            description: None,
        });
        let event = normalize(&raw, "google-acc").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 2 });
    }

    #[test]
    fn google_unparsable_datetime_is_malformed() {
        let raw = RawRecord::Google(RawGoogleEvent {
            id: Some("g2".into()),
            summary: Some("Broken".into()),
            start: Some(GoogleTime {
                date: None,
                date_time: Some("not-a-time".into()),
            }),
            end: None,
            location: None,
            description: None,
        });
        assert!(matches!(
            normalize(&raw, "google-acc"),
            Err(NormalizeError::MalformedTimeSpec(_))
        ));
    }

    #[test]
    fn notion_inclusive_date_range_is_multi_day() {
        let raw = RawRecord::Notion(RawNotionPage {
            id: Some("n1".into()),
            title: Some("Grandma visit".into()),
            date_start: Some("2026-03-09".into()),
            date_end: Some("2026-03-11".into()),
            location: None,
            description: None,
        });
        let event = normalize(&raw, "notion-db").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 3 });
    }

    #[test]
    fn notion_datetime_start_is_timed() {
        let raw = RawRecord::Notion(RawNotionPage {
            id: Some("n2".into()),
            title: Some("Dentist".into()),
            date_start: Some("2026-03-09T14:00:00+01:00".into()),
            date_end: None,
            location: None,
            description: None,
        });
        let event = normalize(&raw, "notion-db").unwrap();
        assert_eq!(
            event.time_spec,
            TimeSpec::Timed {
                start: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                end: None,
            }
        );
    }

    #[test]
    fn local_structured_end_date_beats_duration_text() {
        let raw = RawRecord::Local(RawLocalEvent {
            id: Some("l1".into()),
            title: Some("Camping".into()),
            date: Some(date(2026, 7, 3)),
            start_time: None,
            end_time: None,
            end_date: Some(date(2026, 7, 5)),
            location: None,
            description: None,
            color: None,
            duration_text: Some("Camping (9 days)".into()),
        });
        let event = normalize(&raw, "local-home").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 3 });
    }

    #[test]
    fn local_duration_text_is_last_resort_fallback() {
        let raw = RawRecord::Local(RawLocalEvent {
            id: Some("l2".into()),
            title: Some("School trip".into()),
            date: Some(date(2026, 5, 18)),
            start_time: None,
            end_time: None,
            end_date: None,
            location: None,
            description: None,
            color: None,
            duration_text: Some("School trip (3 days)".into()),
        });
        let event = normalize(&raw, "local-home").unwrap();
        assert_eq!(event.time_spec, TimeSpec::MultiDay { span_days: 3 });
    }

    #[test]
    fn span_hint_ignores_singular_and_garbage() {
        assert_eq!(span_hint_from_text("Trip (3 days)"), Some(3));
        assert_eq!(span_hint_from_text("10 days of fun"), Some(10));
        assert_eq!(span_hint_from_text("1 day"), None);
        assert_eq!(span_hint_from_text("some days"), None);
        assert_eq!(span_hint_from_text("no duration here"), None);
        // Free text is not trusted for spans past a year.
        assert_eq!(span_hint_from_text("Epic (400 days)"), None);
    }

    #[test]
    fn fetch_failure_record_drops_as_source_unavailable() {
        let raw = RawRecord::Unavailable(RawUnavailable {
            origin: Source::Google,
            reason: "401 from calendar API".into(),
        });
        assert_eq!(
            normalize(&raw, "google-acc"),
            Err(NormalizeError::SourceUnavailable(
                "401 from calendar API".into()
            ))
        );
    }

    #[test]
    fn batch_tracks_unavailable_records_separately() {
        let good = ical("Ok", IcsTime::Date(date(2026, 3, 9)), None);
        let gone = RawRecord::Unavailable(RawUnavailable {
            origin: Source::ICal,
            reason: "connection reset".into(),
        });

        let (events, stats) = normalize_batch(&[good, gone], "ical-x");
        assert_eq!(events.len(), 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.unavailable, vec!["connection reset".to_string()]);
    }

    #[test]
    fn batch_drops_and_counts_bad_records() {
        let good = ical("Ok", IcsTime::Date(date(2026, 3, 9)), None);
        let bad = RawRecord::ICal(RawICalEvent {
            uid: None,
            summary: None,
            start: Some(IcsTime::Date(date(2026, 3, 9))),
            end: None,
            location: None,
            description: None,
        });

        let (events, stats) = normalize_batch(&[good, bad], "ical-x");
        assert_eq!(events.len(), 1);
        assert_eq!(stats.dropped, 1);
    }
}
