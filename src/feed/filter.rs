use crate::events_portal::model::Event;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::trace;

/// Hours an event stays listed after it ends.
pub const GRACE_PERIOD_HOURS: i64 = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const DEFAULT_START_TIME: &str = "00:00";

// Feed dates carry no offset; they're read as UTC wall-clock times.

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time.trim(), format).ok())
}

pub fn start_instant(event: &Event) -> Option<NaiveDateTime> {
    let date = parse_date(event.start_date.as_deref()?)?;
    let time = parse_time(event.start_time.as_deref().unwrap_or(DEFAULT_START_TIME))?;

    Some(date.and_time(time))
}

/// Last second of the end date, or the start when there's no end date.
fn effective_end(event: &Event) -> Option<NaiveDateTime> {
    let start = start_instant(event)?;

    match event.end_date.as_deref() {
        Some(end_date) => parse_date(end_date)?.and_hms_opt(23, 59, 59),
        None => Some(start),
    }
}

pub fn is_eligible(event: &Event, now: DateTime<Utc>) -> bool {
    if !event.is_live() {
        return false;
    }

    match effective_end(event) {
        Some(end) => end + Duration::hours(GRACE_PERIOD_HOURS) >= now.naive_utc(),
        None => {
            trace!(
                start_date = ?event.start_date,
                end_date = ?event.end_date,
                "Excluding event without a valid schedule"
            );
            false
        }
    }
}

/// Keeps the events still worth showing, in their incoming order.
pub fn eligible_events(events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| is_eligible(event, now))
        .collect()
}

/// Ascending start, stable; undated events go last.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by_key(|event| {
        let start = start_instant(event);
        (start.is_none(), start)
    });
}

/// Location-agnostic view of the feed.
pub fn chronological_feed(events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
    let mut eligible = eligible_events(events, now);

    sort_chronologically(&mut eligible);
    eligible
}
