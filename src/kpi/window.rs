//! Rolling-window filters and the reductions behind the KPI cards.

use chrono::{DateTime, Duration, Utc};

use crate::model::Entry;
use crate::route::RouteMatcher;

/// Lookahead used for the average delay.
pub fn delay_horizon() -> Duration {
    Duration::minutes(60)
}

/// Look-back used for the cancellation rate.
pub fn cancel_horizon() -> Duration {
    Duration::minutes(180)
}

/// Entries with `now <= when <= now + horizon`.
pub fn upcoming<'a, I>(entries: I, now: DateTime<Utc>, horizon: Duration) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter(|e| e.when >= now && e.when - now <= horizon)
        .collect()
}

/// Entries with `now - horizon <= when <= now`.
pub fn trailing<'a, I>(entries: I, now: DateTime<Utc>, horizon: Duration) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter(|e| e.when <= now && now - e.when <= horizon)
        .collect()
}

/// Arithmetic mean; 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Mean delay in minutes, rounded up.
pub fn average_delay_minutes(entries: &[&Entry]) -> u32 {
    let delays: Vec<f64> = entries.iter().map(|e| e.delay_seconds as f64).collect();
    (mean(&delays) / 60.0).ceil() as u32
}

/// Share of canceled entries, rounded to the nearest percent.
pub fn cancel_percent(entries: &[&Entry]) -> u32 {
    let canceled = entries.iter().filter(|e| e.canceled).count();
    pct(canceled, entries.len()).round() as u32
}

/// Average delay over route-relevant entries in the next hour.
pub fn next_hour_delay(entries: &[Entry], matcher: &RouteMatcher, now: DateTime<Utc>) -> u32 {
    let relevant = entries.iter().filter(|e| matcher.matches(&e.counterpart_station));
    average_delay_minutes(&upcoming(relevant, now, delay_horizon()))
}

/// Cancellation rate over route-relevant entries in the last three hours.
pub fn trailing_cancel_percent(
    entries: &[Entry],
    matcher: &RouteMatcher,
    now: DateTime<Utc>,
) -> u32 {
    let relevant = entries.iter().filter(|e| matcher.matches(&e.counterpart_station));
    cancel_percent(&trailing(relevant, now, cancel_horizon()))
}
