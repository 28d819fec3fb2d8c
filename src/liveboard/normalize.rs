//! Raw record to [`Entry`] conversion and per-window deduplication.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::payload::RawMovement;
use crate::model::{Direction, Entry};

static LABEL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)0*(\d+)").expect("valid label pattern"));
static BUS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^BUS\b").expect("valid bus label pattern"));
static BUS_VEHICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^BE\.NMBS\.BUS").expect("valid bus vehicle pattern"));

/// Vehicle label as the provider sent it: the `vehicleinfo.shortname` when
/// present, otherwise the last dotted segment of the vehicle code.
pub fn raw_short_label(record: &RawMovement) -> String {
    if let Some(short) = record.vehicleinfo.as_ref().and_then(|v| v.shortname.as_ref()) {
        return short.clone();
    }
    record
        .vehicle
        .as_deref()
        .and_then(|v| v.rsplit('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Uppercases and splits the leading letter run from its number, dropping
/// zero padding: `ic004` becomes `IC 4`.
pub fn normalize_label(raw: &str) -> String {
    LABEL_RUN
        .replace(&raw.to_uppercase(), "$1 $2")
        .into_owned()
}

pub fn is_bus_substitution(raw_label: &str, vehicle: &str) -> bool {
    BUS_LABEL.is_match(raw_label) || BUS_VEHICLE.is_match(vehicle)
}

/// Converts one provider record. Records without a usable timestamp have no
/// place on a timeline and are dropped.
pub fn normalize(record: &RawMovement, direction: Direction) -> Option<Entry> {
    let Some(when) = record
        .time
        .as_ref()
        .and_then(|t| t.as_i64())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    else {
        debug!(station = ?record.station, "Skipping record without a valid time");
        return None;
    };

    let raw_label = raw_short_label(record);
    let vehicle = record.vehicle.as_deref().unwrap_or_default();

    let delay_seconds = record
        .delay
        .as_ref()
        .and_then(|d| d.as_i64())
        .map(|d| d.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0);

    let platform = record
        .platform
        .as_ref()
        .map(|p| p.as_text())
        .filter(|p| !p.is_empty());

    Some(Entry {
        when,
        direction,
        counterpart_station: record.station.clone().unwrap_or_default(),
        platform,
        delay_seconds,
        canceled: record.canceled.as_ref().is_some_and(|c| c.is_set()),
        short_label: normalize_label(&raw_label),
        is_bus_substitution: is_bus_substitution(&raw_label, vehicle),
    })
}

/// Collapses entries sharing `(short_label, when)`; the first occurrence
/// wins and input order is otherwise preserved.
pub fn dedup(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert((e.short_label.clone(), e.when)))
        .collect()
}

/// Normalizes and deduplicates one window's worth of records.
pub fn normalize_window(records: &[RawMovement], direction: Direction) -> Vec<Entry> {
    dedup(
        records
            .iter()
            .filter_map(|r| normalize(r, direction))
            .collect(),
    )
}
