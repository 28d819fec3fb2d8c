//! Next-two-hours train listing for the reference station.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cycle::Cycles;
use crate::fetch::{FetchError, HttpClient};
use crate::kpi::window::upcoming;
use crate::liveboard::Liveboard;
use crate::model::{Direction, Entry};
use crate::route::RouteMatcher;

/// How far ahead the list looks.
pub fn list_horizon() -> Duration {
    Duration::minutes(120)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFilter {
    #[default]
    All,
    Departure,
    Arrival,
}

impl DirectionFilter {
    pub fn accepts(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::All => true,
            DirectionFilter::Departure => direction == Direction::Departure,
            DirectionFilter::Arrival => direction == Direction::Arrival,
        }
    }
}

/// Display-time filtering; never triggers a refetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainListView {
    pub include_bus: bool,
    pub filter: DirectionFilter,
}

impl TrainListView {
    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries
            .iter()
            .filter(|e| self.include_bus || !e.is_bus_substitution)
            .filter(|e| self.filter.accepts(e.direction))
            .collect()
    }
}

/// Badge shown next to each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Cancelled,
    Delayed { minutes: u32 },
    OnTime,
}

impl Status {
    pub fn of(entry: &Entry) -> Self {
        if entry.canceled {
            Status::Cancelled
        } else if entry.delay_seconds > 0 {
            Status::Delayed {
                minutes: (entry.delay_seconds as f64 / 60.0).round() as u32,
            }
        } else {
            Status::OnTime
        }
    }
}

/// Route-relevant entries in the next two hours, sorted by time.
pub fn upcoming_trains(entries: &[Entry], matcher: &RouteMatcher, now: DateTime<Utc>) -> Vec<Entry> {
    let relevant = entries.iter().filter(|e| matcher.matches(&e.counterpart_station));
    let mut list: Vec<Entry> = upcoming(relevant, now, list_horizon())
        .into_iter()
        .cloned()
        .collect();
    list.sort_by_key(|e| e.when);
    list
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainListState {
    pub loading: bool,
    pub entries: Vec<Entry>,
}

impl Default for TrainListState {
    fn default() -> Self {
        Self {
            loading: true,
            entries: Vec::new(),
        }
    }
}

pub struct TrainList<C> {
    board: Arc<Liveboard<C>>,
    station: RwLock<String>,
    matcher: RouteMatcher,
    state: watch::Sender<TrainListState>,
    cycles: Cycles,
}

impl<C: HttpClient> TrainList<C> {
    pub fn new(board: Arc<Liveboard<C>>, station: impl Into<String>, matcher: RouteMatcher) -> Self {
        let (state, _) = watch::channel(TrainListState::default());
        Self {
            board,
            station: RwLock::new(station.into()),
            matcher,
            state,
            cycles: Cycles::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrainListState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TrainListState {
        self.state.borrow().clone()
    }

    pub fn station(&self) -> String {
        self.station
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switches to `station` and reloads under `parent`. The previous
    /// station's entries are cleared since they no longer apply.
    pub async fn set_station(
        &self,
        station: impl Into<String>,
        parent: &CancellationToken,
    ) -> Option<TrainListState> {
        self.set_station_at(station, Utc::now(), parent).await
    }

    pub async fn set_station_at(
        &self,
        station: impl Into<String>,
        now: DateTime<Utc>,
        parent: &CancellationToken,
    ) -> Option<TrainListState> {
        let station = station.into();
        {
            let mut current = self.station.write().unwrap_or_else(PoisonError::into_inner);
            if *current == station {
                return None;
            }
            *current = station;
        }
        self.state.send_replace(TrainListState::default());
        Some(self.refresh_at(now, parent).await)
    }

    /// Loads the list anchored at `now`. Same publishing rules as the KPI
    /// aggregator: a superseded pass publishes nothing, cancellation leaves
    /// the state as it was, a failure keeps the last entries and clears
    /// `loading`.
    #[tracing::instrument(skip(self, cancel), fields(station = %self.station()))]
    pub async fn refresh_at(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> TrainListState {
        let cycle = self.cycles.begin(cancel);
        let station = self.station();
        let previous_loading = self.state.borrow().loading;
        self.state.send_modify(|s| s.loading = true);

        let result = self.board.fetch_both_at(&station, now, &cycle.token).await;
        if !self.cycles.is_current(&cycle) {
            debug!("Train list pass superseded");
            return self.state();
        }

        match result {
            Ok(entries) => {
                let entries = upcoming_trains(&entries, &self.matcher, now);
                info!(trains = entries.len(), "Train list refreshed");
                self.state.send_replace(TrainListState {
                    loading: false,
                    entries,
                });
            }
            Err(FetchError::Cancelled) => {
                debug!("Train list refresh cancelled");
                self.state.send_if_modified(|s| {
                    let modified = s.loading != previous_loading;
                    s.loading = previous_loading;
                    modified
                });
            }
            Err(e) => {
                error!(error = %e, "Train list refresh failed");
                self.state.send_modify(|s| s.loading = false);
            }
        }

        self.state()
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> TrainListState {
        self.refresh_at(Utc::now(), cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()
    }

    fn entry(offset_min: i64, direction: Direction, station: &str, bus: bool) -> Entry {
        Entry {
            when: now() + Duration::minutes(offset_min),
            direction,
            counterpart_station: station.to_string(),
            platform: Some("2".to_string()),
            delay_seconds: 0,
            canceled: false,
            short_label: "IC 1".to_string(),
            is_bus_substitution: bus,
        }
    }

    #[test]
    fn test_upcoming_trains_filters_and_sorts() {
        let entries = vec![
            entry(90, Direction::Arrival, "Charleroi-Sud", false),
            entry(10, Direction::Departure, "Bruxelles-Midi", false),
            entry(130, Direction::Departure, "Bruxelles-Midi", false),
            entry(-5, Direction::Departure, "Bruxelles-Midi", false),
            entry(20, Direction::Departure, "Namur", false),
        ];

        let list = upcoming_trains(&entries, &RouteMatcher::default(), now());

        let offsets: Vec<i64> = list.iter().map(|e| (e.when - now()).num_minutes()).collect();
        assert_eq!(offsets, vec![10, 90]);
    }

    #[test]
    fn test_view_hides_buses_by_default() {
        let entries = vec![
            entry(10, Direction::Departure, "Bruxelles-Midi", true),
            entry(20, Direction::Arrival, "Bruxelles-Midi", false),
        ];

        assert_eq!(TrainListView::default().apply(&entries).len(), 1);

        let with_bus = TrainListView {
            include_bus: true,
            ..Default::default()
        };
        assert_eq!(with_bus.apply(&entries).len(), 2);

        let departures = TrainListView {
            include_bus: true,
            filter: DirectionFilter::Departure,
        };
        let shown = departures.apply(&entries);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].direction, Direction::Departure);
    }

    #[test]
    fn test_status_badge() {
        let mut e = entry(10, Direction::Departure, "Bruxelles-Midi", false);
        assert_eq!(Status::of(&e), Status::OnTime);

        e.delay_seconds = 150;
        assert_eq!(Status::of(&e), Status::Delayed { minutes: 3 });

        e.delay_seconds = 20;
        assert_eq!(Status::of(&e), Status::Delayed { minutes: 0 });

        e.canceled = true;
        assert_eq!(Status::of(&e), Status::Cancelled);
    }
}
