//! Indicator aggregation for the KPI cards.
//!
//! One pass fetches both directions at now, now-1h and now-2h, then reduces
//! the route-relevant entries into a [`KpiSnapshot`] published on a watch
//! channel.

pub mod window;

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cycle::Cycles;
use crate::fetch::{FetchError, HttpClient};
use crate::liveboard::Liveboard;
use crate::model::{Entry, KpiSnapshot};
use crate::route::RouteMatcher;

/// Entries fetched for one aggregation pass.
#[derive(Debug, Default)]
pub struct KpiSamples {
    /// Both directions anchored at now.
    pub current: Vec<Entry>,
    /// Both directions anchored at now-1h and now-2h.
    pub past: Vec<Entry>,
}

impl KpiSamples {
    /// Reduces the samples into published values.
    pub fn snapshot(&self, matcher: &RouteMatcher, now: DateTime<Utc>) -> KpiSnapshot {
        let recent: Vec<Entry> = self
            .current
            .iter()
            .chain(self.past.iter())
            .cloned()
            .collect();

        KpiSnapshot {
            loading: false,
            average_delay_minutes: window::next_hour_delay(&self.current, matcher, now),
            cancel_percent: window::trailing_cancel_percent(&recent, matcher, now),
        }
    }
}

pub struct KpiAggregator<C> {
    board: Arc<Liveboard<C>>,
    station: RwLock<String>,
    matcher: RouteMatcher,
    state: watch::Sender<KpiSnapshot>,
    cycles: Cycles,
}

impl<C: HttpClient> KpiAggregator<C> {
    pub fn new(board: Arc<Liveboard<C>>, station: impl Into<String>, matcher: RouteMatcher) -> Self {
        let (state, _) = watch::channel(KpiSnapshot::default());
        Self {
            board,
            station: RwLock::new(station.into()),
            matcher,
            state,
            cycles: Cycles::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<KpiSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> KpiSnapshot {
        *self.state.borrow()
    }

    pub fn station(&self) -> String {
        self.station
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switches to `station` and reruns the pass under `parent`, cancelling
    /// any pass still running for the previous station. Returns `None` when
    /// the station is unchanged.
    pub async fn set_station(
        &self,
        station: impl Into<String>,
        parent: &CancellationToken,
    ) -> Option<KpiSnapshot> {
        self.set_station_at(station, Utc::now(), parent).await
    }

    pub async fn set_station_at(
        &self,
        station: impl Into<String>,
        now: DateTime<Utc>,
        parent: &CancellationToken,
    ) -> Option<KpiSnapshot> {
        let station = station.into();
        {
            let mut current = self.station.write().unwrap_or_else(PoisonError::into_inner);
            if *current == station {
                return None;
            }
            info!(from = %current, to = %station, "Station changed");
            *current = station;
        }
        Some(self.refresh_at(now, parent).await)
    }

    /// Fetches the three anchors concurrently. The now pair serves both
    /// the next-hour average and the trailing window.
    pub async fn collect(
        &self,
        station: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<KpiSamples, FetchError> {
        let (current, minus_60, minus_120) = tokio::try_join!(
            self.board.fetch_both_at(station, now, cancel),
            self.board
                .fetch_both_at(station, now - Duration::minutes(60), cancel),
            self.board
                .fetch_both_at(station, now - Duration::minutes(120), cancel),
        )?;

        let mut past = minus_60;
        past.extend(minus_120);
        Ok(KpiSamples { current, past })
    }

    /// Runs one aggregation pass anchored at `now` and publishes the result.
    ///
    /// The pass runs under a child of `cancel` and supersedes any pass still
    /// in flight; a superseded pass publishes nothing. Cancellation restores
    /// the state seen before the pass. A transport failure clears `loading`
    /// and keeps the previous values.
    #[tracing::instrument(skip(self, cancel), fields(station = %self.station()))]
    pub async fn refresh_at(&self, now: DateTime<Utc>, cancel: &CancellationToken) -> KpiSnapshot {
        let cycle = self.cycles.begin(cancel);
        let station = self.station();
        let previous = self.state.send_replace(KpiSnapshot {
            loading: true,
            ..self.snapshot()
        });

        let result = self.collect(&station, now, &cycle.token).await;
        if !self.cycles.is_current(&cycle) {
            debug!("KPI pass superseded");
            return self.snapshot();
        }

        match result {
            Ok(samples) => {
                let snapshot = samples.snapshot(&self.matcher, now);
                info!(
                    average_delay_minutes = snapshot.average_delay_minutes,
                    cancel_percent = snapshot.cancel_percent,
                    "KPIs refreshed"
                );
                self.state.send_replace(snapshot);
            }
            Err(FetchError::Cancelled) => {
                debug!("KPI refresh cancelled");
                self.state.send_if_modified(|s| {
                    let modified = *s != previous;
                    *s = previous;
                    modified
                });
            }
            Err(e) => {
                error!(error = %e, "KPI refresh failed");
                self.state.send_modify(|s| s.loading = false);
            }
        }

        self.snapshot()
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> KpiSnapshot {
        self.refresh_at(Utc::now(), cancel).await
    }
}
