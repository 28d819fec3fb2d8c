//! Live-board fetcher: two consecutive one-hour windows merged into a
//! two-hour lookahead.

mod normalize;
mod payload;
mod request;

pub use normalize::{dedup, is_bus_substitution, normalize, normalize_label, normalize_window};
pub use payload::{LiveboardPayload, Loose, RawMovement, VehicleInfo};
pub use request::liveboard_url;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fetch::{FetchError, HttpClient, TransportError, fetch_json};
use crate::model::{Direction, Entry};

pub const DEFAULT_ENDPOINT: &str = "https://api.irail.be/liveboard/";

/// Client for the live-board endpoint.
pub struct Liveboard<C> {
    client: C,
    endpoint: Url,
    lang: String,
}

impl<C: HttpClient> Liveboard<C> {
    pub fn new(client: C, endpoint: &str, lang: impl Into<String>) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TransportError::Endpoint(format!("{endpoint}: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            lang: lang.into(),
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// One underlying query: movements the provider lists for the hour
    /// starting at `at`, normalized and deduplicated.
    #[tracing::instrument(skip(self, cancel), fields(direction = %direction, at = %at))]
    pub async fn fetch_hour(
        &self,
        station: &str,
        direction: Direction,
        at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>, FetchError> {
        let url = liveboard_url(&self.endpoint, &self.lang, station, direction, at);
        let payload: LiveboardPayload = fetch_json(&self.client, url, cancel).await?;

        let records = payload.into_records(direction);
        let entries = normalize_window(&records, direction);

        debug!(
            records = records.len(),
            entries = entries.len(),
            "Live-board window normalized"
        );
        Ok(entries)
    }

    /// Two-hour lookahead from `at` (default: now), sorted by time.
    ///
    /// Both hourly queries run concurrently; the first failure or a
    /// cancellation aborts the other.
    pub async fn fetch_live_at(
        &self,
        station: &str,
        direction: Direction,
        at: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>, FetchError> {
        let at = at.unwrap_or_else(Utc::now);
        let next_hour = at + Duration::hours(1);

        let (mut current, next) = tokio::try_join!(
            self.fetch_hour(station, direction, at, cancel),
            self.fetch_hour(station, direction, next_hour, cancel),
        )?;

        current.extend(next);
        current.sort_by_key(|e| e.when);
        Ok(current)
    }

    /// Both directions' lookahead from `at`, departures first.
    pub async fn fetch_both_at(
        &self,
        station: &str,
        at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Entry>, FetchError> {
        let (mut departures, arrivals) = tokio::try_join!(
            self.fetch_live_at(station, Direction::Departure, Some(at), cancel),
            self.fetch_live_at(station, Direction::Arrival, Some(at), cancel),
        )?;
        departures.extend(arrivals);
        Ok(departures)
    }
}
