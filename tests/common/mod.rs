#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use train_dashboard::fetch::HttpClient;

/// 08:00 in Brussels.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 9, 7, 0, 0).unwrap()
}

pub fn movement(offset_min: i64, station: &str, vehicle: &str, delay: u32, canceled: bool) -> Value {
    let when = reference_now() + Duration::minutes(offset_min);
    json!({
        "id": "0",
        "delay": delay.to_string(),
        "station": station,
        "time": when.timestamp().to_string(),
        "vehicle": format!("BE.NMBS.{vehicle}"),
        "platform": "1",
        "canceled": if canceled { "1" } else { "0" },
        "left": "0",
    })
}

pub fn departures(records: Vec<Value>) -> String {
    json!({ "departures": { "number": records.len().to_string(), "departure": records } })
        .to_string()
}

pub fn arrivals(records: Vec<Value>) -> String {
    json!({ "arrivals": { "number": records.len().to_string(), "arrival": records } }).to_string()
}

/// Serves canned live-board bodies keyed by `(station, arrdep, time)`.
/// Bodies registered without a station answer for every station.
pub struct MockBoard {
    responses: HashMap<(String, String, String), String>,
    status: AtomicU16,
    hang_all: AtomicBool,
    hang_for: Mutex<HashSet<String>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<HashMap<String, String>>>,
}

const ANY_STATION: &str = "*";

impl MockBoard {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            status: AtomicU16::new(StatusCode::OK.as_u16()),
            hang_all: AtomicBool::new(false),
            hang_for: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(self, arrdep: &str, time: &str, body: String) -> Self {
        self.with_station(ANY_STATION, arrdep, time, body)
    }

    pub fn with_station(mut self, station: &str, arrdep: &str, time: &str, body: String) -> Self {
        self.responses.insert(
            (station.to_string(), arrdep.to_string(), time.to_string()),
            body,
        );
        self
    }

    pub fn with_status(self, status: StatusCode) -> Self {
        self.fail_with(status);
        self
    }

    /// Answers every later request with `status`.
    pub fn fail_with(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::SeqCst);
    }

    /// Makes every later request wait forever.
    pub fn hang(&self) {
        self.hang_all.store(true, Ordering::SeqCst);
    }

    /// Makes later requests for `station` wait forever.
    pub fn hang_station(&self, station: &str) {
        self.hang_for.lock().unwrap().insert(station.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<HashMap<String, String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockBoard {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let params: HashMap<String, String> = req.url().query_pairs().into_owned().collect();
        let param = |name: &str| params.get(name).cloned().unwrap_or_default();
        let (station, arrdep, time) = (param("station"), param("arrdep"), param("time"));
        self.seen.lock().unwrap().push(params.clone());

        let hangs = self.hang_all.load(Ordering::SeqCst)
            || self.hang_for.lock().unwrap().contains(&station);
        if hangs {
            std::future::pending::<()>().await;
        }

        let body = self
            .responses
            .get(&(station, arrdep.clone(), time.clone()))
            .or_else(|| self.responses.get(&(ANY_STATION.to_string(), arrdep, time)))
            .cloned()
            .unwrap_or_else(|| "{}".to_string());
        let status = StatusCode::from_u16(self.status.load(Ordering::SeqCst)).unwrap();
        let resp = http::Response::builder().status(status).body(body).unwrap();
        Ok(resp.into())
    }
}
