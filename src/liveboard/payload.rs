//! Wire shape of the live-board response.
//!
//! The provider encodes most scalars as strings and omits fields freely, so
//! every field is optional and loosely typed. Normalization decides the
//! defaults.

use serde::Deserialize;

use crate::model::Direction;

/// A scalar the provider may send as a string, a number or a boolean.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Loose {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Loose::Text(s) => s.trim().parse().ok(),
            Loose::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Loose::Flag(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Loose::Text(s) => s.clone(),
            Loose::Number(n) => n.to_string(),
            Loose::Flag(b) => b.to_string(),
        }
    }

    /// The provider flags booleans as `"1"` / `"0"`. Only a value that reads
    /// as `1` counts; a JSON `true` does not.
    pub fn is_set(&self) -> bool {
        match self {
            Loose::Text(s) => s.trim() == "1",
            Loose::Number(n) => n.as_i64() == Some(1),
            Loose::Flag(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleInfo {
    #[serde(default)]
    pub shortname: Option<String>,
}

/// One scheduled movement as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMovement {
    #[serde(default)]
    pub time: Option<Loose>,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub platform: Option<Loose>,
    #[serde(default)]
    pub delay: Option<Loose>,
    #[serde(default)]
    pub canceled: Option<Loose>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub vehicleinfo: Option<VehicleInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct DepartureList {
    #[serde(default)]
    departure: Vec<RawMovement>,
}

#[derive(Debug, Default, Deserialize)]
struct ArrivalList {
    #[serde(default)]
    arrival: Vec<RawMovement>,
}

/// Top-level live-board document. Only the list matching the requested
/// direction is populated.
#[derive(Debug, Default, Deserialize)]
pub struct LiveboardPayload {
    #[serde(default)]
    departures: Option<DepartureList>,
    #[serde(default)]
    arrivals: Option<ArrivalList>,
}

impl LiveboardPayload {
    pub fn into_records(self, direction: Direction) -> Vec<RawMovement> {
        match direction {
            Direction::Departure => self.departures.map(|d| d.departure).unwrap_or_default(),
            Direction::Arrival => self.arrivals.map(|a| a.arrival).unwrap_or_default(),
        }
    }
}
