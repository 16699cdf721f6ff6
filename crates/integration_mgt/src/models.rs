//! Stop forecast data models
//!
//! Typed representations of the `stop_v2` response: the stop itself, the
//! route paths serving it and their arrival forecasts.
//!
//! Every field is optional on the wire. Missing fields and explicit `null`
//! values decode to the zero value of the field type; values of the wrong
//! JSON type are rejected.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single predicted arrival of a vehicle at the stop
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Predicted arrival as a unix timestamp (seconds)
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: i64,
    /// 1 if the forecast comes from vehicle telemetry, 0 if from the schedule
    #[serde(default, deserialize_with = "null_as_default")]
    pub by_telemetry: i32,
    /// Vehicle identifier in the telemetry system
    #[serde(default, deserialize_with = "null_as_default")]
    pub tm_id: i64,
    /// Identifier of the owning [`RoutePath`]
    #[serde(default, deserialize_with = "null_as_default")]
    pub route_path_id: String,
}

impl Forecast {
    /// Whether this forecast was computed from real-time vehicle positions
    #[must_use]
    pub const fn is_by_telemetry(&self) -> bool {
        self.by_telemetry != 0
    }

    /// Arrival time, or `None` if the timestamp is out of range
    #[must_use]
    pub fn arrival_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// A route (line) serving the stop, with display metadata and forecasts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutePath {
    /// Route path identifier, unique within one stop response
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Free-form transport type ("bus", "tram", "trolley", ...)
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub transport_type: String,
    /// Route number as displayed to passengers (e.g. "27", "М10")
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: String,
    /// Name of the terminus
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_stop_name: String,
    /// Route colour as a hex string (e.g. "#FF0000")
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// Text colour for the route number badge
    #[serde(default, deserialize_with = "null_as_default")]
    pub font_color: String,
    /// Arrival forecasts in API order
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_forecast: Vec<Forecast>,
}

impl RoutePath {
    /// Classified transport type
    #[must_use]
    pub fn kind(&self) -> TransportType {
        TransportType::from_api(&self.transport_type)
    }

    /// Earliest forecast by arrival time
    #[must_use]
    pub fn next_forecast(&self) -> Option<&Forecast> {
        self.external_forecast.iter().min_by_key(|f| f.time)
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} → {}",
            self.kind().emoji(),
            self.number,
            self.last_stop_name
        )
    }
}

/// Full information about a stop as returned by `stop_v2/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopData {
    /// Stop identifier (a UUID in practice, not validated)
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Stop name (e.g. "ул. Льва Толстого")
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Stop category (e.g. "ground")
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub stop_type: String,
    /// Routes serving the stop in API order
    #[serde(default, deserialize_with = "null_as_default")]
    pub route_path: Vec<RoutePath>,
}

impl StopData {
    /// Find a route path by its displayed number
    #[must_use]
    pub fn route(&self, number: &str) -> Option<&RoutePath> {
        self.route_path.iter().find(|r| r.number == number)
    }

    /// Total number of forecasts across all route paths
    #[must_use]
    pub fn forecast_count(&self) -> usize {
        self.route_path
            .iter()
            .map(|r| r.external_forecast.len())
            .sum()
    }
}

impl fmt::Display for StopData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} routes)", self.name, self.route_path.len())
    }
}

/// Transport type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// Bus
    Bus,
    /// Trolleybus
    Trolley,
    /// Tram
    Tram,
    /// Metro
    Metro,
    /// Anything the API reports that we do not recognise
    Unknown,
}

impl TransportType {
    /// Map the API's free-form `type` string to a transport type
    #[must_use]
    pub fn from_api(value: &str) -> Self {
        match value {
            "bus" => Self::Bus,
            "trolley" | "trolleybus" => Self::Trolley,
            "tram" => Self::Tram,
            "metro" | "subway" => Self::Metro,
            _ => Self::Unknown,
        }
    }

    /// Emoji representation for compact output
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Bus => "🚌",
            Self::Trolley => "🚎",
            Self::Tram => "🚊",
            Self::Metro => "🚇",
            Self::Unknown => "🚋",
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
