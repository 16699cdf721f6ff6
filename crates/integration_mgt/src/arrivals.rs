//! Upcoming arrivals at a stop
//!
//! Flattens the per-route forecasts of a [`StopData`] snapshot into a single
//! time-ordered list suitable for a departure board.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::StopDataClient;
use crate::error::MgtError;
use crate::models::{StopData, TransportType};

/// A single vehicle expected at the stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Arrival {
    /// Route number (e.g. "М10")
    pub route_number: String,
    /// Transport type of the route
    pub transport_type: TransportType,
    /// Terminus of the route
    pub last_stop_name: String,
    /// Predicted arrival time
    pub time: DateTime<Utc>,
    /// Whether the prediction is based on vehicle telemetry
    pub by_telemetry: bool,
    /// Whole minutes from the reference time until arrival
    pub minutes_away: i64,
}

impl Arrival {
    /// Format as a compact one-line summary
    #[must_use]
    pub fn format_summary(&self) -> String {
        let source = if self.by_telemetry { "📡" } else { "🕐" };
        let eta = match self.minutes_away {
            0 => "now".to_string(),
            mins => format!("{mins} min"),
        };
        format!(
            "{} {} → {} {} {source} {eta}",
            self.transport_type.emoji(),
            self.route_number,
            self.last_stop_name,
            self.time.format("%H:%M"),
        )
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

/// Forecasts at or after `now`, earliest first, at most `limit` entries
///
/// Forecasts with the same time keep API order. Forecasts whose timestamp
/// cannot be represented are skipped.
#[must_use]
pub fn upcoming_arrivals(stop: &StopData, now: DateTime<Utc>, limit: usize) -> Vec<Arrival> {
    let mut arrivals: Vec<Arrival> = stop
        .route_path
        .iter()
        .flat_map(|route| {
            route.external_forecast.iter().filter_map(move |forecast| {
                let time = forecast.arrival_time()?;
                (time >= now).then(|| Arrival {
                    route_number: route.number.clone(),
                    transport_type: route.kind(),
                    last_stop_name: route.last_stop_name.clone(),
                    time,
                    by_telemetry: forecast.is_by_telemetry(),
                    minutes_away: (time - now).num_minutes(),
                })
            })
        })
        .collect();

    arrivals.sort_by_key(|a| a.time);
    arrivals.truncate(limit);
    arrivals
}

/// Format a list of arrivals, one per line
#[must_use]
pub fn format_arrivals(arrivals: &[Arrival]) -> String {
    if arrivals.is_empty() {
        return String::from("No upcoming arrivals");
    }

    arrivals
        .iter()
        .map(Arrival::format_summary)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetch a stop and return its upcoming arrivals
pub async fn fetch_arrivals(
    client: &dyn StopDataClient,
    stop_id: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Arrival>, MgtError> {
    let stop = client.get_stop_data(stop_id).await?;
    Ok(upcoming_arrivals(&stop, now, limit))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::client::MockStopDataClient;
    use crate::models::{Forecast, RoutePath};

    const STOP_ID: &str = "9d7f733a-d532-4fca-a922-4c978b79681c";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 13, 0, 0).unwrap()
    }

    fn forecast(offset_secs: i64, by_telemetry: i32) -> Forecast {
        Forecast {
            time: now().timestamp() + offset_secs,
            by_telemetry,
            tm_id: 987_654,
            route_path_id: String::new(),
        }
    }

    fn sample_stop() -> StopData {
        StopData {
            id: STOP_ID.to_string(),
            name: "ул. Льва Толстого".to_string(),
            stop_type: "ground".to_string(),
            route_path: vec![
                RoutePath {
                    id: "bus_123".to_string(),
                    transport_type: "bus".to_string(),
                    number: "М10".to_string(),
                    last_stop_name: "Киевский вокзал".to_string(),
                    external_forecast: vec![forecast(600, 1), forecast(-60, 1)],
                    ..Default::default()
                },
                RoutePath {
                    id: "trolley_15".to_string(),
                    transport_type: "trolley".to_string(),
                    number: "15".to_string(),
                    last_stop_name: "Шаболовка".to_string(),
                    external_forecast: vec![forecast(120, 0), forecast(1800, 0)],
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_upcoming_sorted_and_filtered() {
        let arrivals = upcoming_arrivals(&sample_stop(), now(), 10);
        let numbers: Vec<&str> = arrivals.iter().map(|a| a.route_number.as_str()).collect();
        assert_eq!(numbers, ["15", "М10", "15"]);
        assert_eq!(arrivals[0].minutes_away, 2);
        assert_eq!(arrivals[0].transport_type, TransportType::Trolley);
        assert!(!arrivals[0].by_telemetry);
        assert!(arrivals[1].by_telemetry);
    }

    #[test]
    fn test_upcoming_respects_limit() {
        let arrivals = upcoming_arrivals(&sample_stop(), now(), 1);
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].route_number, "15");
    }

    #[test]
    fn test_upcoming_ties_keep_api_order() {
        let mut stop = sample_stop();
        stop.route_path[0].external_forecast = vec![forecast(300, 1)];
        stop.route_path[1].external_forecast = vec![forecast(300, 0)];

        let arrivals = upcoming_arrivals(&stop, now(), 10);
        assert_eq!(arrivals[0].route_number, "М10");
        assert_eq!(arrivals[1].route_number, "15");
    }

    #[test]
    fn test_upcoming_empty_stop() {
        assert!(upcoming_arrivals(&StopData::default(), now(), 5).is_empty());
    }

    #[test]
    fn test_format_arrivals() {
        assert_eq!(format_arrivals(&[]), "No upcoming arrivals");

        let arrivals = upcoming_arrivals(&sample_stop(), now(), 2);
        let text = format_arrivals(&arrivals);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "🚎 15 → Шаболовка 13:02 🕐 2 min");
        assert_eq!(lines[1], "🚌 М10 → Киевский вокзал 13:10 📡 10 min");
    }

    #[test]
    fn test_format_arriving_now() {
        let mut stop = sample_stop();
        stop.route_path.truncate(1);
        stop.route_path[0].external_forecast = vec![forecast(30, 1)];

        let arrivals = upcoming_arrivals(&stop, now(), 1);
        assert!(arrivals[0].format_summary().ends_with("now"));
    }

    #[tokio::test]
    async fn test_fetch_arrivals_uses_client() {
        let mut client = MockStopDataClient::new();
        client
            .expect_get_stop_data()
            .withf(|stop_id| stop_id == STOP_ID)
            .times(1)
            .returning(|_| Ok(sample_stop()));

        let arrivals = fetch_arrivals(&client, STOP_ID, now(), 5).await.unwrap();
        assert_eq!(arrivals.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_arrivals_propagates_errors() {
        let mut client = MockStopDataClient::new();
        client
            .expect_get_stop_data()
            .returning(|_| {
                Err(MgtError::Timeout {
                    timeout: std::time::Duration::from_secs(10),
                })
            });

        let err = fetch_arrivals(&client, STOP_ID, now(), 5).await.unwrap_err();
        assert!(err.is_network());
    }
}
