//! Property-based tests for the stop data model

use integration_mgt::{Forecast, RoutePath, StopData};
use proptest::prelude::*;

fn forecast_strategy() -> impl Strategy<Value = Forecast> {
    (any::<i64>(), 0..=1i32, any::<i64>(), "[a-z]{1,8}_[0-9]{1,4}").prop_map(
        |(time, by_telemetry, tm_id, route_path_id)| Forecast {
            time,
            by_telemetry,
            tm_id,
            route_path_id,
        },
    )
}

fn route_path_strategy() -> impl Strategy<Value = RoutePath> {
    (
        "[a-z]{1,8}_[0-9]{1,4}",
        prop_oneof![
            Just("bus".to_string()),
            Just("tram".to_string()),
            Just("trolley".to_string()),
            "\\PC{0,10}",
        ],
        "[0-9А-Яа-яA-Z]{1,4}",
        "\\PC{0,30}",
        "#[0-9A-F]{6}",
        "#[0-9A-F]{6}",
        prop::collection::vec(forecast_strategy(), 0..5),
    )
        .prop_map(
            |(id, transport_type, number, last_stop_name, color, font_color, external_forecast)| {
                RoutePath {
                    id,
                    transport_type,
                    number,
                    last_stop_name,
                    color,
                    font_color,
                    external_forecast,
                }
            },
        )
}

fn stop_data_strategy() -> impl Strategy<Value = StopData> {
    (
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "\\PC{0,40}",
        prop_oneof![Just("ground".to_string()), "[a-z]{0,10}"],
        prop::collection::vec(route_path_strategy(), 0..4),
    )
        .prop_map(|(id, name, stop_type, route_path)| StopData {
            id,
            name,
            stop_type,
            route_path,
        })
}

proptest! {
    #[test]
    fn stop_data_survives_reencoding(stop in stop_data_strategy()) {
        let json = serde_json::to_string(&stop).unwrap();
        let decoded: StopData = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, stop);
    }

    #[test]
    fn wire_document_survives_decode_then_encode(stop in stop_data_strategy()) {
        let wire = serde_json::to_value(&stop).unwrap();
        let decoded: StopData = serde_json::from_value(wire.clone()).unwrap();
        prop_assert_eq!(serde_json::to_value(&decoded).unwrap(), wire);
    }

    #[test]
    fn forecast_count_matches_nested_lengths(stop in stop_data_strategy()) {
        let expected: usize = stop.route_path.iter().map(|r| r.external_forecast.len()).sum();
        prop_assert_eq!(stop.forecast_count(), expected);
    }
}
