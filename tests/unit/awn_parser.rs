//! Unit tests for response decoding and remote error mapping

use ambient_weather_client::fetcher::awn_parser::AwnParser;
use ambient_weather_client::fetcher::FetcherError;
use serde_json::json;

#[test]
fn test_empty_window_is_valid() {
    assert!(AwnParser::parse_window(json!([])).unwrap().is_empty());
}

#[test]
fn test_known_remote_errors() {
    let cases = [
        ("apiKey-missing", FetcherError::ApiKeyMissing),
        ("applicationKey-missing", FetcherError::AppKeyMissing),
        ("macAddress-missing", FetcherError::MacAddressMissing),
    ];

    for (error, expected) in cases {
        let body = json!({ "error": error });
        assert_eq!(AwnParser::parse_window(body).unwrap_err(), expected);
    }
}

#[test]
fn test_date_invalid_keeps_message() {
    let body = json!({"error": "date-invalid", "message": "endDate must be epoch ms"});
    assert_eq!(
        AwnParser::parse_window(body).unwrap_err(),
        FetcherError::InvalidDateFormat {
            message: "endDate must be epoch ms".to_string()
        }
    );
}

#[test]
fn test_unknown_remote_error_preserved() {
    let body = json!({"error": "above-user-rate-limit", "message": "slow down"});
    let err = AwnParser::parse_devices(body).unwrap_err();

    assert_eq!(
        err,
        FetcherError::RemoteRejected {
            error: "above-user-rate-limit".to_string(),
            message: Some("slow down".to_string()),
        }
    );
    assert!(err.to_string().contains("above-user-rate-limit (slow down)"));
}

#[test]
fn test_non_array_body_is_parse_error() {
    let err = AwnParser::parse_window(json!({"records": []})).unwrap_err();
    assert_eq!(
        err,
        FetcherError::ParseError("expected device data array, got object".to_string())
    );

    let err = AwnParser::parse_window(json!([{"dateutc": "yesterday"}])).unwrap_err();
    assert_eq!(err.kind(), "ParseError");
}

#[test]
fn test_device_listing() {
    let body = json!([
        {"macAddress": "00:11:22:33:44:55", "info": {"name": "Roof"}},
        {
            "macAddress": "66:77:88:99:AA:BB",
            "lastData": {"dateutc": 1_700_000_000_000i64, "tempf": 40.1}
        }
    ]);
    let devices = AwnParser::parse_devices(body).unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].info.name.as_deref(), Some("Roof"));
    assert!(devices[0].last_data.is_none());
    assert_eq!(devices[1].last_data.as_ref().unwrap().temp_f, Some(40.1));
}
