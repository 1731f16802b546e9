//! Unit tests for calendar date conversion

use ambient_weather_client::epoch::{convert, DateError};
use ambient_weather_client::pagination::DAY_MS;

#[test]
fn test_known_dates() {
    assert_eq!(convert("2014-01-01").unwrap(), 1_388_534_400_000);
    assert_eq!(convert("1970-01-01").unwrap(), 0);
    assert_eq!(convert("2023-11-15").unwrap(), 1_700_006_400_000);
    assert_eq!(convert("2000-03-01").unwrap(), 951_868_800_000);
}

#[test]
fn test_consecutive_days_are_one_window_apart() {
    let first = convert("2024-02-28").unwrap();
    let second = convert("2024-02-29").unwrap();
    let third = convert("2024-03-01").unwrap();

    assert_eq!(second - first, DAY_MS);
    assert_eq!(third - second, DAY_MS);
}

#[test]
fn test_rejected_shapes() {
    for input in [
        "11-15-2021",
        "2021/11/15",
        "2021-1-5",
        "20211115",
        "11152021",
        "11-15-2021:12:42",
        " 2021-11-15",
        "2021-11-15T00:00:00Z",
        "",
    ] {
        assert_eq!(
            convert(input),
            Err(DateError::MalformedDate {
                input: input.to_string()
            }),
            "{input:?}"
        );
    }
}

#[test]
fn test_impossible_calendar_date() {
    assert!(matches!(
        convert("2023-02-29"),
        Err(DateError::MalformedDate { .. })
    ));
    assert!(matches!(
        convert("2023-13-01"),
        Err(DateError::MalformedDate { .. })
    ));
}
