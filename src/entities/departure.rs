use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

pub const DEPARTURE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";
const DEPARTURE_TIME_LEN: usize = 14;

/// A `YYYYMMDDHHmmss` timestamp ready for the route API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartureTime(String);

impl DepartureTime {
    /// Picks the picker value if one was ever set, otherwise `now`.
    ///
    /// A value missing its last digit (13 characters or fewer) gets one
    /// trailing `0`; anything longer is passed through untouched.
    pub fn resolve(picked: Option<&str>, now: DateTime<Utc>) -> Self {
        match picked {
            Some(value) if !value.is_empty() => Self::pad(value),
            _ => Self::from_datetime(now),
        }
    }

    /// Accepts what the date picker may send: nothing, or up to 14 ASCII
    /// digits.
    pub fn validate(value: &str) -> Result<(), Error> {
        if value.len() > DEPARTURE_TIME_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            tracing::error!("rejected departure time {:?}", value);
            return Err(invalid_input_error(format!(
                "departure time must be at most {} digits, got {:?}",
                DEPARTURE_TIME_LEN, value
            )));
        }

        Ok(())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format(DEPARTURE_TIME_FORMAT).to_string())
    }

    fn pad(value: &str) -> Self {
        if value.chars().count() < DEPARTURE_TIME_LEN {
            Self(format!("{}0", value))
        } else {
            Self(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
fn noon() -> DateTime<Utc> {
    use chrono::TimeZone;

    Utc.with_ymd_and_hms(2024, 4, 1, 12, 30, 5).unwrap()
}

#[test]
fn short_value_gets_one_trailing_zero() {
    let resolved = DepartureTime::resolve(Some("2024040112300"), noon());
    assert_eq!(resolved.as_str(), "20240401123000");

    let resolved = DepartureTime::resolve(Some("202404011230"), noon());
    assert_eq!(resolved.as_str(), "2024040112300");
}

#[test]
fn full_value_is_unchanged() {
    let resolved = DepartureTime::resolve(Some("20240401123015"), noon());
    assert_eq!(resolved.as_str(), "20240401123015");
}

#[test]
fn unset_value_falls_back_to_now() {
    assert_eq!(DepartureTime::resolve(None, noon()).as_str(), "20240401123005");
    assert_eq!(
        DepartureTime::resolve(Some(""), noon()).as_str(),
        "20240401123005"
    );
}

#[test]
fn picker_values_are_validated() {
    use crate::error::INVALID_INPUT;

    assert!(DepartureTime::validate("").is_ok());
    assert!(DepartureTime::validate("2024040112300").is_ok());
    assert!(DepartureTime::validate("20240401123015").is_ok());

    for value in ["tomorrow", "2024-04-01 12:30", "202404011230150", "２０２４"] {
        assert_eq!(DepartureTime::validate(value).unwrap_err().code, INVALID_INPUT);
    }
}

#[test]
fn serializes_as_plain_string() {
    let departure_time = DepartureTime::resolve(Some("20240401123015"), noon());
    let json = serde_json::to_string(&departure_time).unwrap();

    assert_eq!(json, "\"20240401123015\"");
}
