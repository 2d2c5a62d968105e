use chrono::{DateTime, Utc};

use crate::{entities::DepartureTime, error::Error};

/// Last value delivered by the date picker. Never reset; each change event
/// overwrites it and each search snapshots it once.
#[derive(Clone, Debug, Default)]
pub struct Session {
    departure_time: Option<String>,
}

impl Session {
    /// Rejected values leave the previous one in place.
    pub fn set_departure_time(&mut self, value: String) -> Result<(), Error> {
        DepartureTime::validate(&value)?;
        self.departure_time = Some(value);
        Ok(())
    }

    pub fn departure_time(&self, now: DateTime<Utc>) -> DepartureTime {
        DepartureTime::resolve(self.departure_time.as_deref(), now)
    }
}

#[test]
fn unset_session_departs_now() {
    let now = Utc::now();
    let session = Session::default();

    assert_eq!(session.departure_time(now), DepartureTime::from_datetime(now));
}

#[test]
fn latest_change_wins() {
    let mut session = Session::default();
    session.set_departure_time("20240401090000".into()).unwrap();
    session.set_departure_time("2024040118300".into()).unwrap();

    assert_eq!(session.departure_time(Utc::now()).as_str(), "20240401183000");
}

#[test]
fn invalid_value_keeps_previous_one() {
    use crate::error::INVALID_INPUT;

    let mut session = Session::default();
    session.set_departure_time("20240401090000".into()).unwrap();

    let err = session.set_departure_time("tomorrow".into()).unwrap_err();

    assert_eq!(err.code, INVALID_INPUT);
    assert_eq!(session.departure_time(Utc::now()).as_str(), "20240401090000");
}
