use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    canvas::{TextDisplay, DISTANCE_ELEMENT_ID, TIME_ELEMENT_ID},
    error::{config_error, Error},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ja" => Ok(Locale::Ja),
            other => Err(config_error(format!("unknown locale {:?}", other))),
        }
    }
}

fn split_minutes(minutes: f64) -> (u64, u64) {
    let total = if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u64
    } else {
        0
    };

    (total / 60, total % 60)
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

pub fn format_duration(minutes: f64, locale: Locale) -> String {
    let (hours, minutes) = split_minutes(minutes);

    match (locale, hours, minutes) {
        (Locale::En, 0, 0) => "arrives immediately".into(),
        (Locale::En, 0, m) => plural(m, "minute"),
        (Locale::En, h, 0) => plural(h, "hour"),
        (Locale::En, h, m) => format!("{} {}", plural(h, "hour"), plural(m, "minute")),
        (Locale::Ja, 0, 0) => "すぐに到着します".into(),
        (Locale::Ja, 0, m) => format!("{}分", m),
        (Locale::Ja, h, 0) => format!("{}時間", h),
        (Locale::Ja, h, m) => format!("{}時間{}分", h, m),
    }
}

/// Kilometers with one decimal, halves rounded away from zero.
pub fn format_distance(meters: f64) -> String {
    let meters = if meters.is_finite() && meters > 0.0 {
        meters
    } else {
        0.0
    };
    let km = (meters / 100.0).round() / 10.0;
    format!("{:.1} km", km)
}

/// Writes duration and distance to the `time` and `dist` elements.
///
/// Both writes are attempted; the first failure is returned.
pub fn show_route_info<D: TextDisplay + ?Sized>(
    display: &mut D,
    minutes: f64,
    meters: f64,
    locale: Locale,
) -> Result<(), Error> {
    let duration = format_duration(minutes, locale);
    let time = display.set_text(TIME_ELEMENT_ID, &duration).map_err(|err| {
        tracing::error!("duration display unavailable: {}", err);
        err
    });

    let distance = format_distance(meters);
    let dist = display.set_text(DISTANCE_ELEMENT_ID, &distance).map_err(|err| {
        tracing::error!("distance display unavailable: {}", err);
        err
    });

    time.and(dist)
}

#[test]
fn english_durations() {
    assert_eq!(format_duration(0.0, Locale::En), "arrives immediately");
    assert_eq!(format_duration(0.4, Locale::En), "arrives immediately");
    assert_eq!(format_duration(1.0, Locale::En), "1 minute");
    assert_eq!(format_duration(42.0, Locale::En), "42 minutes");
    assert_eq!(format_duration(60.0, Locale::En), "1 hour");
    assert_eq!(format_duration(65.0, Locale::En), "1 hour 5 minutes");
    assert_eq!(format_duration(120.0, Locale::En), "2 hours");
    assert_eq!(format_duration(121.0, Locale::En), "2 hours 1 minute");
}

#[test]
fn minutes_round_before_splitting() {
    assert_eq!(format_duration(59.6, Locale::En), "1 hour");
    assert_eq!(format_duration(65.4, Locale::En), "1 hour 5 minutes");
    assert_eq!(format_duration(65.5, Locale::En), "1 hour 6 minutes");
}

#[test]
fn invalid_durations_read_as_immediate() {
    assert_eq!(format_duration(-5.0, Locale::En), "arrives immediately");
    assert_eq!(format_duration(f64::NAN, Locale::En), "arrives immediately");
}

#[test]
fn japanese_durations() {
    assert_eq!(format_duration(0.0, Locale::Ja), "すぐに到着します");
    assert_eq!(format_duration(5.0, Locale::Ja), "5分");
    assert_eq!(format_duration(120.0, Locale::Ja), "2時間");
    assert_eq!(format_duration(65.0, Locale::Ja), "1時間5分");
}

#[test]
fn distances_in_kilometers() {
    assert_eq!(format_distance(1500.0), "1.5 km");
    assert_eq!(format_distance(950.0), "1.0 km");
    assert_eq!(format_distance(949.0), "0.9 km");
    assert_eq!(format_distance(0.0), "0.0 km");
    assert_eq!(format_distance(12345.0), "12.3 km");
}

#[test]
fn invalid_distances_read_as_zero() {
    assert_eq!(format_distance(-20.0), "0.0 km");
    assert_eq!(format_distance(-1500.0), "0.0 km");
    assert_eq!(format_distance(f64::NAN), "0.0 km");
    assert_eq!(format_distance(f64::INFINITY), "0.0 km");
}

#[test]
fn locale_from_str() {
    assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
    assert_eq!(" JA ".parse::<Locale>().unwrap(), Locale::Ja);
    assert!("fr".parse::<Locale>().is_err());
}

#[test]
fn route_info_reaches_both_elements() {
    use crate::canvas::SceneCanvas;

    let mut canvas = SceneCanvas::default();
    show_route_info(&mut canvas, 65.0, 1500.0, Locale::En).unwrap();

    let scene = canvas.scene();
    assert_eq!(scene.texts[TIME_ELEMENT_ID], "1 hour 5 minutes");
    assert_eq!(scene.texts[DISTANCE_ELEMENT_ID], "1.5 km");
}

#[test]
fn missing_sink_is_reported() {
    use crate::canvas::SceneCanvas;
    use crate::error::MISSING_DISPLAY_SINK;

    let mut canvas = SceneCanvas::with_elements(&[TIME_ELEMENT_ID]);
    let err = show_route_info(&mut canvas, 65.0, 1500.0, Locale::En).unwrap_err();

    assert_eq!(err.code, MISSING_DISPLAY_SINK);
    assert_eq!(canvas.scene().texts[TIME_ELEMENT_ID], "1 hour 5 minutes");
}

#[test]
fn missing_time_sink_still_shows_distance() {
    use crate::canvas::SceneCanvas;
    use crate::error::MISSING_DISPLAY_SINK;

    let mut canvas = SceneCanvas::with_elements(&[DISTANCE_ELEMENT_ID]);
    let err = show_route_info(&mut canvas, 65.0, 1500.0, Locale::En).unwrap_err();

    assert_eq!(err.code, MISSING_DISPLAY_SINK);
    assert!(err.message.contains(TIME_ELEMENT_ID));
    assert_eq!(canvas.scene().texts[DISTANCE_ELEMENT_ID], "1.5 km");
}

#[test]
fn both_sinks_missing_reports_time_first() {
    use crate::canvas::SceneCanvas;

    let mut canvas = SceneCanvas::with_elements(&[]);
    let err = show_route_info(&mut canvas, 65.0, 1500.0, Locale::En).unwrap_err();

    assert!(err.message.contains(TIME_ELEMENT_ID));
}
