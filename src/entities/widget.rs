use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

pub type WidgetId = Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Marker(Marker),
    Polyline(Polyline),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Coordinates,
    pub color: String,
    /// 1-based label drawn inside the marker.
    pub number: usize,
}

impl Marker {
    pub fn numbered(position: Coordinates, number: usize) -> Self {
        Self {
            position,
            color: "red".into(),
            number,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePattern {
    Solid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: u32,
    pub pattern: LinePattern,
    pub opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "green".into(),
            width: 4,
            pattern: LinePattern::Solid,
            opacity: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub path: Vec<Coordinates>,
    pub style: LineStyle,
}

impl Polyline {
    pub fn new(path: Vec<Coordinates>) -> Self {
        Self {
            path,
            style: LineStyle::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: f64,
}

#[test]
fn numbered_markers_are_red() {
    let marker = Marker::numbered(Coordinates::new(35.7, 139.7), 1);

    assert_eq!(marker.color, "red");
    assert_eq!(marker.number, 1);
}

#[test]
fn widget_serializes_with_kind_tag() {
    let widget = Widget::Polyline(Polyline::new(vec![Coordinates::new(35.7, 139.7)]));
    let json = serde_json::to_value(&widget).unwrap();

    assert_eq!(json["kind"], "polyline");
    assert_eq!(json["style"]["color"], "green");
    assert_eq!(json["style"]["width"], 4);
    assert_eq!(json["style"]["pattern"], "solid");
}
