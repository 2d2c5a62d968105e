use geo_types::Coord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds coordinates from a `[lng, lat]` pair as the route API sends them.
    pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self { lat, lng }
    }
}

/// The route API addresses points as `"lng,lat"`.
impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lng, coordinates.lat)
    }
}

impl From<Coordinates> for Coord<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Coord {
            x: coordinates.lng,
            y: coordinates.lat,
        }
    }
}

impl From<Coord<f64>> for Coordinates {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

#[test]
fn renders_as_lng_lat() {
    let kagurazaka = Coordinates::new(35.7039, 139.7344);
    let query: String = kagurazaka.into();

    assert_eq!(query, "139.7344,35.7039");
}

#[test]
fn geo_coord_uses_lng_as_x() {
    let coord: Coord<f64> = Coordinates::new(35.0, 139.0).into();

    assert_eq!(coord.x, 139.0);
    assert_eq!(coord.y, 35.0);
    assert_eq!(Coordinates::from(coord), Coordinates::new(35.0, 139.0));
}
