use geo_types::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::{
    entities::Coordinates,
    error::{empty_input_error, Error},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl BoundingBox {
    pub fn contains(&self, point: &Coordinates) -> bool {
        self.south_west.lat <= point.lat
            && point.lat <= self.north_east.lat
            && self.south_west.lng <= point.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bounds: BoundingBox) -> Self {
        Rect::new(
            coord! { x: bounds.south_west.lng, y: bounds.south_west.lat },
            coord! { x: bounds.north_east.lng, y: bounds.north_east.lat },
        )
    }
}

/// Smallest lat/lng box around `coords`. Fails with `EMPTY_INPUT` rather than
/// returning a box with infinite extrema.
pub fn compute_bounds(coords: &[Coordinates]) -> Result<BoundingBox, Error> {
    let (first, rest) = match coords.split_first() {
        Some(split) => split,
        None => {
            tracing::error!("cannot compute bounds of an empty polyline");
            return Err(empty_input_error());
        }
    };

    let mut south_west = *first;
    let mut north_east = *first;

    for point in rest {
        south_west.lat = south_west.lat.min(point.lat);
        south_west.lng = south_west.lng.min(point.lng);
        north_east.lat = north_east.lat.max(point.lat);
        north_east.lng = north_east.lng.max(point.lng);
    }

    Ok(BoundingBox {
        south_west,
        north_east,
    })
}

#[test]
fn empty_polyline_is_rejected() {
    use crate::error::EMPTY_INPUT;

    let err = compute_bounds(&[]).unwrap_err();
    assert_eq!(err.code, EMPTY_INPUT);
}

#[test]
fn single_point_is_degenerate_box() {
    let point = Coordinates::new(35.7, 139.7);
    let bounds = compute_bounds(&[point]).unwrap();

    assert_eq!(bounds.south_west, point);
    assert_eq!(bounds.north_east, point);
}

#[test]
fn box_contains_every_point() {
    let polyline = vec![
        Coordinates::new(35.7039, 139.7344),
        Coordinates::new(35.7012, 139.7399),
        Coordinates::new(35.7061, 139.7381),
        Coordinates::new(35.7005, 139.7424),
        Coordinates::new(-33.8688, 151.2093),
        Coordinates::new(51.5074, -0.1278),
    ];

    let bounds = compute_bounds(&polyline).unwrap();

    assert!(polyline.iter().all(|p| bounds.contains(p)));
    assert_eq!(bounds.south_west, Coordinates::new(-33.8688, -0.1278));
    assert_eq!(bounds.north_east, Coordinates::new(51.5074, 151.2093));
}

#[test]
fn converts_to_geo_rect() {
    let bounds = compute_bounds(&[
        Coordinates::new(35.7039, 139.7344),
        Coordinates::new(35.7005, 139.7424),
    ])
    .unwrap();

    let rect: Rect<f64> = bounds.into();
    assert_eq!(rect.min().x, 139.7344);
    assert_eq!(rect.min().y, 35.7005);
    assert_eq!(rect.max().x, 139.7424);
    assert_eq!(rect.max().y, 35.7039);
}
