use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// Outcome of one successful route search. Replaced wholesale by the next one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub duration_minutes: f64,
    pub distance_meters: f64,
    pub polyline: Vec<Coordinates>,
}

impl RouteResult {
    pub fn new(duration_minutes: f64, distance_meters: f64, polyline: Vec<Coordinates>) -> Self {
        Self {
            duration_minutes,
            distance_meters,
            polyline,
        }
    }
}
