use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::Coordinates;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct PlanParams {
    origin: Coordinates,
    destination: Coordinates,
    /// Intermediate stops as `"lng,lat,lng,lat,..."`.
    #[serde(default)]
    waypoints: String,
    /// Visiting order of the intermediate stops, e.g. `"2,1"`.
    #[serde(default)]
    order: String,
}

pub async fn plan(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PlanParams>,
) -> Result<Json<Vec<Coordinates>>, Error> {
    let planned = api
        .plan_waypoints(
            params.waypoints,
            params.origin,
            params.destination,
            params.order,
        )
        .await?;

    Ok(planned.into())
}
