use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::{DynAPI, SearchOutcome};
use crate::entities::Coordinates;
use crate::error::Error;
use crate::server::SearchDefaults;

#[derive(Default, Serialize, Deserialize)]
pub struct RunParams {
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
}

pub async fn run(
    Extension(api): Extension<DynAPI>,
    Extension(defaults): Extension<SearchDefaults>,
    params: Option<Json<RunParams>>,
) -> Result<Json<SearchOutcome>, Error> {
    let params = params.map(|Json(params)| params).unwrap_or_default();

    let outcome = api
        .search(
            params.origin.unwrap_or(defaults.origin),
            params.destination.unwrap_or(defaults.destination),
        )
        .await?;

    Ok(outcome.into())
}
