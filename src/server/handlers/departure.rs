use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{api::DynAPI, error::Error};

/// Change event of the date picker, `YmdHis` formatted.
#[derive(Serialize, Deserialize)]
pub struct UpdateParams {
    value: String,
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<UpdateParams>,
) -> Result<StatusCode, Error> {
    api.set_departure_time(params.value).await?;

    Ok(StatusCode::NO_CONTENT)
}
