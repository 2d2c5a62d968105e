use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::canvas::Scene;

pub async fn find(Extension(api): Extension<DynAPI>) -> Json<Scene> {
    api.scene().await.into()
}
