use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::canvas::Scene;
use crate::entities::{Coordinates, DepartureTime, RouteResult, Viewport};
use crate::error::Error;

#[async_trait]
pub trait RouteAPI {
    async fn request_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        departure_time: &DepartureTime,
    ) -> Result<RouteResult, Error>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedRoute {
    pub generation: u64,
    pub departure_time: DepartureTime,
    pub duration: String,
    pub distance: String,
    pub viewport: Option<Viewport>,
    /// Set when a text element was missing; the route is still drawn.
    pub display_error: Option<Error>,
    pub route: RouteResult,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Rendered(RenderedRoute),
    /// A newer search started before this response arrived; nothing was drawn.
    Superseded { generation: u64 },
}

#[async_trait]
pub trait SearchAPI {
    /// Date-picker change handler.
    async fn set_departure_time(&self, value: String) -> Result<(), Error>;

    async fn search(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<SearchOutcome, Error>;
}

#[async_trait]
pub trait PlanAPI {
    async fn plan_waypoints(
        &self,
        waypoints: String,
        origin: Coordinates,
        destination: Coordinates,
        order: String,
    ) -> Result<Vec<Coordinates>, Error>;
}

#[async_trait]
pub trait SceneAPI {
    async fn scene(&self) -> Scene;
}

pub trait API: SearchAPI + PlanAPI + SceneAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
