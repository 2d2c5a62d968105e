//! Stand-ins for the route API and the map canvas used across the unit tests.

use async_trait::async_trait;
use axum::{extract::Extension, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
    api::RouteAPI,
    canvas::{MapCanvas, TextDisplay, DISTANCE_ELEMENT_ID, TIME_ELEMENT_ID},
    entities::{
        compute_bounds, Coordinates, DepartureTime, Marker, Polyline, RouteResult, Viewport,
        Widget, WidgetId,
    },
    error::{missing_display_sink_error, Error},
    external::route_mbn::{DrivePtpParams, DRIVE_PTP_PATH},
};

/// Success envelope of the drive_ptp API; each link is a list of `[lng, lat]`.
pub fn route_response(time: f64, distance: f64, links: &[&[[f64; 2]]]) -> Value {
    let link: Vec<Value> = links
        .iter()
        .map(|coordinates| json!({ "line": { "coordinates": coordinates } }))
        .collect();

    json!({
        "ret": {
            "status": "OK",
            "message": {
                "result": {
                    "item": [{ "route": { "time": time, "distance": distance, "link": link } }]
                }
            }
        }
    })
}

#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub api_key: Option<String>,
    pub params: DrivePtpParams,
}

struct FixtureState {
    status: StatusCode,
    body: Value,
    seen: Mutex<Vec<SeenRequest>>,
}

/// Local HTTP server answering drive_ptp with a canned response.
pub struct RouteFixture {
    addr: SocketAddr,
    state: Arc<FixtureState>,
}

async fn drive_ptp(
    Extension(state): Extension<Arc<FixtureState>>,
    headers: HeaderMap,
    Json(params): Json<DrivePtpParams>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    state.seen.lock().unwrap().push(SeenRequest { api_key, params });

    (state.status, Json(state.body.clone()))
}

impl RouteFixture {
    pub async fn serve(body: Value) -> Self {
        Self::start(StatusCode::OK, body).await
    }

    pub async fn serve_status(status: StatusCode) -> Self {
        Self::start(status, json!({ "error": "unavailable" })).await
    }

    async fn start(status: StatusCode, body: Value) -> Self {
        let state = Arc::new(FixtureState {
            status,
            body,
            seen: Mutex::new(vec![]),
        });

        let app = Router::new()
            .route(DRIVE_PTP_PATH, post(drive_ptp))
            .layer(Extension(state.clone()));

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

struct Step {
    gate: Option<Arc<Notify>>,
    result: Result<RouteResult, Error>,
}

/// Scripted route API: answers calls in order, optionally waiting on a gate.
#[derive(Clone, Default)]
pub struct StubRoutes {
    steps: Arc<Mutex<VecDeque<Step>>>,
    departures: Arc<Mutex<Vec<DepartureTime>>>,
}

impl StubRoutes {
    pub fn answer(self, result: Result<RouteResult, Error>) -> Self {
        self.steps.lock().unwrap().push_back(Step { gate: None, result });
        self
    }

    pub fn answer_after(self, gate: Arc<Notify>, result: Result<RouteResult, Error>) -> Self {
        self.steps.lock().unwrap().push_back(Step {
            gate: Some(gate),
            result,
        });
        self
    }

    pub fn departures(&self) -> Vec<DepartureTime> {
        self.departures.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteAPI for StubRoutes {
    async fn request_route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
        departure_time: &DepartureTime,
    ) -> Result<RouteResult, Error> {
        self.departures.lock().unwrap().push(departure_time.clone());

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted route response left");

        if let Some(gate) = step.gate {
            gate.notified().await;
        }

        step.result
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasOp {
    AddMarker(WidgetId, Marker),
    AddPolyline(WidgetId, Polyline),
    Remove(WidgetId),
    SetCenter(Coordinates),
    SetZoom(f64),
    SetText(String, String),
}

/// Canvas that only records what was asked of it.
#[derive(Clone)]
pub struct RecordingCanvas {
    log: Arc<Mutex<Vec<CanvasOp>>>,
    elements: Vec<String>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::with_elements(&[TIME_ELEMENT_ID, DISTANCE_ELEMENT_ID])
    }
}

impl RecordingCanvas {
    pub fn with_elements(element_ids: &[&str]) -> Self {
        Self {
            log: Arc::new(Mutex::new(vec![])),
            elements: element_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn ops(&self) -> Vec<CanvasOp> {
        self.log.lock().unwrap().clone()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                CanvasOp::AddMarker(_, marker) => Some(marker),
                _ => None,
            })
            .collect()
    }

    pub fn polylines(&self) -> Vec<(WidgetId, Polyline)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                CanvasOp::AddPolyline(id, polyline) => Some((id, polyline)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self, element_id: &str) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                CanvasOp::SetText(id, text) if id == element_id => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: CanvasOp) {
        self.log.lock().unwrap().push(op);
    }
}

pub const FITTED_ZOOM: f64 = 16.0;

impl MapCanvas for RecordingCanvas {
    fn add_widget(&mut self, widget: Widget) -> Result<WidgetId, Error> {
        let id = Uuid::new_v4();
        match widget {
            Widget::Marker(marker) => self.record(CanvasOp::AddMarker(id, marker)),
            Widget::Polyline(polyline) => self.record(CanvasOp::AddPolyline(id, polyline)),
        }
        Ok(id)
    }

    fn remove_widget(&mut self, id: WidgetId) -> Result<(), Error> {
        self.record(CanvasOp::Remove(id));
        Ok(())
    }

    fn set_center(&mut self, center: Coordinates) {
        self.record(CanvasOp::SetCenter(center));
    }

    fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.record(CanvasOp::SetZoom(zoom));
        zoom
    }

    fn adjust_zoom(&self, coordinates: &[Coordinates]) -> Result<Viewport, Error> {
        Ok(Viewport {
            center: compute_bounds(coordinates)?.center(),
            zoom: FITTED_ZOOM,
        })
    }
}

impl TextDisplay for RecordingCanvas {
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), Error> {
        if !self.elements.iter().any(|id| id == element_id) {
            return Err(missing_display_sink_error(element_id));
        }

        self.record(CanvasOp::SetText(element_id.into(), text.into()));
        Ok(())
    }
}
