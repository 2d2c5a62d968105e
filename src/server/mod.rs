mod handlers;

use std::net::SocketAddr;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::DynAPI;
use crate::entities::Coordinates;
use crate::error::{server_error, Error};
use crate::server::handlers::{departure, scene, search, waypoints};

/// Endpoints searched when the trigger carries no body.
#[derive(Clone, Copy, Debug)]
pub struct SearchDefaults {
    pub origin: Coordinates,
    pub destination: Coordinates,
}

pub fn router(api: DynAPI, defaults: SearchDefaults) -> Router {
    Router::new()
        .route("/departure", post(departure::update))
        .route("/search", post(search::run))
        .route("/waypoints/plan", post(waypoints::plan))
        .route("/scene", get(scene::find))
        .layer(Extension(api))
        .layer(Extension(defaults))
}

pub async fn serve(api: DynAPI, defaults: SearchDefaults, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api, defaults);

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(|err| server_error(format!("cannot bind {}: {}", addr, err)))?
        .serve(app.into_make_service())
        .await
        .map_err(|err| server_error(err.to_string()))
}

#[cfg(test)]
async fn spawn_app(api_base: String) -> SocketAddr {
    use crate::canvas::{SceneCanvas, ViewportSize};
    use crate::config::{DEFAULT_DESTINATION, DEFAULT_ORIGIN};
    use crate::engine::Engine;
    use crate::external::RouteMbnClient;
    use crate::format::Locale;
    use std::sync::Arc;

    let engine = Engine::new(
        RouteMbnClient::new(api_base, None),
        SceneCanvas::new(DEFAULT_ORIGIN, ViewportSize::default()),
        Locale::En,
        0.5,
    );
    let defaults = SearchDefaults {
        origin: DEFAULT_ORIGIN,
        destination: DEFAULT_DESTINATION,
    };

    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(router(Arc::new(engine), defaults).into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);

    addr
}

#[tokio::test]
async fn search_button_renders_default_route() {
    use crate::testing::{route_response, RouteFixture};
    use serde_json::{json, Value};

    let fixture = RouteFixture::serve(route_response(
        65.0,
        1500.0,
        &[&[[139.7344, 35.7039], [139.7424, 35.7005]]],
    ))
    .await;
    let addr = spawn_app(fixture.base_url()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/departure", addr))
        .json(&json!({ "value": "2024040112300" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);

    let outcome: Value = client
        .post(format!("http://{}/search", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["status"], "rendered");
    assert_eq!(outcome["duration"], "1 hour 5 minutes");
    assert_eq!(outcome["distance"], "1.5 km");
    assert_eq!(outcome["departure_time"], "20240401123000");

    let seen = fixture.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].params.from, "139.73442305859913,35.703874744612726");

    let scene: Value = client
        .get(format!("http://{}/scene", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let widgets = scene["widgets"].as_array().unwrap();
    assert_eq!(widgets.iter().filter(|w| w["kind"] == "marker").count(), 2);
    assert_eq!(widgets.iter().filter(|w| w["kind"] == "polyline").count(), 1);
    assert_eq!(scene["texts"]["time"], "1 hour 5 minutes");
    assert_eq!(scene["texts"]["dist"], "1.5 km");
}

#[tokio::test]
async fn failed_upstream_is_bad_gateway() {
    use crate::testing::RouteFixture;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    let fixture = RouteFixture::serve(json!({ "ret": { "status": "NG", "message": "bad" } })).await;
    let addr = spawn_app(fixture.base_url()).await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/search", addr))
        .json(&json!({
            "origin": { "lat": 35.7039, "lng": 139.7344 },
            "destination": { "lat": 35.7005, "lng": 139.7424 }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), StatusCode::BAD_GATEWAY.as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], crate::error::REQUEST_FAILURE);
}

#[tokio::test]
async fn plans_waypoints_over_http() {
    use serde_json::{json, Value};

    let addr = spawn_app("http://127.0.0.1:9".into()).await;
    let client = reqwest::Client::new();

    let planned: Value = client
        .post(format!("http://{}/waypoints/plan", addr))
        .json(&json!({
            "origin": { "lat": 35.7039, "lng": 139.7344 },
            "destination": { "lat": 35.7005, "lng": 139.7424 },
            "waypoints": "139.7360,35.7010,139.7380,35.7020",
            "order": "2,1"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        planned,
        json!([
            { "lat": 35.7039, "lng": 139.7344 },
            { "lat": 35.7020, "lng": 139.7380 },
            { "lat": 35.7010, "lng": 139.7360 },
            { "lat": 35.7005, "lng": 139.7424 }
        ])
    );

    let res = client
        .post(format!("http://{}/waypoints/plan", addr))
        .json(&json!({
            "origin": { "lat": 35.7039, "lng": 139.7344 },
            "destination": { "lat": 35.7005, "lng": 139.7424 },
            "waypoints": "139.7360,35.7010",
            "order": "5"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_departure_is_bad_request() {
    use crate::error::INVALID_INPUT;
    use crate::testing::{route_response, RouteFixture};
    use serde_json::{json, Value};

    let fixture = RouteFixture::serve(route_response(
        65.0,
        1500.0,
        &[&[[139.7344, 35.7039], [139.7424, 35.7005]]],
    ))
    .await;
    let addr = spawn_app(fixture.base_url()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/departure", addr))
        .json(&json!({ "value": "tomorrow" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], INVALID_INPUT);

    client
        .post(format!("http://{}/search", addr))
        .send()
        .await
        .unwrap();

    let seen = fixture.requests();
    assert_eq!(seen.len(), 1);
    let departure_time = seen[0].params.departure_time.as_str();
    assert_ne!(departure_time, "tomorrow0");
    assert_eq!(departure_time.len(), 14);
}
