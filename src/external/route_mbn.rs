use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    api::RouteAPI,
    entities::{Coordinates, DepartureTime, RouteResult},
    error::{request_failure_error, Error},
};

pub const DRIVE_PTP_PATH: &str = "/route/route_mbn/drive_ptp";
const API_KEY_HEADER: &str = "x-api-key";
const SEARCH_TYPE_DRIVE: u8 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrivePtpParams {
    pub search_type: u8,
    pub from: String,
    pub to: String,
    pub time_restriction: bool,
    pub departure_time: DepartureTime,
}

impl DrivePtpParams {
    pub fn new(origin: Coordinates, destination: Coordinates, departure_time: DepartureTime) -> Self {
        Self {
            search_type: SEARCH_TYPE_DRIVE,
            from: origin.into(),
            to: destination.into(),
            time_restriction: true,
            departure_time,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct Response {
    ret: Option<Ret>,
}

#[derive(Clone, Debug, Deserialize)]
struct Ret {
    status: String,
    // a plain string on failure, the result object on success
    #[serde(default)]
    message: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct Message {
    result: RouteSearchResult,
}

#[derive(Clone, Debug, Deserialize)]
struct RouteSearchResult {
    item: Vec<Item>,
}

#[derive(Clone, Debug, Deserialize)]
struct Item {
    route: Route,
}

#[derive(Clone, Debug, Deserialize)]
struct Route {
    time: f64,
    distance: f64,
    link: Vec<Link>,
}

#[derive(Clone, Debug, Deserialize)]
struct Link {
    line: Line,
}

#[derive(Clone, Debug, Deserialize)]
struct Line {
    coordinates: Vec<Vec<f64>>,
}

fn extract_route(data: Response) -> Result<RouteResult, Error> {
    let ret = data
        .ret
        .ok_or_else(|| request_failure_error("response has no ret envelope"))?;

    if ret.status != "OK" {
        return Err(request_failure_error(format!("status {}", ret.status)));
    }

    let message: Message = serde_json::from_value(ret.message)?;
    let route = message
        .result
        .item
        .into_iter()
        .next()
        .ok_or_else(|| request_failure_error("no route item"))?
        .route;

    let polyline = route
        .link
        .iter()
        .flat_map(|link| link.line.coordinates.iter())
        .map(|pair| match pair.as_slice() {
            [lng, lat, ..] => Ok(Coordinates::from_lng_lat(*lng, *lat)),
            _ => Err(request_failure_error("coordinate is not a [lng, lat] pair")),
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(RouteResult::new(route.time, route.distance, polyline))
}

#[derive(Clone, Debug)]
pub struct RouteMbnClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl RouteMbnClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn send(&self, params: &DrivePtpParams) -> Result<RouteResult, Error> {
        let url = format!("{}{}", self.api_base, DRIVE_PTP_PATH);

        let mut req = self.client.post(url).json(params);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let res = req.send().await?;

        let status_code = res.status().as_u16();
        if status_code != 200 {
            return Err(request_failure_error(format!("http status {}", status_code)));
        }

        let data: Response = res.json().await?;

        extract_route(data)
    }
}

#[async_trait]
impl RouteAPI for RouteMbnClient {
    #[tracing::instrument(skip(self))]
    async fn request_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        departure_time: &DepartureTime,
    ) -> Result<RouteResult, Error> {
        let params = DrivePtpParams::new(origin, destination, departure_time.clone());

        match self.send(&params).await {
            Ok(route) => {
                tracing::info!(
                    points = route.polyline.len(),
                    time = route.duration_minutes,
                    distance = route.distance_meters,
                    "route search succeeded"
                );
                Ok(route)
            }
            Err(err) => {
                tracing::error!("route search failed: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
fn parse(body: serde_json::Value) -> Result<RouteResult, Error> {
    extract_route(serde_json::from_value(body).unwrap())
}

#[test]
fn params_use_lng_lat_order() {
    let params = DrivePtpParams::new(
        Coordinates::new(35.7039, 139.7344),
        Coordinates::new(35.7005, 139.7424),
        DepartureTime::from_datetime(chrono::Utc::now()),
    );

    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["search_type"], 1);
    assert_eq!(json["from"], "139.7344,35.7039");
    assert_eq!(json["to"], "139.7424,35.7005");
    assert_eq!(json["time_restriction"], true);
    assert!(json["departure_time"].is_string());
}

#[test]
fn flattens_links_in_order() {
    use crate::testing::route_response;

    let route = parse(route_response(
        65.0,
        1500.0,
        &[
            &[[139.7344, 35.7039], [139.7360, 35.7030]],
            &[[139.7360, 35.7030], [139.7424, 35.7005]],
        ],
    ))
    .unwrap();

    assert_eq!(route.duration_minutes, 65.0);
    assert_eq!(route.distance_meters, 1500.0);
    assert_eq!(
        route.polyline,
        vec![
            Coordinates::new(35.7039, 139.7344),
            Coordinates::new(35.7030, 139.7360),
            Coordinates::new(35.7030, 139.7360),
            Coordinates::new(35.7005, 139.7424),
        ]
    );
}

#[test]
fn non_ok_status_is_request_failure() {
    use crate::error::REQUEST_FAILURE;
    use serde_json::json;

    let err = parse(json!({"ret": {"status": "NG", "message": "invalid parameter"}})).unwrap_err();
    assert_eq!(err.code, REQUEST_FAILURE);

    let err = parse(json!({"status": "OK"})).unwrap_err();
    assert_eq!(err.code, REQUEST_FAILURE);
}

#[test]
fn missing_items_is_request_failure() {
    use crate::error::REQUEST_FAILURE;
    use serde_json::json;

    let err = parse(json!({"ret": {"status": "OK", "message": {"result": {"item": []}}}}))
        .unwrap_err();
    assert_eq!(err.code, REQUEST_FAILURE);

    let err = parse(json!({"ret": {"status": "OK", "message": {"result": {}}}})).unwrap_err();
    assert_eq!(err.code, REQUEST_FAILURE);
}

#[test]
fn short_coordinate_is_request_failure() {
    use crate::error::REQUEST_FAILURE;
    use serde_json::json;

    let body = json!({"ret": {"status": "OK", "message": {"result": {"item": [
        {"route": {"time": 1.0, "distance": 10.0, "link": [{"line": {"coordinates": [[139.7]]}}]}}
    ]}}}});

    assert_eq!(parse(body).unwrap_err().code, REQUEST_FAILURE);
}

#[tokio::test]
async fn posts_to_drive_ptp() {
    use crate::testing::{route_response, RouteFixture};

    let fixture = RouteFixture::serve(route_response(
        65.0,
        1500.0,
        &[&[[139.7344, 35.7039], [139.7424, 35.7005]]],
    ))
    .await;

    let client = RouteMbnClient::new(fixture.base_url(), Some("secret".into()));
    let departure_time = DepartureTime::resolve(Some("20240401123000"), chrono::Utc::now());

    let route = client
        .request_route(
            Coordinates::new(35.7039, 139.7344),
            Coordinates::new(35.7005, 139.7424),
            &departure_time,
        )
        .await
        .unwrap();

    assert_eq!(route.polyline.len(), 2);

    let seen = fixture.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].api_key.as_deref(), Some("secret"));
    assert_eq!(seen[0].params.from, "139.7344,35.7039");
    assert_eq!(seen[0].params.departure_time.as_str(), "20240401123000");
}

#[tokio::test]
async fn http_error_is_request_failure() {
    use crate::error::REQUEST_FAILURE;
    use crate::testing::RouteFixture;
    use axum::http::StatusCode;

    let fixture = RouteFixture::serve_status(StatusCode::SERVICE_UNAVAILABLE).await;
    let client = RouteMbnClient::new(fixture.base_url(), None);
    let departure_time = DepartureTime::resolve(None, chrono::Utc::now());

    let err = client
        .request_route(
            Coordinates::new(35.7039, 139.7344),
            Coordinates::new(35.7005, 139.7424),
            &departure_time,
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, REQUEST_FAILURE);
}

#[tokio::test]
async fn unreachable_api_is_request_failure() {
    use crate::error::REQUEST_FAILURE;

    let client = RouteMbnClient::new("http://127.0.0.1:9", None);
    let departure_time = DepartureTime::resolve(None, chrono::Utc::now());

    let err = client
        .request_route(
            Coordinates::new(35.7039, 139.7344),
            Coordinates::new(35.7005, 139.7424),
            &departure_time,
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, REQUEST_FAILURE);
}
