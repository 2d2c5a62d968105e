use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{self, Display};

pub const CONFIG: i32 = 2;
pub const SERVER: i32 = 3;

pub const INVALID_INPUT: i32 = 101;
pub const EMPTY_INPUT: i32 = 102;
pub const MISSING_DISPLAY_SINK: i32 = 103;
pub const REQUEST_FAILURE: i32 = 104;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        request_failure_error(format!("malformed response body: {}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            REQUEST_FAILURE => (StatusCode::BAD_GATEWAY, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error(detail: impl Into<String>) -> Error {
    Error {
        code: INVALID_INPUT,
        message: format!("invalid input: {}", detail.into()),
    }
}

pub fn empty_input_error() -> Error {
    Error {
        code: EMPTY_INPUT,
        message: "empty input: no coordinates".into(),
    }
}

pub fn missing_display_sink_error(element_id: &str) -> Error {
    Error {
        code: MISSING_DISPLAY_SINK,
        message: format!("missing display sink: {}", element_id),
    }
}

pub fn request_failure_error(detail: impl Into<String>) -> Error {
    Error {
        code: REQUEST_FAILURE,
        message: format!("route request failed: {}", detail.into()),
    }
}

pub fn config_error(detail: impl Into<String>) -> Error {
    Error {
        code: CONFIG,
        message: format!("configuration error: {}", detail.into()),
    }
}

pub fn server_error(detail: impl Into<String>) -> Error {
    Error {
        code: SERVER,
        message: format!("server error: {}", detail.into()),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    request_failure_error(format!("transport error: {}", err))
}

#[test]
fn client_errors_map_to_bad_request() {
    let response = invalid_input_error("order index 7").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = empty_input_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn internal_errors_map_to_server_error() {
    let response = config_error("bad viewport").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn request_failures_map_to_bad_gateway() {
    let response = request_failure_error("status NG").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
