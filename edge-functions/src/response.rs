use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub static HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
];

pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "Not found";

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize response payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializes to the host wire shape `{"statusCode", "headers", "body"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    #[serde(rename = "statusCode", serialize_with = "serialize_status")]
    status: StatusCode,
    #[serde(serialize_with = "serialize_headers")]
    headers: &'static [(&'static str, &'static str)],
    body: String,
}

impl Envelope {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        for &(name, value) in self.headers {
            headers.insert(name, HeaderValue::from_static(value));
        }
        response
    }
}

// All envelope bodies are encoded here.
fn render(status: StatusCode, body: Value) -> Envelope {
    Envelope {
        status,
        headers: HEADERS,
        body: body.to_string(),
    }
}

/// Wrap `payload` in a 200 success envelope.
pub fn success<T: Serialize>(payload: &T) -> Result<Envelope, ResponseError> {
    success_with_status(payload, StatusCode::OK)
}

/// Wrap `payload` in a success envelope with a caller-chosen status, e.g. 201.
pub fn success_with_status<T: Serialize>(
    payload: &T,
    status: StatusCode,
) -> Result<Envelope, ResponseError> {
    let data = serde_json::to_value(payload)?;
    Ok(render(status, json!({ "success": true, "data": data })))
}

pub fn error(message: impl AsRef<str>) -> Envelope {
    error_with_status(message, StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn error_with_status(message: impl AsRef<str>, status: StatusCode) -> Envelope {
    render(
        status,
        json!({ "success": false, "error": { "message": message.as_ref() } }),
    )
}

pub fn not_found() -> Envelope {
    not_found_with_message(DEFAULT_NOT_FOUND_MESSAGE)
}

pub fn not_found_with_message(message: impl AsRef<str>) -> Envelope {
    error_with_status(message, StatusCode::NOT_FOUND)
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

fn serialize_headers<S: Serializer>(
    headers: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(headers.len()))?;
    for (name, value) in headers.iter() {
        map.serialize_entry(name, value)?;
    }
    map.end()
}
