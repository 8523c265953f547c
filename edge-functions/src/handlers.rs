pub use crate::connect::{connect_event_handler, connect_upgrade_handler};
pub use crate::health::health_handler;

use crate::logger::get_logger;
use crate::response::{self, Envelope, ResponseError};
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::error;

pub async fn not_found_handler(uri: Uri) -> Envelope {
    get_logger("router").debug(format!("No handler for {}", uri.path()));
    response::not_found()
}

// A payload that cannot be serialized never reaches the client as an envelope.
impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        error!("Failed to render response: {}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
