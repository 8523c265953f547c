use crate::logger::get_logger;
use crate::response::{self, Envelope, ResponseError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

// Simple liveness check. Keep it lightweight.
pub async fn health_handler() -> Result<Envelope, ResponseError> {
    get_logger("health").debug("Health check requested");
    response::success(&HealthStatus {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
