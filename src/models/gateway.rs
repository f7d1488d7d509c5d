//! Gateway settings and payment request log models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Gateway settings row from `gateway_settings`
#[derive(Debug, Clone, FromRow)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Request log row from `integration_requests`.
///
/// One row per issued payment link; its id is the `token` query parameter on
/// the manual-payment page.
#[derive(Debug, Clone, FromRow)]
pub struct IntegrationRequest {
    pub id: Uuid,
    pub service: String,
    pub status: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Integration request lifecycle states
pub mod request_status {
    pub const QUEUED: &str = "Queued";
    pub const COMPLETED: &str = "Completed";
    pub const FAILED: &str = "Failed";
}
