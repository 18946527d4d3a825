pub mod payload;
pub mod signature;
pub mod webhook;

use {crate::AppState, axum::{Json, extract::State}};

pub const WEBHOOK_PATH: &str = "/webhook/bold";

/// Status check for operators wiring up the provider dashboard.
pub async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Bold webhook endpoint active",
        "url_path": WEBHOOK_PATH,
        "secret_configured": state.webhook_secret.is_some(),
        "environment": state.environment.as_str(),
        "supported_events": payload::SUPPORTED_EVENTS,
        "timestamp": chrono::Utc::now(),
    }))
}
