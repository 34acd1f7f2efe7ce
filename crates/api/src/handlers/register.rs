//! Handler for the device registration endpoint.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /rules/{rule_id}/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Stable device identifier.
    pub device_id: String,
    /// Provider-specific push token.
    pub push_token: String,
}

/// Fallback provider key when the user agent matches no known platform.
/// The registration is still stored; no sender will pick it up.
const PROVIDER_UNKNOWN: &str = "unknown";

/// Infer the push provider from the client's user agent.
pub fn infer_provider(user_agent: Option<&str>) -> &'static str {
    let Some(agent) = user_agent else {
        return PROVIDER_UNKNOWN;
    };
    let agent = agent.to_ascii_lowercase();
    if agent.contains("android") {
        return "gcm";
    }
    if agent.contains("windows") {
        return "wns";
    }
    PROVIDER_UNKNOWN
}

/// POST /api/v1/rules/{rule_id}/register
///
/// Register a device's push token for a rule, keyed by
/// (provider, rule, device). Returns 204 on success, 404 for an unknown
/// rule, 400 for an empty device id or token.
pub async fn register_device(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if !state.rules.iter().any(|rule| rule.id == rule_id) {
        return Err(AppError::NotFound {
            entity: "Rule",
            id: rule_id,
        });
    }

    if request.device_id.is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }
    if request.push_token.is_empty() {
        return Err(AppError::BadRequest("push_token must not be empty".into()));
    }

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let provider = infer_provider(user_agent);

    tracing::info!(
        rule = %rule_id,
        provider,
        device = %request.device_id,
        "Device registration"
    );

    state
        .registry
        .register_client(provider, &rule_id, &request.device_id, &request.push_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_agents_map_to_gcm() {
        assert_eq!(infer_provider(Some("Dalvik/2.1 (Linux; Android 14)")), "gcm");
        assert_eq!(infer_provider(Some("ANDROID app")), "gcm");
    }

    #[test]
    fn windows_agents_map_to_wns() {
        assert_eq!(
            infer_provider(Some("Mozilla/5.0 (Windows NT 10.0)")),
            "wns"
        );
    }

    #[test]
    fn other_or_missing_agents_map_to_unknown() {
        assert_eq!(infer_provider(Some("curl/8.5.0")), "unknown");
        assert_eq!(infer_provider(None), "unknown");
    }
}
