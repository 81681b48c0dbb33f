//! Trusted relay — forwards a Messages API body to the upstream provider.
//!
//! The caller supplies only the API key; the relay adds the protocol-version
//! header and reports upstream failures as JSON.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use schemefinder_transport::wire::{ANTHROPIC_VERSION, messages_url};

use crate::SharedState;

const MISSING_KEY: &str = "API key is required";
const UPSTREAM_FAILED: &str = "Error calling upstream API";

#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// API key from the `x-api-key` header, else the `apiKey` query parameter.
fn api_key(headers: &HeaderMap, query: &RelayQuery) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            query
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
        })
}

/// Handler for `POST /v1/relay`.
pub async fn relay_handler(
    State(state): State<SharedState>,
    Query(query): Query<RelayQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(key) = api_key(&headers, &query) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_KEY }))).into_response();
    };

    let url = messages_url(&state.upstream_url);
    debug!(url = %url, body_len = body.len(), "Relaying request upstream");

    let upstream = state
        .client
        .post(&url)
        .header("x-api-key", key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Upstream unreachable");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": format!("Failed to reach upstream API: {e}"),
                    "proxy": true
                })),
            )
                .into_response();
        }
    };

    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Upstream body unreadable");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": format!("Failed to read upstream response: {e}"),
                    "proxy": true
                })),
            )
                .into_response();
        }
    };

    if status.is_success() {
        return (status, [(header::CONTENT_TYPE, "application/json")], text).into_response();
    }

    let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
    let message = details["error"]["message"]
        .as_str()
        .unwrap_or(UPSTREAM_FAILED)
        .to_string();
    warn!(status = status.as_u16(), error = %message, "Upstream returned an error");

    (status, Json(json!({ "error": message, "details": details }))).into_response()
}
