//! `POST /v1/eligibility` — run the retrieval pipeline for one profile.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{Value, json};
use tracing::{Instrument, error, info, info_span};

use schemefinder_core::{Error, Profile, RetrievalOutcome};

use crate::SharedState;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Handler for `POST /v1/eligibility`.
///
/// Body: `{"state", "gender", "income", "age"}`; the API key travels in
/// `x-api-key`. Transport and parse failures still answer 200 with a
/// fallback outcome.
pub async fn eligibility_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<RetrievalOutcome>, ApiError> {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "API key is required"))?;

    let profile: Profile = serde_json::from_value(body)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid profile: {e}")))?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("eligibility", %request_id);

    let outcome = state
        .orchestrator
        .retrieve(&profile, key)
        .instrument(span.clone())
        .await
        .map_err(|e| {
            error!(parent: &span, error = %e, "Retrieval failed");
            match e {
                Error::MissingCredential => api_error(StatusCode::BAD_REQUEST, e.to_string()),
                other => api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            }
        })?;

    info!(
        parent: &span,
        records = outcome.records.len(),
        fallback = outcome.used_fallback,
        "Eligibility request served"
    );
    Ok(Json(outcome))
}
