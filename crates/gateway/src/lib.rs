//! HTTP gateway for SchemeFinder.
//!
//! Exposes the trusted relay that the `relay` transport strategy talks to,
//! an eligibility endpoint running the full retrieval pipeline, and a health
//! check.
//!
//! Built on Axum.

pub mod eligibility;
pub mod relay;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method, header};
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use schemefinder_config::AppConfig;
use schemefinder_retrieval::RetrievalOrchestrator;

/// Shared application state for the gateway.
pub struct GatewayState {
    /// Provider base URL the relay forwards to
    pub upstream_url: String,
    /// Client used for relay forwarding
    pub client: reqwest::Client,
    /// Pipeline behind `/v1/eligibility`
    pub orchestrator: RetrievalOrchestrator,
}

impl GatewayState {
    pub fn new(
        upstream_url: impl Into<String>,
        upstream_timeout: Duration,
        orchestrator: RetrievalOrchestrator,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(upstream_timeout)
            .build()?;

        Ok(Self {
            upstream_url: upstream_url.into(),
            client,
            orchestrator,
        })
    }
}

pub type SharedState = Arc<GatewayState>;

/// Headers browsers may send to the relay.
const ALLOWED_HEADERS: [&str; 6] = [
    "authorization",
    "x-client-info",
    "apikey",
    "content-type",
    "x-api-key",
    "anthropic-version",
];

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Permissive CORS (any origin) for the relay's browser callers
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
        .expose_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/relay", post(relay::relay_handler))
        .route("/v1/eligibility", post(eligibility::eligibility_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = RetrievalOrchestrator::from_config(&config)?;
    let state = Arc::new(GatewayState::new(
        config.gateway.upstream_url.clone(),
        Duration::from_secs(config.gateway.upstream_timeout_secs),
        orchestrator,
    )?);

    let app = build_router(state);

    info!(
        addr = %addr,
        upstream = %config.gateway.upstream_url,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{call, state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = call(state("http://127.0.0.1:1", "http://127.0.0.1:1"), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn relay_preflight_allows_any_origin() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/v1/relay")
            .header("origin", "https://schemes.example.org")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "x-api-key,content-type")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = call(state("http://127.0.0.1:1", "http://127.0.0.1:1"), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "*");
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains("x-api-key"));
        assert!(allowed.contains("anthropic-version"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let req = Request::builder()
            .uri("/v1/unknown")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = call(state("http://127.0.0.1:1", "http://127.0.0.1:1"), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
