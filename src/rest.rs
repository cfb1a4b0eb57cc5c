// Copyright 2026 Vahan Lookup Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP JSON API for vehicle lookups.
//!
//! A thin layer over the fetch and extract stages: a static banner
//! route, the lookup route, and a health probe. Each request is
//! self-contained; the only shared state is the outbound client.

use crate::extract;
use crate::fetch::PageClient;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Error body returned when the upstream fetch fails.
///
/// Kept byte-identical to what callers of the deployed service already
/// see, trailing template tail included. The real failure goes to the
/// log, not the response.
const FETCH_ERROR_BODY: &str = "❌ Unable to fetch data: ";

/// Shared state for all routes.
pub struct AppState {
    pub client: PageClient,
}

/// Build the axum Router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/lookup", get(lookup))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given port.
pub async fn start(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("lookup API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

/// Static service banner. Always the same body, whatever the query.
async fn home() -> Json<Value> {
    Json(serde_json::json!({
        "message": "🚗 Welcome to NGYT777GG VEHICLE INFO API",
        "usage": "/lookup?rc=MH12DE1433",
        "author": "@NGYT777GG"
    }))
}

/// Liveness probe.
async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Query parameters for the lookup route.
#[derive(Deserialize)]
struct LookupParams {
    /// Vehicle registration number.
    rc: String,
}

/// Look up a registration number and return the extracted record.
///
/// A missing `rc` is rejected by the query extractor before this body
/// runs. Fetch failures map to 400 with the fixed error body; a page
/// that extracts to nothing is still a 200 with whatever was found.
async fn lookup(
    Query(params): Query<LookupParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.client.fetch_page(&params.rc).await {
        Ok(body) => {
            let record = extract::scrape_record(&body);
            tracing::info!(rc = %params.rc, sections = record.len(), "lookup served");
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(e) => {
            tracing::warn!(rc = %params.rc, error = %e, "lookup fetch failed");
            let body = serde_json::json!({ "error": FETCH_ERROR_BODY });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_home_is_fixed() {
        let Json(body) = home().await;
        assert_eq!(body["message"], "🚗 Welcome to NGYT777GG VEHICLE INFO API");
        assert_eq!(body["usage"], "/lookup?rc=MH12DE1433");
        assert_eq!(body["author"], "@NGYT777GG");
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
