// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::error::SiteCheckError;
use crate::models::analysis::{AnalysisItem, Impact, Status};
use crate::models::category::Category;
use crate::models::report::{
    AccessibilityResult, CategoryResult, MobileResult, PerformanceResult, SecurityResult,
    SeoResult, SiteCheckReport,
};
use crate::models::version::VersionResponse;
use crate::services::fetcher::normalize_url;
use crate::services::logging::redact_url;
use crate::services::site_check::SiteChecker;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `SITE_CHECK_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("SITE_CHECK_VERSION");

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<SiteChecker>,
}

impl AppState {
    pub fn new(checker: SiteChecker) -> Self {
        Self {
            checker: Arc::new(checker),
        }
    }
}

/// Maps domain errors onto HTTP responses with a JSON `{"error": ...}` body
pub struct ApiError(pub SiteCheckError);

impl From<SiteCheckError> for ApiError {
    fn from(err: SiteCheckError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SiteCheckError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            other => {
                error!(error = %other, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Service name and version", body = VersionResponse))
)]
pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "site-check".to_string(),
        version: VERSION.to_string(),
    })
}

/// Run every analyzer against a percent-encoded URL
#[utoipa::path(
    get,
    path = "/site-check/{url}",
    params(("url" = String, Path, description = "Percent-encoded page URL")),
    responses(
        (status = 200, description = "Combined report", body = SiteCheckReport),
        (status = 400, description = "The URL is not a valid http(s) URL")
    )
)]
pub async fn site_check_handler(
    State(state): State<AppState>,
    Path(url): Path<String>,
) -> Result<Json<SiteCheckReport>, ApiError> {
    let url = normalize_url(&url)?;
    info!(url = %redact_url(url.as_str()), "site check requested");

    Ok(Json(state.checker.check_all(url.as_str()).await))
}

/// Run a single analyzer against a percent-encoded URL
#[utoipa::path(
    get,
    path = "/site-check/{url}/{category}",
    params(
        ("url" = String, Path, description = "Percent-encoded page URL"),
        ("category" = Category, Path, description = "Analyzer to run")
    ),
    responses(
        (status = 200, description = "Result of one analyzer", body = CategoryResult),
        (status = 400, description = "Invalid URL or unknown category")
    )
)]
pub async fn category_handler(
    State(state): State<AppState>,
    Path((url, category)): Path<(String, Category)>,
) -> Result<Json<CategoryResult>, ApiError> {
    let url = normalize_url(&url)?;
    info!(url = %redact_url(url.as_str()), %category, "category check requested");

    Ok(Json(state.checker.check(category, url.as_str()).await))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "site-check", description = "Website quality analyzer"),
    paths(version_handler, site_check_handler, category_handler),
    components(schemas(
        VersionResponse,
        Category,
        Status,
        Impact,
        AnalysisItem,
        PerformanceResult,
        SeoResult,
        SecurityResult,
        AccessibilityResult,
        MobileResult,
        CategoryResult,
        SiteCheckReport
    ))
)]
pub struct SiteCheckApiDoc;

/// Build the Axum application router, with Swagger UI at `/swagger-ui`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/site-check/{url}", get(site_check_handler))
        .route("/site-check/{url}/{category}", get(category_handler))
        .with_state(state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", SiteCheckApiDoc::openapi()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let checker = SiteChecker::from_config(&FetcherConfig::default(), Duration::from_secs(60))
            .expect("client should build");
        create_router(AppState::new(checker))
    }

    async fn send_get(uri: &str) -> Response {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_version_endpoint_response() {
        let response = send_get("/version").await;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let version_response: VersionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(version_response.agent, "site-check");
        assert_eq!(version_response.version, VERSION);
    }

    #[test]
    fn test_version_follows_semver_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.parse::<u32>().is_ok()));
    }

    #[tokio::test]
    async fn test_invalid_route_returns_404() {
        let response = send_get("/invalid").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_scheme_returns_400() {
        let response = send_get("/site-check/ftp%3A%2F%2Fexample.com%2Ffile").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("unsupported scheme 'ftp'"));
    }

    #[tokio::test]
    async fn test_category_route_rejects_invalid_url() {
        let response = send_get("/site-check/ftp%3A%2F%2Fexample.com/seo").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_category_returns_400() {
        let response = send_get("/site-check/example.com/speed").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = send_get("/api-docs/openapi.json").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["paths"]["/site-check/{url}"].is_object());
        assert!(body["paths"]["/site-check/{url}/{category}"].is_object());
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let response = ApiError(SiteCheckError::Decode("bad gzip".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
