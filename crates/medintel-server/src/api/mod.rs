mod dashboard;
mod runs;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use medintel_insights::ConfiguredProvider;
use medintel_pipeline::PipelineError;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_run_quota, request_id, require_api_key, ApiKeys, RequestId, RunQuota,
};
use crate::session::DashboardSlot;

#[derive(Clone)]
pub struct AppState {
    pub slot: Arc<DashboardSlot>,
    pub provider: Arc<ConfiguredProvider>,
    pub insight_timeout: Duration,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    insights: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "schema_error" | "date_parse_error" | "csv_error" => {
                StatusCode::BAD_REQUEST
            }
            "aggregation_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    let code = error.code();
    if code == "internal_error" {
        tracing::error!(error = %error, "pipeline run failed");
        return ApiError::new(request_id, code, "internal error while processing upload");
    }
    tracing::warn!(code, error = %error, "upload rejected");
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Pipeline runs: metered per caller, behind the api key check.
fn runs_router(keys: ApiKeys, quota: RunQuota, max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/v1/runs", post(runs::create_run))
        .route("/api/v1/runs/sample", post(runs::create_sample_run))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route_layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(keys, require_api_key))
                .layer(axum::middleware::from_fn_with_state(
                    quota,
                    enforce_run_quota,
                )),
        )
}

/// Reads of the published dashboard: api key only, no quota.
fn dashboard_router(keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/v1/dashboard/cleaned.csv",
            get(dashboard::download_cleaned_csv),
        )
        .route(
            "/api/v1/dashboard/charts/{key}",
            get(dashboard::download_chart),
        )
        .route_layer(axum::middleware::from_fn_with_state(keys, require_api_key))
}

pub fn build_app(state: AppState, keys: ApiKeys, quota: RunQuota) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .merge(public_routes)
        .merge(runs_router(keys.clone(), quota, max_upload_bytes))
        .merge(dashboard_router(keys))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let insights = if state.provider.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            insights,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Ten runs per caller per minute.
pub fn default_run_quota() -> RunQuota {
    RunQuota::new(10, Duration::from_secs(60))
}
