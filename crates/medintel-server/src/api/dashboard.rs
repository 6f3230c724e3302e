use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use medintel_pipeline::{
    canonical_csv_bytes, chart_file_name, render_chart_html, ChartKind, CLEANED_CSV_FILE_NAME,
};

use crate::middleware::RequestId;
use crate::session::PublishedRun;

use super::{map_pipeline_error, runs::run_response, ApiError, AppState};

async fn current_run(state: &AppState, request_id: &str) -> Result<Arc<PublishedRun>, ApiError> {
    state.slot.current().await.ok_or_else(|| {
        ApiError::new(
            request_id,
            "not_found",
            "no dashboard yet; upload a CSV or run the sample first",
        )
    })
}

fn attachment(content_type: &'static str, file_name: &str, body: impl IntoResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let published = current_run(&state, &req_id.0).await?;
    Ok(run_response(req_id.0, &published))
}

pub(super) async fn download_cleaned_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let published = current_run(&state, &req_id.0).await?;
    let bytes = canonical_csv_bytes(&published.run.canonical)
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(attachment(
        "text/csv; charset=utf-8",
        CLEANED_CSV_FILE_NAME,
        bytes,
    ))
}

pub(super) async fn download_chart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let Some(kind) = ChartKind::from_key(&key) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("unknown chart: {key}"),
        ));
    };

    let published = current_run(&state, &req_id.0).await?;
    let table = published
        .run
        .dashboard
        .chart(kind)
        .and_then(|chart| chart.table.as_ref())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "aggregation_error",
                format!("chart {key} has no table for this run"),
            )
        })?;

    Ok(attachment(
        "text/html; charset=utf-8",
        &chart_file_name(kind),
        render_chart_html(table),
    ))
}
