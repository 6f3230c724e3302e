use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use medintel_insights::{process_dataset, Dashboard};
use medintel_pipeline::{read_raw_csv, sample_dataset, PipelineError, RawDataset};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::session::PublishedRun;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Response payload for a published run.
#[derive(Debug, Serialize)]
pub(super) struct RunView<'a> {
    run_id: Uuid,
    completed_at: DateTime<Utc>,
    dashboard: &'a Dashboard,
}

impl<'a> From<&'a PublishedRun> for RunView<'a> {
    fn from(published: &'a PublishedRun) -> Self {
        Self {
            run_id: published.run_id,
            completed_at: published.completed_at,
            dashboard: &published.run.dashboard,
        }
    }
}

/// Serializes a published run in the response envelope.
pub(super) fn run_response(request_id: String, published: &PublishedRun) -> Response {
    Json(ApiResponse {
        data: RunView::from(published),
        meta: ResponseMeta::new(request_id),
    })
    .into_response()
}

async fn execute_run(
    state: &AppState,
    request_id: String,
    load: impl FnOnce() -> Result<RawDataset, PipelineError>,
) -> Result<Arc<PublishedRun>, ApiError> {
    let ticket = state.slot.begin_run().await;

    let result = match load() {
        Ok(raw) => process_dataset(raw, state.provider.as_ref(), state.insight_timeout).await,
        Err(e) => Err(e),
    };

    let run = match result {
        Ok(run) => run,
        Err(e) => {
            state.slot.clear(ticket).await;
            return Err(map_pipeline_error(request_id, &e));
        }
    };

    state.slot.publish(ticket, run).await.ok_or_else(|| {
        ApiError::new(
            request_id,
            "conflict",
            "a newer run started before this one finished; its results were discarded",
        )
    })
}

pub(super) async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let published =
        execute_run(&state, req_id.0.clone(), || read_raw_csv(body.as_ref())).await?;
    Ok(run_response(req_id.0, &published))
}

pub(super) async fn create_sample_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let published = execute_run(&state, req_id.0.clone(), || Ok(sample_dataset())).await?;
    Ok(run_response(req_id.0, &published))
}
