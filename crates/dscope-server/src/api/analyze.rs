use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use dscope_pipeline::{AnalysisOutcome, PipelineError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    handle: String,
}

pub(super) async fn analyze_subject(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;

    match state.analyzer.analyze(&body.handle).await {
        Ok(outcome) => {
            tracing::info!(
                handle = %outcome.handle,
                cached = outcome.meta.cached,
                history = outcome.meta.history_count,
                "analysis served"
            );
            Ok(Json(ApiResponse {
                data: outcome,
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        Err(error) => {
            log_failure(&body.handle, &error);
            Err(ApiError::from_pipeline(req_id.0, &error))
        }
    }
}

fn log_failure(handle: &str, error: &PipelineError) {
    let status = error.status();
    if status >= 500 {
        tracing::error!(handle, status, code = error.code(), error = %error, "analysis failed");
    } else {
        tracing::info!(handle, status, code = error.code(), "analysis refused");
    }
}
