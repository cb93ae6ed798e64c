use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use dscope_pipeline::normalize_handle;
use dscope_store::SubjectRecord;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SubjectSummaryItem {
    handle: String,
    last_analyzed_at: DateTime<Utc>,
    history_count: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentQuery {
    pub limit: Option<usize>,
}

pub(super) async fn list_recent(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<Vec<SubjectSummaryItem>>>, ApiError> {
    let records = state
        .store
        .recent(normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let data = records
        .into_iter()
        .map(|record| SubjectSummaryItem {
            history_count: record.history.len(),
            handle: record.handle,
            last_analyzed_at: record.last_analyzed_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// The full stored record: current profile plus archived history.
pub(super) async fn get_subject(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(handle): Path<String>,
) -> Result<Json<ApiResponse<SubjectRecord>>, ApiError> {
    let Some(key) = normalize_handle(&handle) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            format!("invalid handle: {handle:?}"),
        ));
    };

    let record = state
        .store
        .get(&key)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no analysis stored for {key}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}
