// Document, stale-notice and finish endpoints.

use axum::{extract::State, Json};
use marginalia_common::protocol::{
    DocumentResponse, FinishResponse, StaleNoticeResponse, StatusResponse,
};
use tracing::error;

use super::error::{ApiError, ErrorCode};
use crate::review::ReviewService;

pub async fn get_document(State(service): State<ReviewService>) -> Json<DocumentResponse> {
    Json(service.get_document())
}

pub async fn get_stale_notice(State(service): State<ReviewService>) -> Json<StaleNoticeResponse> {
    Json(StaleNoticeResponse { notice: service.get_stale_notice() })
}

pub async fn clear_stale_notice(State(service): State<ReviewService>) -> Json<StatusResponse> {
    service.clear_stale_notice();
    Json(StatusResponse::new("ok"))
}

pub async fn finish(State(service): State<ReviewService>) -> Result<Json<FinishResponse>, ApiError> {
    match service.finish() {
        Ok(review_file) => Ok(Json(FinishResponse {
            status: "finished".to_string(),
            review_file: review_file.display().to_string(),
        })),
        Err(err) => {
            error!(error = ?err, "final flush failed");
            Err(ApiError::new(ErrorCode::DiskWriteFailed, format!("failed to write review: {err:#}")))
        }
    }
}
