// Comment endpoints.
//
// Routes:
//   GET    /api/comments        list (insertion order)
//   POST   /api/comments        create
//   PUT    /api/comments/{id}   edit body
//   DELETE /api/comments/{id}   delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use marginalia_common::error::ReviewError;
use marginalia_common::protocol::{AddCommentRequest, StatusResponse, UpdateCommentRequest};
use marginalia_common::types::Comment;

use super::error::ApiError;
use super::validation::ValidatedJson;
use crate::review::ReviewService;

pub async fn list_comments(State(service): State<ReviewService>) -> Json<Vec<Comment>> {
    Json(service.get_comments())
}

pub async fn create_comment(
    State(service): State<ReviewService>,
    ValidatedJson(req): ValidatedJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = service.add_comment(req.start_line, req.end_line, &req.body)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(service): State<ReviewService>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(service.update_comment(&id, &req.body)?))
}

pub async fn delete_comment(
    State(service): State<ReviewService>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    if !service.delete_comment(&id) {
        return Err(ReviewError::not_found(id).into());
    }
    Ok(Json(StatusResponse::new("deleted")))
}
