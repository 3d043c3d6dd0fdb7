// Local HTTP surface for the browser review UI.
//
// Routes:
//   GET    /api/document
//   GET    /api/comments          POST /api/comments
//   PUT    /api/comments/{id}     DELETE /api/comments/{id}
//   GET    /api/stale             DELETE /api/stale
//   POST   /api/finish
//   GET    /healthz

pub mod comments;
pub mod document;
pub mod error;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::review::ReviewService;

pub fn router(service: ReviewService) -> Router {
    Router::new()
        .route("/api/document", get(document::get_document))
        .route("/api/comments", get(comments::list_comments).post(comments::create_comment))
        .route(
            "/api/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/api/stale",
            get(document::get_stale_notice).delete(document::clear_stale_notice),
        )
        .route("/api/finish", post(document::finish))
        .route("/healthz", get(healthz))
        .with_state(service)
        .layer(DefaultBodyLimit::max(validation::MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}
