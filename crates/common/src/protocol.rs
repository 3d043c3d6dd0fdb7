// Request/response bodies of the local review HTTP API.

use serde::{Deserialize, Serialize};

/// `GET /api/document`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentResponse {
    pub filename: String,
    pub content: String,
    /// The file on disk no longer matches the content under review.
    #[serde(default)]
    pub source_changed: bool,
}

/// `POST /api/comments`
///
/// Line numbers are signed so that out-of-range input reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddCommentRequest {
    pub start_line: i64,
    pub end_line: i64,
    pub body: String,
}

/// `PUT /api/comments/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCommentRequest {
    pub body: String,
}

/// `GET /api/stale`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaleNoticeResponse {
    pub notice: String,
}

/// Generic `{"status": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into() }
    }
}

/// `POST /api/finish`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinishResponse {
    pub status: String,
    pub review_file: String,
}
