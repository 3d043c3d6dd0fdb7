use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marginalia_common::error::ReviewError;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    DiskWriteFailed,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::DiskWriteFailed => "DISK_WRITE_FAILED",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DiskWriteFailed => StatusCode::INSUFFICIENT_STORAGE,
        }
    }

    pub const fn retryable(self) -> bool {
        matches!(self, Self::DiskWriteFailed)
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<ReviewError> for ApiError {
    fn from(error: ReviewError) -> Self {
        let code = match error {
            ReviewError::Validation(_) => ErrorCode::ValidationFailed,
            ReviewError::NotFound(_) => ErrorCode::NotFound,
        };
        Self::new(code, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.code.status(),
            Json(json!({
                "error": {
                    "code": self.code.as_str(),
                    "message": self.message,
                    "retryable": self.code.retryable(),
                }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("error response body should be readable");
        serde_json::from_slice(&body).expect("error response body should be valid json")
    }

    #[tokio::test]
    async fn validation_error_maps_to_400() {
        let response = ApiError::from(ReviewError::validation("comment body is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = body_json(response).await;
        assert_eq!(parsed["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(parsed["error"]["retryable"], false);
        assert_eq!(parsed["error"]["message"], "validation failed: comment body is required");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let response = ApiError::from(ReviewError::not_found("c3")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn disk_write_failure_is_retryable() {
        let response = ApiError::new(ErrorCode::DiskWriteFailed, "disk full").into_response();
        assert_eq!(response.status(), StatusCode::INSUFFICIENT_STORAGE);
        assert_eq!(body_json(response).await["error"]["retryable"], true);
    }
}
