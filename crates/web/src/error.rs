//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use krepo_core::AppError;

/// Error returned by an API handler.
#[derive(Debug)]
pub enum ApiError {
    /// Another question is still being answered
    Busy,

    /// The request body could not be decoded
    InvalidRequest(String),

    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Busy => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::EmptyQuery) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::ExternalService(_)) => StatusCode::BAD_GATEWAY,
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Busy => "busy",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::App(err) => err.kind(),
        }
    }

    /// Message shown to the user.
    pub fn message(&self) -> String {
        match self {
            ApiError::Busy => "另一個查詢正在處理中，請稍候再試".to_string(),
            ApiError::InvalidRequest(msg) => format!("無效的請求: {}", msg),
            ApiError::App(AppError::EmptyQuery) => "請輸入您的問題".to_string(),
            ApiError::App(AppError::ExternalService(msg)) => format!("查詢失敗: {}", msg),
            ApiError::App(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self.message());
        } else {
            tracing::debug!(kind = self.kind(), "Request rejected: {}", self.message());
        }

        let body = serde_json::json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.message(),
        });

        (status, Json(body)).into_response()
    }
}
