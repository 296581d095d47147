use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// `{ "success": false, "error": message }` with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let envelope = json!({ "success": false, "error": message.into() });
    (status, Json(envelope)).into_response()
}

/// Every failure a handler can produce, translated to an HTTP status in one place.
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    /// An empty message renders as `Server Error`.
    Internal(String),
    /// Field validation failures; rendered as a single comma-joined message.
    Validation(Vec<String>),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// The 401 used by every protected route.
    pub fn not_authorized() -> Self {
        AppError::Unauthorized("Not authorized to access this route".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the envelope's `error` field.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(messages) => messages.join(", "),
            AppError::Internal(msg) if msg.is_empty() => "Server Error".to_string(),
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::debug!(%status, error = %message, "request rejected");
        }
        error_response(status, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AppError")
            .field(&self.status())
            .field(&self.message())
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn envelope(resp: Response) -> (StatusCode, serde_json::Value) {
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_renders_failure_envelope() {
        let (status, body) = envelope(AppError::not_found("Bootcamp not found with id of 1").into_response()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "error": "Bootcamp not found with id of 1"}));
    }

    #[tokio::test]
    async fn validation_messages_are_joined() {
        let err = AppError::Validation(vec!["Please add a name".into(), "Please add a description".into()]);
        let (status, body) = envelope(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please add a name, Please add a description");
    }

    #[tokio::test]
    async fn empty_internal_message_falls_back() {
        let (status, body) = envelope(AppError::internal("").into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server Error");
    }

    #[test]
    fn display_shows_status_and_message() {
        assert_eq!(AppError::not_authorized().to_string(), "401 Not authorized to access this route");
    }
}
