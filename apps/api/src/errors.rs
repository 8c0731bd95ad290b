use std::fmt::Display;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A credential the endpoint needs was not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An upstream call failed. `message` is endpoint-specific, `details` is the
    /// underlying error text.
    #[error("{message}: {details}")]
    Failed { message: String, details: String },
}

impl AppError {
    pub fn failed(message: impl Into<String>, err: impl Display) -> Self {
        AppError::Failed {
            message: message.into(),
            details: err.to_string(),
        }
    }
}

/// Unwraps an extracted JSON body. A request without a JSON content type reads as
/// an empty object; malformed or mistyped JSON is a validation error.
pub fn json_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            AppError::Configuration(message) => {
                tracing::error!("Configuration error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
            AppError::Failed { message, details } => {
                tracing::error!("{message} {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": message, "details": details }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_and_envelope_per_variant() {
        let (status, body) = render(AppError::Validation("User message is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "User message is required" }));

        let (status, body) = render(AppError::NotFound("Profile not found.".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Profile not found." }));

        let (status, body) = render(AppError::Configuration("GEMINI_API_KEY is not configured".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "GEMINI_API_KEY is not configured" }));

        let (status, body) = render(AppError::failed("Error generating image", "No image data found in response")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "message": "Error generating image", "details": "No image data found in response" })
        );
    }
}
