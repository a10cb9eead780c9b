use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::crypto::CryptoError;
use crate::db::StoreError;
use crate::validation::FieldError;

pub const DUPLICATE_CHECKIN_MESSAGE: &str = "You have already checked in today";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Duplicate check-in for today")]
    DuplicateCheckin,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateDay => AppError::DuplicateCheckin,
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::DuplicateCheckin => StatusCode::BAD_REQUEST,
            AppError::Crypto(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::DuplicateCheckin => json!({
                "errors": [FieldError {
                    field: None,
                    code: "duplicate_checkin".into(),
                    message: DUPLICATE_CHECKIN_MESSAGE.into(),
                }],
            }),
            AppError::Unauthorized => json!({
                "error": {
                    "message": self.to_string(),
                    "code": status.as_u16(),
                }
            }),
            // Logged where it happened, with the record or user id.
            AppError::Crypto(_) => internal_body(status),
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
                internal_body(status)
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_body(status: StatusCode) -> serde_json::Value {
    json!({
        "error": {
            "message": "Internal server error",
            "code": status.as_u16(),
        }
    })
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn store_duplicate_maps_to_duplicate_checkin() {
        let err: AppError = StoreError::DuplicateDay.into();
        assert!(matches!(err, AppError::DuplicateCheckin));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    #[traced_test]
    fn crypto_errors_are_internal_and_not_logged_again() {
        let err: AppError = CryptoError::Decryption.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!logs_contain("failed to decrypt journal entry"));
    }

    #[test]
    fn validation_errors_are_client_errors() {
        let err = AppError::Validation(vec![FieldError::new(
            Some("moodRating"),
            "range",
            "Mood rating must be between 1 and 10",
        )]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
