//! Server error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Invalid CSRF token")]
    InvalidCsrf,

    #[error("Step not found: {0}")]
    StepNotFound(u8),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<survey_core::Error> for SurveyError {
    fn from(err: survey_core::Error) -> Self {
        match err {
            survey_core::Error::UnknownStep(n) => SurveyError::StepNotFound(n),
            survey_core::Error::StepNotInVariant { step, .. } => SurveyError::StepNotFound(step),
            other => SurveyError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SurveyError::InvalidCsrf => (StatusCode::BAD_REQUEST, "Invalid CSRF token"),
            SurveyError::StepNotFound(step) => {
                tracing::debug!(step, "Step not found");
                (StatusCode::NOT_FOUND, "Step not found")
            }
            SurveyError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            SurveyError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "reason": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SurveyError::InvalidCsrf.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SurveyError::StepNotFound(9).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SurveyError::Internal("disk full".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_step_errors_become_not_found() {
        let err: SurveyError = survey_core::Error::StepNotInVariant {
            step: 5,
            variant: "simple",
        }
        .into();
        assert!(matches!(err, SurveyError::StepNotFound(5)));
    }
}
