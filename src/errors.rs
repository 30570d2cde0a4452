use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::analytics::DateRangeError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Invalid from_date: expected YYYY-MM-DD, got '2024-13-01'",
    "code": "VALIDATION_ERROR",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Human-readable description; names the offending parameter for validation failures
    pub error: String,
    /// Stable machine-readable reason
    #[schema(example = "NOT_CONFIGURED")]
    pub code: String,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("{message}")]
    ValidationError { field: String, message: String },

    /// A reference entity the request depends on does not exist. Distinct
    /// from a period that simply holds no data, which is not an error.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DateRangeError> for ServiceError {
    fn from(err: DateRangeError) -> Self {
        ServiceError::ValidationError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::ValidationError {
            field: "query".to_string(),
            message: format!("Invalid query: {}", rejection.body_text()),
        }
    }
}

impl ServiceError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
        } else {
            warn!(error = %self, code = self.code(), "Request rejected");
        }

        let body = ErrorResponse {
            error: self.response_message(),
            code: self.code().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::NaiveDate;

    async fn body_of(err: ServiceError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::invalid_field("to_date", "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotConfigured("site".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::Other(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_error_names_field() {
        let err: ServiceError = DateRangeError::Malformed {
            field: "from_date",
            value: "yesterday".into(),
        }
        .into();
        assert!(matches!(&err, ServiceError::ValidationError { field, .. } if field == "from_date"));

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert!(body.error.contains("from_date"));
    }

    #[tokio::test]
    async fn inverted_range_maps_to_validation_error() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (status, body) = body_of(DateRangeError::Inverted { from, to }.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.starts_with("Invalid from_date"));
    }

    #[tokio::test]
    async fn not_configured_is_distinct() {
        let (status, body) = body_of(ServiceError::NotConfigured("no mining site configured".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NOT_CONFIGURED");
        assert_eq!(body.error, "Not configured: no mining site configured");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let (status, body) = body_of(ServiceError::DatabaseError(DbErr::Custom(
            "connection refused at 10.0.0.5".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Database error");
        assert!(!body.error.contains("10.0.0.5"));
    }
}
