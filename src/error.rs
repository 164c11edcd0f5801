use crate::{
    allocation::AllocationError, csv_codec::CsvError, database::DatabaseError,
    period::PeriodError, report::ReportError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Database(DatabaseError),
    Allocation(AllocationError),
    Csv(CsvError),
    Period(PeriodError),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::Database(err) => write!(f, "{}", err),
            AppError::Allocation(err) => write!(f, "{}", err),
            AppError::Csv(err) => write!(f, "{}", err),
            AppError::Period(err) => write!(f, "{}", err),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Database(err) => AppError::Database(err),
            AllocationError::Csv(err) => AppError::Csv(err),
            other => AppError::Allocation(other),
        }
    }
}

impl From<CsvError> for AppError {
    fn from(err: CsvError) -> Self {
        AppError::Csv(err)
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Database(err) => AppError::Database(err),
            ReportError::Period(err) => AppError::Period(err),
        }
    }
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        AppError::Period(err)
    }
}

impl AppError {
    fn status_and_category(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
            AppError::Database(DatabaseError::NotFound) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::Allocation(_) => (StatusCode::BAD_REQUEST, "Allocation error"),
            // an export that cannot be encoded is a server-side failure
            AppError::Csv(CsvError::Encode(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CSV error")
            }
            AppError::Csv(_) => (StatusCode::BAD_REQUEST, "CSV error"),
            AppError::Period(_) => (StatusCode::BAD_REQUEST, "Invalid period"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_category();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_app_error_display() {
        let config_err = AppError::Config(config::ConfigError::NotFound("test".to_string()));
        assert!(config_err.to_string().contains("Configuration error"));

        let internal_err = AppError::Internal("test message".to_string());
        assert_eq!(internal_err.to_string(), "Internal error: test message");

        let allocation_err = AppError::from(AllocationError::TeamDoesNotExist(4));
        assert_eq!(allocation_err.to_string(), "Team with id 4 does not exist");
    }

    #[test]
    fn test_allocation_error_unwraps_storage_failures() {
        let app_err: AppError =
            AllocationError::Database(DatabaseError::Database("gone".to_string())).into();
        assert!(matches!(app_err, AppError::Database(_)));

        let app_err: AppError = AllocationError::Csv(CsvError::EmptyFile).into();
        assert!(matches!(app_err, AppError::Csv(_)));
    }

    #[test]
    fn test_app_error_into_response() {
        let response = AppError::Config(config::ConfigError::NotFound("test".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::from(AllocationError::NoUsageType(1)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::Database(DatabaseError::Database("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::from(PeriodError::InvalidMonth {
            year: 2024,
            month: 13,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::Csv(CsvError::Decode("UTF-8".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_response_body_format() {
        let response = AppError::BadRequest("missing rows".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Bad request");
        assert_eq!(json["message"], "Bad request: missing rows");
    }
}
