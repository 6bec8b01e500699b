//! API error envelope.
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}` with
//! a status derived from the domain error. Store failures are logged and
//! reported without their details.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use novelforge_accounts::AccountError;
use novelforge_license::LicenseError;
use novelforge_monitor::MonitorError;
use serde_json::json;
use tracing::error;

const STORE_MESSAGE: &str = "internal storage error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn unauthenticated() -> Self {
        AccountError::Unauthenticated.into()
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    fn store(err: &dyn std::error::Error) -> Self {
        error!(error = %err, "store operation failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", STORE_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_request(rejection.body_text())
    }
}

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        let status = match &err {
            LicenseError::Storage(inner) => return Self::store(inner),
            LicenseError::LicenseNotFound | LicenseError::BindingNotFound => StatusCode::NOT_FOUND,
            LicenseError::Forbidden(_) | LicenseError::NotOwner(_) => StatusCode::FORBIDDEN,
            LicenseError::InvalidLicense
            | LicenseError::LicenseInactive
            | LicenseError::LicenseExpired
            | LicenseError::DeviceLimitExceeded(_)
            | LicenseError::DeviceAlreadyBound
            | LicenseError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        let status = match &err {
            MonitorError::Storage(inner) => return Self::store(inner),
            MonitorError::EventNotFound => StatusCode::NOT_FOUND,
            MonitorError::Forbidden(_) => StatusCode::FORBIDDEN,
            MonitorError::EventAlreadyResolved | MonitorError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let status = match &err {
            AccountError::Storage(inner) => return Self::store(inner),
            AccountError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccountError::Forbidden(_)
            | AccountError::RoleNotPermitted { .. }
            | AccountError::NoValidLicense => StatusCode::FORBIDDEN,
            AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::AdminExists
            | AccountError::EmailTaken
            | AccountError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novelforge_storage::StorageError;

    #[test]
    fn license_errors_map_to_statuses() {
        let cases = [
            (LicenseError::InvalidLicense, StatusCode::BAD_REQUEST),
            (LicenseError::DeviceLimitExceeded(2), StatusCode::BAD_REQUEST),
            (LicenseError::LicenseNotFound, StatusCode::NOT_FOUND),
            (LicenseError::NotOwner("x".into()), StatusCode::FORBIDDEN),
            (
                LicenseError::Storage(StorageError::LockPoisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn store_details_are_hidden() {
        let err = ApiError::from(MonitorError::Storage(StorageError::InvalidData(
            "row 7 is corrupt".into(),
        )));
        assert_eq!(err.code, "STORE_ERROR");
        assert_eq!(err.message, STORE_MESSAGE);
    }

    #[test]
    fn account_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(AccountError::Unauthenticated).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccountError::NoValidLicense).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AccountError::UserNotFound).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AccountError::EmailTaken).status,
            StatusCode::BAD_REQUEST
        );
    }
}
