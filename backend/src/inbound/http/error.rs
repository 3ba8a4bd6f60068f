//! HTTP adapter mapping for domain errors.
//!
//! The domain error stays HTTP-agnostic; this module picks the status code,
//! echoes the trace id header, and hides internal messages from clients.
//! Auth and validation failures are lifted into [`Error`] here so handlers
//! can use `?` throughout.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{AuthFailure, Error, ErrorCode, PetValidationError, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

impl From<AuthFailure> for Error {
    fn from(failure: AuthFailure) -> Self {
        let message = failure.to_string();
        let base = match &failure {
            _ if failure.is_validation() => Error::invalid_request(message),
            AuthFailure::InvalidCredentials => Error::unauthorized(message),
            AuthFailure::Rejected(_) => Error::invalid_request(message),
            AuthFailure::Unavailable => Error::service_unavailable(message),
            AuthFailure::TimedOut => Error::timeout(message),
            _ => Error::internal(message),
        };
        base.with_details(json!({ "reason": failure.code() }))
    }
}

impl From<PetValidationError> for Error {
    fn from(err: PetValidationError) -> Self {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.field().as_str(),
            "code": err.code(),
        }))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
