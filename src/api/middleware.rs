//! Request Plumbing
//!
//! Bearer-token extraction and the mapping from service errors onto HTTP
//! responses.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::services::ServiceError;
use crate::types::requests::ErrorResponse;

/// An error ready to be rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                code: code.to_string(),
            },
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Validation(_)
            | ServiceError::AmountInvalid(_)
            | ServiceError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            ServiceError::RecipientNotFound(_)
            | ServiceError::ItemNotFound(_)
            | ServiceError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized | ServiceError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServiceError::Token(_) | ServiceError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Storage and token faults reach the caller as a generic failure.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(target: "merchstore::api", error = %err, "request failed");
            "internal error".to_string()
        } else {
            err.to_string()
        };

        Self::new(status, err.error_code(), message)
    }
}

/// Extract the bearer token from an Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::unauthorized("invalid authorization header")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc123")).unwrap(), "abc123");

        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers_with("abc123")).is_err());
        assert!(bearer_token(&headers_with("Basic abc123")).is_err());
        assert!(bearer_token(&headers_with("Bearer ")).is_err());
    }

    #[test]
    fn test_service_error_status_mapping() {
        let err: ApiError = ServiceError::AmountInvalid(-1).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = ServiceError::RecipientNotFound("bob".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = ServiceError::Conflict("alice".to_string()).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError =
            ServiceError::Persistence(crate::storage::StorageError::Database("boom".to_string()))
                .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internals never leak to the caller.
        assert_eq!(err.body.error, "internal error");
    }
}
