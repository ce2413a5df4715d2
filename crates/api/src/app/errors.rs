use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use userdesk_core::DomainError;
use userdesk_infra::{ServiceError, StoreError};

use crate::app::dto;
use crate::app::validation::FieldError;

/// Map a service failure to a 500 carrying the failure's message.
///
/// Every variant is a server error: wrong credentials and unknown ids are
/// reported through `Ok` values, never through `ServiceError`.
pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let kind = match &err {
        ServiceError::Domain(DomainError::InvalidId(_)) => "invalid_id",
        ServiceError::Domain(DomainError::NotFound(_)) => "not_found",
        ServiceError::Domain(DomainError::Conflict(_)) => "conflict",
        ServiceError::Credentials(_) => "credentials",
        ServiceError::Store(StoreError::Database(_)) => "database",
        ServiceError::Store(StoreError::Unavailable(_)) => "store_unavailable",
        ServiceError::Store(StoreError::Domain(_)) => "store_domain",
        ServiceError::Task(_) => "task",
    };
    tracing::error!(kind, error = %err, "user service call failed");

    json_message(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// A bare JSON string body.
pub fn json_message(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(message.into())).into_response()
}

pub fn validation_failed(errors: Vec<FieldError>) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(dto::ValidationErrors { errors })).into_response()
}
