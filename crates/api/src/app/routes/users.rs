use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::PathRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use userdesk_core::{DomainError, NewUser, UserId, UserUpdate};
use userdesk_infra::UserService;

use crate::app::services::SharedUserService;
use crate::app::{dto, errors, validation};

const SIGNUP_FIELDS: &[&str] = &["fullName", "userName", "email", "password"];
const UPDATE_FIELDS: &[&str] = &["userName", "email", "password"];

/// Users router. Mount it under whatever base path the application uses.
pub fn router(service: SharedUserService) -> Router {
    Router::new()
        .route("/", get(list_users).delete(delete_all_users))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .layer(Extension(service))
}

pub async fn list_users(Extension(service): Extension<SharedUserService>) -> Response {
    match service.list_users().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(service): Extension<SharedUserService>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match user_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match service.get_user(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => errors::json_message(StatusCode::BAD_REQUEST, dto::USER_NOT_FOUND),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn signup(
    Extension(service): Extension<SharedUserService>,
    body: Option<Json<Value>>,
) -> Response {
    let record: NewUser = match validated(body, SIGNUP_FIELDS) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match service.create_user(record).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::SignupResponse::new(user))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(service): Extension<SharedUserService>,
    id: Result<Path<String>, PathRejection>,
    body: Option<Json<Value>>,
) -> Response {
    let record: UserUpdate = match validated(body, UPDATE_FIELDS) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let id = match user_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match service.update_user(record, id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(service): Extension<SharedUserService>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match user_id(id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match service.delete_user(id).await {
        Ok(()) => errors::json_message(StatusCode::NO_CONTENT, dto::USER_DELETED),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_all_users(Extension(service): Extension<SharedUserService>) -> Response {
    match service.delete_all_users().await {
        Ok(()) => errors::json_message(StatusCode::NO_CONTENT, dto::USERS_DELETED),
        Err(e) => {
            // The client only ever sees the generic message.
            tracing::error!(error = %e, "bulk user delete failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(dto::MessageBody {
                    message: dto::BULK_DELETE_FAILED,
                }),
            )
                .into_response()
        }
    }
}

pub async fn login(
    Extension(service): Extension<SharedUserService>,
    body: Option<Json<Value>>,
) -> Response {
    let body = body_or_empty(body);
    let email = validation::string_or_empty(&body, "email");
    let password = validation::string_or_empty(&body, "password");

    match service.log_user(email, password).await {
        Ok(Some(token)) if !token.is_empty() => (
            StatusCode::OK,
            AppendHeaders([(SET_COOKIE, dto::auth_cookie(&token))]),
            Json(dto::StatusEnvelope::logged_in(token)),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::BAD_REQUEST,
            Json(dto::StatusEnvelope::wrong_credentials()),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Parse the `:id` segment. Undecodable segments and non-numeric ids both
/// take the 500 service-failure path.
fn user_id(id: Result<Path<String>, PathRejection>) -> Result<UserId, Response> {
    id.map_err(|rejection| DomainError::invalid_id(rejection.body_text()))
        .and_then(|Path(raw)| UserId::parse_lenient(&raw))
        .map_err(|e| errors::service_error_to_response(e.into()))
}

/// A missing or unparseable JSON body behaves like `{}`.
fn body_or_empty(body: Option<Json<Value>>) -> Value {
    body.map(|Json(v)| v)
        .unwrap_or_else(|| Value::Object(Default::default()))
}

/// Type-check `fields`, then decode the body into `T`.
fn validated<T: DeserializeOwned>(body: Option<Json<Value>>, fields: &[&str]) -> Result<T, Response> {
    let body = body_or_empty(body);
    if let Err(field_errors) = validation::require_strings(&body, fields) {
        return Err(errors::validation_failed(field_errors));
    }

    serde_json::from_value(body)
        .map_err(|e| errors::json_message(StatusCode::BAD_REQUEST, e.to_string()))
}
