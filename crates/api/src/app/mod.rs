//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and credential wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response DTOs and literal messages
//! - `validation.rs`: request body field checks
//! - `errors.rs`: consistent error responses

use axum::Router;
use tower_http::normalize_path::NormalizePath;

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod validation;

pub use services::SharedUserService;

/// The router behind trailing-slash normalization, which must run before
/// routing. Serve it through `axum::ServiceExt::into_make_service`.
pub type App = NormalizePath<Router>;

/// Build the full HTTP application (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<App> {
    let service = services::build_services(config).await?;
    Ok(app(service, &config.base_path))
}

/// Application over an already-built service (used by `build_app` and tests).
///
/// `/api/users/` and `/api/users/5/` reach the same handlers as their
/// slash-less forms.
pub fn app(service: SharedUserService, base_path: &str) -> App {
    NormalizePath::trim_trailing_slash(routes::router(service, base_path))
}
