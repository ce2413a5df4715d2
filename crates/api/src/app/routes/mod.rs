use axum::{Router, routing::get};

use crate::app::services::SharedUserService;

pub mod system;
pub mod users;

/// Root router: health check plus the users router mounted at `base_path`.
///
/// An empty `base_path` mounts the users routes at the root.
pub fn router(service: SharedUserService, base_path: &str) -> Router {
    let root = Router::new().route("/health", get(system::health));
    let users = users::router(service);

    if base_path.is_empty() || base_path == "/" {
        root.merge(users)
    } else {
        root.nest(base_path, users)
    }
}
