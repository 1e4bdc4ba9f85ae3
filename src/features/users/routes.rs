use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Create routes for the users feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", get(handlers::list_users))
        .route(
            "/api/users/me",
            get(handlers::get_self).patch(handlers::update_self),
        )
        .route(
            "/api/users/{userId}",
            patch(handlers::update_user).delete(handlers::delete_user),
        )
        .with_state(service)
}
