use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::branches::handlers;
use crate::features::branches::services::BranchService;

/// Create routes for the branches feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<BranchService>) -> Router {
    Router::new()
        .route(
            "/api/branches",
            get(handlers::list_branches).post(handlers::create_branch),
        )
        .route(
            "/api/branches/{branchId}",
            patch(handlers::update_branch).delete(handlers::delete_branch),
        )
        .with_state(service)
}
