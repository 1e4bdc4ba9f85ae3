use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::loads::handlers;
use crate::features::loads::services::LoadService;

/// Create routes for the loads feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<LoadService>) -> Router {
    Router::new()
        .route(
            "/api/loads",
            get(handlers::list_loads).post(handlers::create_load),
        )
        .route(
            "/api/loads/{loadId}",
            get(handlers::get_load)
                .patch(handlers::update_load)
                .delete(handlers::delete_load),
        )
        .route(
            "/api/loads/{loadId}/status",
            patch(handlers::change_load_status),
        )
        .with_state(service)
}
