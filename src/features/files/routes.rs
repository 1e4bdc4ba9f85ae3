use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::files::handlers;
use crate::modules::storage::StorageClient;

/// Create routes for the files feature
///
/// Note: This feature requires authentication
pub fn routes(storage: Arc<StorageClient>) -> Router {
    Router::new()
        .route("/api/files/upload-url", post(handlers::create_upload_url))
        .route(
            "/api/files/{fileId}/download-url",
            get(handlers::create_download_url),
        )
        .route(
            "/api/files/{fileId}",
            axum::routing::delete(handlers::delete_file),
        )
        .with_state(storage)
}
