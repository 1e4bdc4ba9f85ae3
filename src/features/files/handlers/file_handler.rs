use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, RequestId};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{DownloadUrlResponseDto, UploadFileDto, UploadUrlResponseDto};
use crate::modules::storage::StorageClient;
use crate::shared::types::{ApiResponse, MessageDto};

/// Mint a presigned upload URL and a fresh file id.
///
/// The id becomes a `file` row once a load lists it; until then it only
/// exists in object storage.
#[utoipa::path(
    post,
    path = "/api/files/upload-url",
    request_body = UploadFileDto,
    responses(
        (status = 200, description = "Presigned upload ticket", body = ApiResponse<UploadUrlResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "files"
)]
pub async fn create_upload_url(
    State(storage): State<Arc<StorageClient>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    AppJson(dto): AppJson<UploadFileDto>,
) -> Result<Json<ApiResponse<UploadUrlResponseDto>>> {
    dto.validate()?;

    let ticket = storage
        .create_upload_url(&dto.file_name, &dto.content_type, dto.size)
        .await?;

    Ok(Json(ApiResponse::new(ticket.into(), request_id.0)))
}

/// Mint a presigned download URL for a stored file
#[utoipa::path(
    get,
    path = "/api/files/{fileId}/download-url",
    params(("fileId" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "Presigned download ticket", body = ApiResponse<DownloadUrlResponseDto>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "files"
)]
pub async fn create_download_url(
    State(storage): State<Arc<StorageClient>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DownloadUrlResponseDto>>> {
    let ticket = storage.create_download_url(file_id).await?;
    Ok(Json(ApiResponse::new(ticket.into(), request_id.0)))
}

/// Delete a stored file from object storage
#[utoipa::path(
    delete,
    path = "/api/files/{fileId}",
    params(("fileId" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<MessageDto>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(storage): State<Arc<StorageClient>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    storage.delete_file(file_id).await?;
    Ok(Json(ApiResponse::new(
        MessageDto::new("File deleted successfully"),
        request_id.0,
    )))
}
