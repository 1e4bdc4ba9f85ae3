use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestId};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::loads::dtos::{
    ChangeLoadStatusDto, ChangeLoadStatusResponseDto, CreateLoadDto, CreateLoadResponseDto,
    ListLoadsQuery, LoadDetailsResponseDto, LoadListResponseDto, UpdateLoadDto,
};
use crate::features::loads::services::LoadService;
use crate::shared::types::{ApiResponse, MessageDto};

/// List loads with their linked files
#[utoipa::path(
    get,
    path = "/api/loads",
    params(ListLoadsQuery),
    responses(
        (status = 200, description = "Paginated loads", body = ApiResponse<LoadListResponseDto>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "loads"
)]
pub async fn list_loads(
    State(service): State<Arc<LoadService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Query(query): Query<ListLoadsQuery>,
) -> Result<Json<ApiResponse<LoadListResponseDto>>> {
    let loads = service.list(&query).await?;
    Ok(Json(ApiResponse::new(loads, request_id.0)))
}

/// Fetch a single load
#[utoipa::path(
    get,
    path = "/api/loads/{loadId}",
    params(("loadId" = Uuid, Path, description = "Load id")),
    responses(
        (status = 200, description = "Load details", body = ApiResponse<LoadDetailsResponseDto>),
        (status = 404, description = "Load not found")
    ),
    tag = "loads"
)]
pub async fn get_load(
    State(service): State<Arc<LoadService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(load_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LoadDetailsResponseDto>>> {
    let load = service.get_by_id(load_id).await?;
    Ok(Json(ApiResponse::new(
        LoadDetailsResponseDto { load },
        request_id.0,
    )))
}

/// Create a load under the caller's branch
#[utoipa::path(
    post,
    path = "/api/loads",
    request_body = CreateLoadDto,
    responses(
        (status = 200, description = "Load created", body = ApiResponse<CreateLoadResponseDto>),
        (status = 400, description = "Validation error or caller without a branch"),
        (status = 404, description = "Referenced branch not found")
    ),
    tag = "loads"
)]
pub async fn create_load(
    State(service): State<Arc<LoadService>>,
    user: AuthenticatedUser,
    request_id: RequestId,
    AppJson(dto): AppJson<CreateLoadDto>,
) -> Result<Json<ApiResponse<CreateLoadResponseDto>>> {
    dto.validate()?;

    let load_id = service.create(&dto, &user.sub).await?;
    Ok(Json(ApiResponse::new(
        CreateLoadResponseDto {
            message: "Load created successfully".to_string(),
            load_id,
        },
        request_id.0,
    )))
}

/// Partially update a load, including wholesale file-set replacement
#[utoipa::path(
    patch,
    path = "/api/loads/{loadId}",
    params(("loadId" = Uuid, Path, description = "Load id")),
    request_body = UpdateLoadDto,
    responses(
        (status = 200, description = "Load updated", body = ApiResponse<MessageDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Load or branch not found")
    ),
    tag = "loads"
)]
pub async fn update_load(
    State(service): State<Arc<LoadService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(load_id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateLoadDto>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    dto.validate()?;

    if !service.update(load_id, &dto).await? {
        return Err(AppError::NotFound("Load not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        MessageDto::new("Load updated successfully"),
        request_id.0,
    )))
}

/// Set the load status, recording the caller as the changer
#[utoipa::path(
    patch,
    path = "/api/loads/{loadId}/status",
    params(("loadId" = Uuid, Path, description = "Load id")),
    request_body = ChangeLoadStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ChangeLoadStatusResponseDto>),
        (status = 404, description = "Load not found")
    ),
    tag = "loads"
)]
pub async fn change_load_status(
    State(service): State<Arc<LoadService>>,
    user: AuthenticatedUser,
    request_id: RequestId,
    Path(load_id): Path<Uuid>,
    AppJson(dto): AppJson<ChangeLoadStatusDto>,
) -> Result<Json<ApiResponse<ChangeLoadStatusResponseDto>>> {
    if !service.change_status(load_id, dto.status, &user.sub).await? {
        return Err(AppError::NotFound("Load not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        ChangeLoadStatusResponseDto {
            message: "Load status updated successfully".to_string(),
            load_id,
            status: dto.status,
            status_changed_by: Some(user.sub),
        },
        request_id.0,
    )))
}

/// Delete a load and its file links
#[utoipa::path(
    delete,
    path = "/api/loads/{loadId}",
    params(("loadId" = Uuid, Path, description = "Load id")),
    responses(
        (status = 200, description = "Load deleted", body = ApiResponse<MessageDto>),
        (status = 404, description = "Load not found")
    ),
    tag = "loads"
)]
pub async fn delete_load(
    State(service): State<Arc<LoadService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(load_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    if !service.delete(load_id).await? {
        return Err(AppError::NotFound("Load not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        MessageDto::new("Load deleted successfully"),
        request_id.0,
    )))
}
