use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestId};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{
    ListUsersQuery, SelfUpdateUserDto, UpdateUserDto, UserListResponseDto, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, MessageDto};

/// List users with their branch assignments
#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Paginated users", body = ApiResponse<UserListResponseDto>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(service): State<Arc<UserService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<UserListResponseDto>>> {
    let users = service.list(&query).await?;
    Ok(Json(ApiResponse::new(users, request_id.0)))
}

/// Profile of the calling user
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not provisioned")
    ),
    tag = "users"
)]
pub async fn get_self(
    State(service): State<Arc<UserService>>,
    user: AuthenticatedUser,
    request_id: RequestId,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_by_id(&user.sub).await?;
    Ok(Json(ApiResponse::new(profile, request_id.0)))
}

/// Self-service update of first/last name
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = SelfUpdateUserDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<MessageDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_self(
    State(service): State<Arc<UserService>>,
    user: AuthenticatedUser,
    request_id: RequestId,
    AppJson(dto): AppJson<SelfUpdateUserDto>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    dto.validate()?;

    if !service.update_self(&user.sub, &dto).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        MessageDto::new("User updated successfully"),
        request_id.0,
    )))
}

/// Administrative update of a user's branch, role or active flag
#[utoipa::path(
    patch,
    path = "/api/users/{userId}",
    params(("userId" = String, Path, description = "User id (identity provider subject)")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<MessageDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User or branch not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(service): State<Arc<UserService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(user_id): Path<String>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    dto.validate()?;

    if !service.update(&user_id, &dto).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        MessageDto::new("User updated successfully"),
        request_id.0,
    )))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{userId}",
    params(("userId" = String, Path, description = "User id (identity provider subject)")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<MessageDto>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(service): State<Arc<UserService>>,
    _user: AuthenticatedUser,
    request_id: RequestId,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MessageDto>>> {
    if !service.delete(&user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(ApiResponse::new(
        MessageDto::new("User deleted successfully"),
        request_id.0,
    )))
}
