use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::UserWithBranchRow;
use crate::shared::patch::Patch;
use crate::shared::types::{de_lenient, de_limit, de_page, default_limit, default_page, SortOrder};
use crate::shared::validation::empty_update_error;

/// Assignable user roles; stored as plain text in the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Owner,
    Dispatcher,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Owner => "Owner",
            UserRole::Dispatcher => "Dispatcher",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBranchDto {
    pub id: Uuid,
    pub name: Option<String>,
}

/// Profile shape returned for the calling user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub branch: Option<UserBranchDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListItemDto {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub branch: Option<UserBranchDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponseDto {
    pub users: Vec<UserListItemDto>,
    pub total: i64,
}

fn branch_of(row: &UserWithBranchRow) -> Option<UserBranchDto> {
    row.branch_id.map(|id| UserBranchDto {
        id,
        name: row.branch_name.clone(),
    })
}

impl From<UserWithBranchRow> for UserResponseDto {
    fn from(row: UserWithBranchRow) -> Self {
        Self {
            branch: branch_of(&row),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl From<UserWithBranchRow> for UserListItemDto {
    fn from(row: UserWithBranchRow) -> Self {
        Self {
            branch: branch_of(&row),
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Administrative update of another user's assignment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_user_update_has_fields))]
pub struct UpdateUserDto {
    /// Branch assignment; explicit null detaches the user
    #[serde(default)]
    #[schema(value_type = Option<Uuid>)]
    pub branch: Patch<Uuid>,

    /// Role; explicit null clears it
    #[serde(default)]
    #[schema(value_type = Option<UserRole>)]
    pub role: Patch<UserRole>,

    pub is_active: Option<bool>,
}

fn validate_user_update_has_fields(dto: &UpdateUserDto) -> Result<(), validator::ValidationError> {
    if dto.branch.is_unset() && dto.role.is_unset() && dto.is_active.is_none() {
        return Err(empty_update_error(
            "At least one field must be provided to update the user",
        ));
    }
    Ok(())
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_self_update_has_fields))]
pub struct SelfUpdateUserDto {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
}

fn validate_self_update_has_fields(
    dto: &SelfUpdateUserDto,
) -> Result<(), validator::ValidationError> {
    if dto.first_name.is_none() && dto.last_name.is_none() {
        return Err(empty_update_error(
            "At least one field must be provided to update the profile",
        ));
    }
    Ok(())
}

/// Sortable user columns; raw column names never come from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserSortField {
    FirstName,
    LastName,
    Email,
    Role,
    IsActive,
    #[default]
    CreatedAt,
    BranchName,
}

impl UserSortField {
    pub fn as_column(self) -> &'static str {
        match self {
            UserSortField::FirstName => "users.first_name",
            UserSortField::LastName => "users.last_name",
            UserSortField::Email => "users.email",
            UserSortField::Role => "users.role",
            UserSortField::IsActive => "users.is_active",
            UserSortField::CreatedAt => "users.created_at",
            UserSortField::BranchName => "branch.name",
        }
    }
}

impl FromStr for UserSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "firstName" => Ok(UserSortField::FirstName),
            "lastName" => Ok(UserSortField::LastName),
            "email" => Ok(UserSortField::Email),
            "role" => Ok(UserSortField::Role),
            "isActive" => Ok(UserSortField::IsActive),
            "createdAt" => Ok(UserSortField::CreatedAt),
            "branchName" => Ok(UserSortField::BranchName),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Zero-based page index
    #[serde(default = "default_page", deserialize_with = "de_page")]
    pub page: i64,

    /// Page size (clamped server-side)
    #[serde(default = "default_limit", deserialize_with = "de_limit")]
    pub limit: i64,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<UserSortField>)]
    pub sort_field: UserSortField,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<SortOrder>)]
    pub sort_order: SortOrder,

    /// Substring filter over first name, last name and email
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn role_tokens_round_trip_as_stored_text() {
        let role: UserRole = serde_json::from_str(r#""Owner""#).unwrap();
        assert_eq!(role, UserRole::Owner);
        assert_eq!(role.as_str(), "Owner");
    }

    #[test]
    fn empty_admin_update_is_rejected() {
        let dto: UpdateUserDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn detaching_branch_with_null_is_a_valid_update() {
        let dto: UpdateUserDto = serde_json::from_str(r#"{"branch": null}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.branch, Patch::Null);
    }

    #[test]
    fn list_defaults_are_created_at_descending() {
        let query: ListUsersQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.page, 0);
        assert_eq!(query.sort_field, UserSortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Descend);
    }
}
