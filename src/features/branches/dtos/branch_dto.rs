use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::branches::models::BranchWithOwnerRow;
use crate::shared::patch::Patch;
use crate::shared::types::{de_lenient, de_limit, de_page, default_limit, default_page, SortOrder};
use crate::shared::validation::empty_update_error;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchOwnerDto {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponseDto {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub owner: Option<BranchOwnerDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchListResponseDto {
    pub branches: Vec<BranchResponseDto>,
    pub total: i64,
}

impl From<BranchWithOwnerRow> for BranchResponseDto {
    fn from(row: BranchWithOwnerRow) -> Self {
        let owner = row.owner_id.map(|id| BranchOwnerDto {
            id,
            email: row.owner_email.unwrap_or_default(),
            first_name: row.owner_first_name,
            last_name: row.owner_last_name,
        });

        Self {
            id: row.id,
            name: row.name,
            contact: row.contact,
            owner,
        }
    }
}

/// Request DTO for creating a branch; `owner` is the id of the user who will
/// hold the Owner role for it
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchDto {
    #[validate(length(min = 1, message = "Branch name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Owner is required"))]
    pub owner: String,

    pub contact: Option<String>,
}

/// Partial update; every field optional, explicit null clears a nullable one
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_branch_update_has_fields))]
pub struct UpdateBranchDto {
    #[validate(length(min = 1, message = "Branch name cannot be empty"))]
    pub name: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub owner: Patch<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub contact: Patch<String>,
}

fn validate_branch_update_has_fields(
    dto: &UpdateBranchDto,
) -> Result<(), validator::ValidationError> {
    if dto.name.is_none() && dto.owner.is_unset() && dto.contact.is_unset() {
        return Err(empty_update_error(
            "At least one field must be provided to update the branch",
        ));
    }
    Ok(())
}

/// Sortable branch columns; raw column names never come from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BranchSortField {
    #[default]
    CreatedAt,
    Name,
    Contact,
}

impl BranchSortField {
    pub fn as_column(self) -> &'static str {
        match self {
            BranchSortField::CreatedAt => "branch.created_at",
            BranchSortField::Name => "branch.name",
            BranchSortField::Contact => "branch.contact",
        }
    }
}

impl FromStr for BranchSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(BranchSortField::CreatedAt),
            "name" => Ok(BranchSortField::Name),
            "contact" => Ok(BranchSortField::Contact),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBranchesQuery {
    /// Zero-based page index
    #[serde(default = "default_page", deserialize_with = "de_page")]
    pub page: i64,

    /// Page size (clamped server-side)
    #[serde(default = "default_limit", deserialize_with = "de_limit")]
    pub limit: i64,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<BranchSortField>)]
    pub sort_field: BranchSortField,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<SortOrder>)]
    pub sort_order: SortOrder,

    /// Substring filter over name and contact
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn unknown_sort_token_falls_back_to_created_at() {
        let query: ListBranchesQuery =
            serde_urlencoded::from_str("sortField=ownerEmail&sortOrder=ascend").unwrap();
        assert_eq!(query.sort_field, BranchSortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Ascend);
    }

    #[test]
    fn empty_update_is_rejected_at_the_schema_stage() {
        let dto: UpdateBranchDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn null_owner_counts_as_a_field() {
        let dto: UpdateBranchDto = serde_json::from_str(r#"{"owner": null}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.owner, Patch::Null);
    }
}
