use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::ConnectionCache;
use crate::core::error::{AppError, Result};
use crate::features::identity::{IdentityAdminClient, ProfileUpdate};
use crate::features::users::dtos::{
    ListUsersQuery, SelfUpdateUserDto, UpdateUserDto, UserListItemDto, UserListResponseDto,
    UserResponseDto,
};
use crate::features::users::models::UserWithBranchRow;
use crate::shared::types::{clamp_limit, page_offset};

const USER_WITH_BRANCH_SELECT: &str = r#"
    SELECT
        users.id, users.email, users.first_name, users.last_name,
        users.role, users.is_active,
        users.branch AS branch_id,
        branch.name AS branch_name,
        users.created_at
    FROM users
    LEFT JOIN branch ON users.branch = branch.id
"#;

/// Service for user operations.
///
/// Local rows are authoritative; the identity provider is mirrored after a
/// successful commit and never inside the transaction.
pub struct UserService {
    db: Arc<ConnectionCache>,
    identity: Arc<IdentityAdminClient>,
}

impl UserService {
    pub fn new(db: Arc<ConnectionCache>, identity: Arc<IdentityAdminClient>) -> Self {
        Self { db, identity }
    }

    /// Full profile of a user, 404 when the row has not been provisioned
    pub async fn get_by_id(&self, user_id: &str) -> Result<UserResponseDto> {
        let pool = self.db.acquire().await?;

        let sql = format!("{} WHERE users.id = $1", USER_WITH_BRANCH_SELECT);

        let user = sqlx::query_as::<_, UserWithBranchRow>(&sql)
            .bind(user_id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user by id: {:?}", e);
                AppError::Database(e)
            })?;

        user.map(|u| u.into())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// List users with branch names, paginated and optionally filtered
    pub async fn list(&self, query: &ListUsersQuery) -> Result<UserListResponseDto> {
        let pool = self.db.acquire().await?;

        let pattern = query.query.as_ref().map(|q| format!("%{}%", q));

        let sql = format!(
            "{} WHERE ($1::text IS NULL \
                OR users.first_name LIKE $1 \
                OR users.last_name LIKE $1 \
                OR users.email LIKE $1) \
             ORDER BY {} {} LIMIT $2 OFFSET $3",
            USER_WITH_BRANCH_SELECT,
            query.sort_field.as_column(),
            query.sort_order.as_sql(),
        );

        let rows = sqlx::query_as::<_, UserWithBranchRow>(&sql)
            .bind(pattern.as_deref())
            .bind(clamp_limit(query.limit))
            .bind(page_offset(query.page, query.limit))
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE ($1::text IS NULL \
                OR first_name LIKE $1 \
                OR last_name LIKE $1 \
                OR email LIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(UserListResponseDto {
            users: rows.into_iter().map(UserListItemDto::from).collect(),
            total,
        })
    }

    /// Administrative update of branch/role/active flag; returns false when
    /// the user is absent. Active-flag changes are mirrored to the identity
    /// provider after commit.
    pub async fn update(&self, user_id: &str, dto: &UpdateUserDto) -> Result<bool> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        if !user_exists(&mut tx, user_id).await? {
            return Ok(false);
        }

        if let Some(Some(branch_id)) = dto.branch.as_update() {
            ensure_branch_exists(&mut tx, *branch_id).await?;
        }

        let mut builder =
            sqlx::QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");

        if let Some(branch) = dto.branch.as_update() {
            builder.push(", branch = ").push_bind(branch.copied());
        }
        if let Some(role) = dto.role.as_update() {
            builder
                .push(", role = ")
                .push_bind(role.map(|r| r.as_str().to_string()));
        }
        if let Some(is_active) = dto.is_active {
            builder.push(", is_active = ").push_bind(is_active);
        }

        builder.push(" WHERE id = ").push_bind(user_id);
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;

        // Mirror the sign-in gate to the identity provider; local state is
        // already committed, so a failure here only logs the drift.
        if let Some(is_active) = dto.is_active {
            if let Err(e) = self.identity.set_active(user_id, is_active).await {
                tracing::warn!(
                    "Identity provider sync (set_active) failed for user {}: {}",
                    user_id,
                    e
                );
            }
        }

        Ok(true)
    }

    /// Self-service profile update; returns false when the user is absent.
    /// Name changes are mirrored to the identity provider afterwards.
    pub async fn update_self(&self, user_id: &str, dto: &SelfUpdateUserDto) -> Result<bool> {
        let pool = self.db.acquire().await?;

        let result = sqlx::query(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .execute(&pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let update = ProfileUpdate {
            given_name: dto.first_name.clone(),
            family_name: dto.last_name.clone(),
        };
        if let Err(e) = self.identity.update_profile(user_id, update).await {
            tracing::warn!(
                "Identity provider sync (update_profile) failed for user {}: {}",
                user_id,
                e
            );
        }

        Ok(true)
    }

    /// Delete a user row, then best-effort removal at the identity provider;
    /// returns false when the user is absent
    pub async fn delete(&self, user_id: &str) -> Result<bool> {
        let pool = self.db.acquire().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tracing::info!("User deleted: id={}", user_id);

        if let Err(e) = self.identity.delete_user(user_id).await {
            tracing::warn!(
                "Identity provider sync (delete) failed for user {}: {}",
                user_id,
                e
            );
        }

        Ok(true)
    }
}

async fn user_exists(tx: &mut Transaction<'_, Postgres>, user_id: &str) -> Result<bool> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(existing.is_some())
}

async fn ensure_branch_exists(tx: &mut Transaction<'_, Postgres>, branch_id: Uuid) -> Result<()> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM branch WHERE id = $1")
        .bind(branch_id)
        .fetch_optional(&mut **tx)
        .await?;

    if existing.is_none() {
        return Err(AppError::NotFound("Branch not found".to_string()));
    }

    Ok(())
}
