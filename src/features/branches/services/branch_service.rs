use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::ConnectionCache;
use crate::core::error::{AppError, Result};
use crate::features::branches::dtos::{
    BranchListResponseDto, BranchResponseDto, CreateBranchDto, ListBranchesQuery, UpdateBranchDto,
};
use crate::features::branches::models::BranchWithOwnerRow;
use crate::shared::constants::ROLE_OWNER;
use crate::shared::types::{clamp_limit, page_offset};

const BRANCH_WITH_OWNER_SELECT: &str = r#"
    SELECT
        branch.id, branch.name, branch.contact,
        users.id AS owner_id,
        users.email AS owner_email,
        users.first_name AS owner_first_name,
        users.last_name AS owner_last_name
    FROM branch
    LEFT JOIN users ON users.branch = branch.id AND users.role = 'Owner'
"#;

/// Service for branch operations
pub struct BranchService {
    db: Arc<ConnectionCache>,
}

impl BranchService {
    pub fn new(db: Arc<ConnectionCache>) -> Self {
        Self { db }
    }

    /// List branches with their owners, paginated and optionally filtered
    pub async fn list(&self, query: &ListBranchesQuery) -> Result<BranchListResponseDto> {
        let pool = self.db.acquire().await?;

        let pattern = query.query.as_ref().map(|q| format!("%{}%", q));

        let sql = format!(
            "{} WHERE ($1::text IS NULL OR branch.name LIKE $1 OR branch.contact LIKE $1) \
             ORDER BY {} {} LIMIT $2 OFFSET $3",
            BRANCH_WITH_OWNER_SELECT,
            query.sort_field.as_column(),
            query.sort_order.as_sql(),
        );

        let rows = sqlx::query_as::<_, BranchWithOwnerRow>(&sql)
            .bind(pattern.as_deref())
            .bind(clamp_limit(query.limit))
            .bind(page_offset(query.page, query.limit))
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list branches: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM branch \
             WHERE ($1::text IS NULL OR name LIKE $1 OR contact LIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count branches: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(BranchListResponseDto {
            branches: rows.into_iter().map(BranchResponseDto::from).collect(),
            total,
        })
    }

    /// Create a branch and assign its owner in one transaction
    pub async fn create(&self, dto: &CreateBranchDto) -> Result<Uuid> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        ensure_owner_exists(&mut tx, &dto.owner).await?;

        let branch_id = Uuid::new_v4();

        sqlx::query("INSERT INTO branch (id, name, contact) VALUES ($1, $2, $3)")
            .bind(branch_id)
            .bind(&dto.name)
            .bind(&dto.contact)
            .execute(&mut *tx)
            .await?;

        assign_owner(&mut tx, branch_id, Some(&dto.owner)).await?;

        tx.commit().await?;

        tracing::info!("Branch created: id={}, owner={}", branch_id, dto.owner);

        Ok(branch_id)
    }

    /// Partially update a branch; returns false when the branch is absent
    pub async fn update(&self, branch_id: Uuid, dto: &UpdateBranchDto) -> Result<bool> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        if !branch_exists(&mut tx, branch_id).await? {
            return Ok(false);
        }

        if dto.name.is_some() || dto.contact.is_set() {
            let mut builder =
                sqlx::QueryBuilder::<Postgres>::new("UPDATE branch SET updated_at = NOW()");

            if let Some(name) = &dto.name {
                builder.push(", name = ").push_bind(name);
            }
            if let Some(contact) = dto.contact.as_update() {
                builder.push(", contact = ").push_bind(contact.cloned());
            }

            builder.push(" WHERE id = ").push_bind(branch_id);
            builder.build().execute(&mut *tx).await?;
        }

        if let Some(owner) = dto.owner.as_update() {
            assign_owner(&mut tx, branch_id, owner.map(String::as_str)).await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Delete a branch after detaching every user that references it;
    /// returns false when the branch is absent
    pub async fn delete(&self, branch_id: Uuid) -> Result<bool> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        if !branch_exists(&mut tx, branch_id).await? {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET branch = NULL WHERE branch = $1")
            .bind(branch_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM branch WHERE id = $1")
            .bind(branch_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Branch deleted: id={}", branch_id);

        Ok(true)
    }
}

async fn branch_exists(tx: &mut Transaction<'_, Postgres>, branch_id: Uuid) -> Result<bool> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM branch WHERE id = $1")
        .bind(branch_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(existing.is_some())
}

async fn ensure_owner_exists(tx: &mut Transaction<'_, Postgres>, owner_id: &str) -> Result<()> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?;

    if existing.is_none() {
        return Err(AppError::NotFound("Owner not found".to_string()));
    }

    Ok(())
}

/// (Re)assigns the exclusive owner of a branch. Previous owners are detached
/// first so the one-active-owner invariant holds whatever the prior state.
async fn assign_owner(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: Uuid,
    owner_id: Option<&str>,
) -> Result<()> {
    let Some(owner_id) = owner_id else {
        sqlx::query("UPDATE users SET branch = NULL WHERE branch = $1 AND role = $2")
            .bind(branch_id)
            .bind(ROLE_OWNER)
            .execute(&mut **tx)
            .await?;
        return Ok(());
    };

    ensure_owner_exists(tx, owner_id).await?;

    // Reset existing owners
    sqlx::query("UPDATE users SET branch = NULL WHERE branch = $1 AND role = $2 AND id != $3")
        .bind(branch_id)
        .bind(ROLE_OWNER)
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE users SET branch = $1 WHERE id = $2 AND role = $3")
        .bind(branch_id)
        .bind(owner_id)
        .bind(ROLE_OWNER)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::branches::dtos::{BranchSortField, CreateBranchDto, UpdateBranchDto};
    use crate::shared::test_helpers::test_connection_cache;
    use crate::shared::types::SortOrder;
    use fake::faker::company::en::CompanyName;
    use fake::Fake;
    use serde_json::json;
    use sqlx::PgPool;

    async fn insert_owner(pool: &PgPool) -> String {
        let id = format!("owner-{}", Uuid::new_v4());
        sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, 'Owner')")
            .bind(&id)
            .bind(format!("{}@example.com", id))
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn branch_row(pool: &PgPool, branch_id: Uuid) -> (String, Option<String>) {
        sqlx::query_as("SELECT name, contact FROM branch WHERE id = $1")
            .bind(branch_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn owner_reassignment_keeps_exactly_one_owner() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = BranchService::new(Arc::clone(&db));

        let first = insert_owner(&pool).await;
        let second = insert_owner(&pool).await;

        let branch_id = service
            .create(&CreateBranchDto {
                name: CompanyName().fake(),
                owner: first.clone(),
                contact: None,
            })
            .await
            .unwrap();

        let dto: UpdateBranchDto = serde_json::from_value(json!({ "owner": second })).unwrap();
        assert!(service.update(branch_id, &dto).await.unwrap());

        let owners: Vec<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE branch = $1 AND role = 'Owner'")
                .bind(branch_id)
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(owners, vec![second]);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn partial_update_preserves_omitted_fields() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = BranchService::new(Arc::clone(&db));

        let owner = insert_owner(&pool).await;
        let branch_id = service
            .create(&CreateBranchDto {
                name: "A".to_string(),
                owner,
                contact: Some("x".to_string()),
            })
            .await
            .unwrap();

        let rename: UpdateBranchDto = serde_json::from_value(json!({ "name": "B" })).unwrap();
        assert!(service.update(branch_id, &rename).await.unwrap());
        assert_eq!(
            branch_row(&pool, branch_id).await,
            ("B".to_string(), Some("x".to_string()))
        );

        let clear_contact: UpdateBranchDto =
            serde_json::from_value(json!({ "contact": null })).unwrap();
        assert!(service.update(branch_id, &clear_contact).await.unwrap());
        assert_eq!(branch_row(&pool, branch_id).await, ("B".to_string(), None));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn delete_is_idempotent_by_reporting_absence() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = BranchService::new(Arc::clone(&db));

        let owner = insert_owner(&pool).await;
        let branch_id = service
            .create(&CreateBranchDto {
                name: CompanyName().fake(),
                owner,
                contact: None,
            })
            .await
            .unwrap();

        assert!(service.delete(branch_id).await.unwrap());
        assert!(!service.delete(branch_id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn creating_with_an_unknown_owner_leaves_no_branch_behind() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = BranchService::new(Arc::clone(&db));

        let name: String = CompanyName().fake();
        let result = service
            .create(&CreateBranchDto {
                name: name.clone(),
                owner: format!("ghost-{}", Uuid::new_v4()),
                contact: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branch WHERE name = $1")
            .bind(&name)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn pages_are_disjoint_contiguous_slices_of_the_sorted_set() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = BranchService::new(Arc::clone(&db));

        let prefix = format!("PG-{}", Uuid::new_v4());
        for i in 0..7 {
            let owner = insert_owner(&pool).await;
            service
                .create(&CreateBranchDto {
                    name: format!("{}-{}", prefix, i),
                    owner,
                    contact: None,
                })
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        for page in 0..3 {
            let result = service
                .list(&ListBranchesQuery {
                    page,
                    limit: 3,
                    sort_field: BranchSortField::Name,
                    sort_order: SortOrder::Ascend,
                    query: Some(prefix.clone()),
                })
                .await
                .unwrap();
            assert_eq!(result.total, 7);
            seen.extend(result.branches.into_iter().map(|b| b.name));
        }

        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(seen.len(), 7);
        assert_eq!(seen, sorted);
    }
}
