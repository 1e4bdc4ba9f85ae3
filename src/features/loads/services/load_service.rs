use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::ConnectionCache;
use crate::core::error::{AppError, Result};
use crate::features::loads::dtos::{
    CreateLoadDto, ListLoadsQuery, LoadFileDto, LoadFileResponseDto, LoadListResponseDto,
    LoadResponseDto, UpdateLoadDto,
};
use crate::features::loads::models::{LoadFileRow, LoadRow, LoadStatus};
use crate::shared::types::{clamp_limit, page_offset};

/// Service for load operations
pub struct LoadService {
    db: Arc<ConnectionCache>,
}

impl LoadService {
    pub fn new(db: Arc<ConnectionCache>) -> Self {
        Self { db }
    }

    /// List loads with their linked files, paginated and optionally filtered
    pub async fn list(&self, query: &ListLoadsQuery) -> Result<LoadListResponseDto> {
        let pool = self.db.acquire().await?;

        let pattern = query.query.as_ref().map(|q| format!("%{}%", q));

        let sql = format!(
            "SELECT * FROM load \
             WHERE ($1::text IS NULL \
                OR reference_number LIKE $1 \
                OR contact_name LIKE $1 \
                OR carrier LIKE $1 \
                OR commodity LIKE $1) \
             ORDER BY {} {} LIMIT $2 OFFSET $3",
            query.sort_field.as_column(),
            query.sort_order.as_sql(),
        );

        let rows = sqlx::query_as::<_, LoadRow>(&sql)
            .bind(pattern.as_deref())
            .bind(clamp_limit(query.limit))
            .bind(page_offset(query.page, query.limit))
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list loads: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM load \
             WHERE ($1::text IS NULL \
                OR reference_number LIKE $1 \
                OR contact_name LIKE $1 \
                OR carrier LIKE $1 \
                OR commodity LIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count loads: {:?}", e);
            AppError::Database(e)
        })?;

        let load_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut files_by_load = fetch_files_for_loads(&pool, &load_ids).await?;

        let loads = rows
            .into_iter()
            .map(|row| {
                let files = files_by_load.remove(&row.id).unwrap_or_default();
                LoadResponseDto::from_row(row, files)
            })
            .collect();

        Ok(LoadListResponseDto { loads, total })
    }

    /// Fetch a single load with its linked files
    pub async fn get_by_id(&self, load_id: Uuid) -> Result<LoadResponseDto> {
        let pool = self.db.acquire().await?;

        let row = sqlx::query_as::<_, LoadRow>("SELECT * FROM load WHERE id = $1")
            .bind(load_id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get load by id: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Load not found".to_string()))?;

        let mut files_by_load = fetch_files_for_loads(&pool, &[load_id]).await?;
        let files = files_by_load.remove(&load_id).unwrap_or_default();

        Ok(LoadResponseDto::from_row(row, files))
    }

    /// Create a load for the caller's branch.
    ///
    /// The branch is taken from the creating user's row, never from the
    /// payload; referenced files are persisted and linked in the same
    /// transaction so a failure leaves nothing behind.
    pub async fn create(&self, dto: &CreateLoadDto, created_by: &str) -> Result<Uuid> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        let branch: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT branch FROM users WHERE id = $1")
                .bind(created_by)
                .fetch_optional(&mut *tx)
                .await?;

        let branch_id = match branch {
            None => return Err(AppError::NotFound("User not found".to_string())),
            Some(None) => {
                return Err(AppError::BadRequest(
                    "User is not assigned to a branch".to_string(),
                ))
            }
            Some(Some(branch_id)) => branch_id,
        };

        ensure_branch_exists(&mut tx, branch_id).await?;

        let file_ids = match &dto.files {
            Some(files) => ensure_files_persisted(&mut tx, files).await?,
            None => Vec::new(),
        };

        let load_id = Uuid::new_v4();
        let status = dto.status.unwrap_or_default();

        sqlx::query(
            "INSERT INTO load (
                id, customer_id, reference_number, customer_rate, contact_name,
                carrier, carrier_payment_method, carrier_rate, charge_service_fee_to_office,
                load_type, service_type, service_given_as, commodity,
                booked_as, sold_as, weight, temperature,
                pickup_city_zip_code, pickup_phone, pickup_carrier, pickup_name, pickup_address,
                dropoff_city_zip_code, dropoff_phone, dropoff_carrier, dropoff_name, dropoff_address,
                branch_id, status
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
            )",
        )
        .bind(load_id)
        .bind(dto.customer_id)
        .bind(&dto.reference_number)
        .bind(dto.customer_rate.and_then(|r| Decimal::try_from(r).ok()))
        .bind(&dto.contact_name)
        .bind(&dto.carrier)
        .bind(&dto.carrier_payment_method)
        .bind(Decimal::try_from(dto.carrier_rate).unwrap_or_default())
        .bind(dto.charge_service_fee_to_office.unwrap_or(false))
        .bind(&dto.load_type)
        .bind(&dto.service_type)
        .bind(&dto.service_given_as)
        .bind(&dto.commodity)
        .bind(&dto.booked_as)
        .bind(&dto.sold_as)
        .bind(&dto.weight)
        .bind(&dto.temperature)
        .bind(&dto.pickup.city_zip_code)
        .bind(&dto.pickup.phone)
        .bind(&dto.pickup.carrier)
        .bind(&dto.pickup.name)
        .bind(&dto.pickup.address)
        .bind(&dto.dropoff.city_zip_code)
        .bind(&dto.dropoff.phone)
        .bind(&dto.dropoff.carrier)
        .bind(&dto.dropoff.name)
        .bind(&dto.dropoff.address)
        .bind(branch_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        insert_load_files(&mut tx, load_id, &file_ids).await?;

        tx.commit().await?;

        tracing::info!("Load created: id={}, by={}", load_id, created_by);

        Ok(load_id)
    }

    /// Partially update a load; returns false when the load is absent.
    /// A present `files` list replaces the membership wholesale.
    pub async fn update(&self, load_id: Uuid, dto: &UpdateLoadDto) -> Result<bool> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        if !load_exists(&mut tx, load_id).await? {
            return Ok(false);
        }

        if let Some(branch_id) = dto.branch_id {
            ensure_branch_exists(&mut tx, branch_id).await?;
        }

        let file_ids = match &dto.files {
            Some(files) => Some(ensure_files_persisted(&mut tx, files).await?),
            None => None,
        };

        let mut builder = sqlx::QueryBuilder::<Postgres>::new("UPDATE load SET updated_at = NOW()");

        if let Some(customer_id) = dto.customer_id {
            builder.push(", customer_id = ").push_bind(customer_id);
        }
        if let Some(reference_number) = &dto.reference_number {
            builder
                .push(", reference_number = ")
                .push_bind(reference_number);
        }
        if let Some(rate) = dto.customer_rate.as_update() {
            builder
                .push(", customer_rate = ")
                .push_bind(rate.and_then(|r| Decimal::try_from(*r).ok()));
        }
        if let Some(contact_name) = &dto.contact_name {
            builder.push(", contact_name = ").push_bind(contact_name);
        }
        if let Some(carrier) = &dto.carrier {
            builder.push(", carrier = ").push_bind(carrier);
        }
        if let Some(method) = dto.carrier_payment_method.as_update() {
            builder
                .push(", carrier_payment_method = ")
                .push_bind(method.cloned());
        }
        if let Some(rate) = dto.carrier_rate {
            builder
                .push(", carrier_rate = ")
                .push_bind(Decimal::try_from(rate).unwrap_or_default());
        }
        if let Some(flag) = dto.charge_service_fee_to_office {
            builder
                .push(", charge_service_fee_to_office = ")
                .push_bind(flag);
        }
        if let Some(load_type) = &dto.load_type {
            builder.push(", load_type = ").push_bind(load_type);
        }
        if let Some(service_type) = &dto.service_type {
            builder.push(", service_type = ").push_bind(service_type);
        }
        if let Some(service_given_as) = &dto.service_given_as {
            builder
                .push(", service_given_as = ")
                .push_bind(service_given_as);
        }
        if let Some(commodity) = &dto.commodity {
            builder.push(", commodity = ").push_bind(commodity);
        }
        if let Some(booked_as) = &dto.booked_as {
            builder.push(", booked_as = ").push_bind(booked_as);
        }
        if let Some(sold_as) = &dto.sold_as {
            builder.push(", sold_as = ").push_bind(sold_as);
        }
        if let Some(weight) = &dto.weight {
            builder.push(", weight = ").push_bind(weight);
        }
        if let Some(temperature) = dto.temperature.as_update() {
            builder
                .push(", temperature = ")
                .push_bind(temperature.cloned());
        }
        if let Some(pickup) = &dto.pickup {
            if let Some(city_zip_code) = &pickup.city_zip_code {
                builder
                    .push(", pickup_city_zip_code = ")
                    .push_bind(city_zip_code);
            }
            if let Some(phone) = &pickup.phone {
                builder.push(", pickup_phone = ").push_bind(phone);
            }
            if let Some(carrier) = &pickup.carrier {
                builder.push(", pickup_carrier = ").push_bind(carrier);
            }
            if let Some(name) = &pickup.name {
                builder.push(", pickup_name = ").push_bind(name);
            }
            if let Some(address) = &pickup.address {
                builder.push(", pickup_address = ").push_bind(address);
            }
        }
        if let Some(dropoff) = &dto.dropoff {
            if let Some(city_zip_code) = &dropoff.city_zip_code {
                builder
                    .push(", dropoff_city_zip_code = ")
                    .push_bind(city_zip_code);
            }
            if let Some(phone) = &dropoff.phone {
                builder.push(", dropoff_phone = ").push_bind(phone);
            }
            if let Some(carrier) = &dropoff.carrier {
                builder.push(", dropoff_carrier = ").push_bind(carrier);
            }
            if let Some(name) = &dropoff.name {
                builder.push(", dropoff_name = ").push_bind(name);
            }
            if let Some(address) = &dropoff.address {
                builder.push(", dropoff_address = ").push_bind(address);
            }
        }
        if let Some(branch_id) = dto.branch_id {
            builder.push(", branch_id = ").push_bind(branch_id);
        }

        builder.push(" WHERE id = ").push_bind(load_id);
        builder.build().execute(&mut *tx).await?;

        if let Some(file_ids) = file_ids {
            replace_load_files(&mut tx, load_id, &file_ids).await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Set the load status unconditionally, recording who changed it;
    /// returns false when the load is absent
    pub async fn change_status(
        &self,
        load_id: Uuid,
        status: LoadStatus,
        changed_by: &str,
    ) -> Result<bool> {
        let pool = self.db.acquire().await?;

        let result = sqlx::query(
            "UPDATE load SET status = $2, status_changed_by = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(load_id)
        .bind(status.as_str())
        .bind(changed_by)
        .execute(&pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a load and its file links; the file rows themselves stay.
    /// Returns false when the load is absent.
    pub async fn delete(&self, load_id: Uuid) -> Result<bool> {
        let pool = self.db.acquire().await?;
        let mut tx = pool.begin().await?;

        if !load_exists(&mut tx, load_id).await? {
            return Ok(false);
        }

        sqlx::query("DELETE FROM load_files WHERE load_id = $1")
            .bind(load_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM load WHERE id = $1")
            .bind(load_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Load deleted: id={}", load_id);

        Ok(true)
    }
}

/// Dedupe a caller-supplied file list by id. The first occurrence wins; a
/// later occurrence may backfill a name the first one lacked.
fn normalize_files(files: &[LoadFileDto]) -> Vec<LoadFileDto> {
    let mut by_id: HashMap<Uuid, usize> = HashMap::new();
    let mut ordered: Vec<LoadFileDto> = Vec::new();

    for file in files {
        match by_id.get(&file.id) {
            None => {
                by_id.insert(file.id, ordered.len());
                ordered.push(file.clone());
            }
            Some(&index) => {
                if ordered[index].file_name.is_none() && file.file_name.is_some() {
                    ordered[index].file_name = file.file_name.clone();
                }
            }
        }
    }

    ordered
}

/// Insert file rows for ids not yet persisted and return the authoritative
/// membership list. An unseen id without a name cannot become a row, so it
/// fails the whole operation.
async fn ensure_files_persisted(
    tx: &mut Transaction<'_, Postgres>,
    files: &[LoadFileDto],
) -> Result<Vec<Uuid>> {
    let unique = normalize_files(files);

    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = unique.iter().map(|f| f.id).collect();

    let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM file WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;
    let existing: HashSet<Uuid> = existing.into_iter().collect();

    let mut new_ids = Vec::new();
    let mut new_names = Vec::new();
    for file in unique.iter().filter(|f| !existing.contains(&f.id)) {
        let Some(name) = &file.file_name else {
            return Err(AppError::BadRequest(format!(
                "File name is required for new file '{}'",
                file.id
            )));
        };
        new_ids.push(file.id);
        new_names.push(name.clone());
    }

    if !new_ids.is_empty() {
        sqlx::query(
            "INSERT INTO file (id, file_name) \
             SELECT * FROM UNNEST($1::uuid[], $2::text[])",
        )
        .bind(&new_ids)
        .bind(&new_names)
        .execute(&mut **tx)
        .await?;
    }

    Ok(ids)
}

/// Replace the load's file membership wholesale: delete then insert within
/// the caller's transaction.
async fn replace_load_files(
    tx: &mut Transaction<'_, Postgres>,
    load_id: Uuid,
    file_ids: &[Uuid],
) -> Result<()> {
    sqlx::query("DELETE FROM load_files WHERE load_id = $1")
        .bind(load_id)
        .execute(&mut **tx)
        .await?;

    insert_load_files(tx, load_id, file_ids).await
}

async fn insert_load_files(
    tx: &mut Transaction<'_, Postgres>,
    load_id: Uuid,
    file_ids: &[Uuid],
) -> Result<()> {
    if file_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO load_files (load_id, file_id) \
         SELECT $1::uuid, file_id FROM UNNEST($2::uuid[]) AS t(file_id)",
    )
    .bind(load_id)
    .bind(file_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn fetch_files_for_loads(
    pool: &PgPool,
    load_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LoadFileResponseDto>>> {
    if load_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, LoadFileRow>(
        "SELECT load_files.load_id, load_files.file_id, file.file_name \
         FROM load_files \
         INNER JOIN file ON file.id = load_files.file_id \
         WHERE load_files.load_id = ANY($1)",
    )
    .bind(load_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch files for loads: {:?}", e);
        AppError::Database(e)
    })?;

    let mut grouped: HashMap<Uuid, Vec<LoadFileResponseDto>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.load_id)
            .or_default()
            .push(LoadFileResponseDto {
                id: row.file_id,
                file_name: row.file_name,
            });
    }

    Ok(grouped)
}

async fn load_exists(tx: &mut Transaction<'_, Postgres>, load_id: Uuid) -> Result<bool> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM load WHERE id = $1")
        .bind(load_id)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_connection_cache;
    use serde_json::json;

    fn file(id: Uuid, name: Option<&str>) -> LoadFileDto {
        LoadFileDto {
            id,
            file_name: name.map(String::from),
        }
    }

    #[test]
    fn duplicate_ids_collapse_to_the_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let normalized = normalize_files(&[
            file(a, Some("bol.pdf")),
            file(b, Some("pod.pdf")),
            file(a, Some("renamed.pdf")),
        ]);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].id, a);
        assert_eq!(normalized[0].file_name.as_deref(), Some("bol.pdf"));
        assert_eq!(normalized[1].id, b);
    }

    #[test]
    fn later_occurrence_backfills_a_missing_name() {
        let a = Uuid::new_v4();
        let normalized = normalize_files(&[file(a, None), file(a, Some("bol.pdf"))]);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].file_name.as_deref(), Some("bol.pdf"));
    }

    #[test]
    fn order_of_first_occurrences_is_preserved() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let input: Vec<LoadFileDto> = ids.iter().map(|id| file(*id, Some("f"))).collect();
        let normalized = normalize_files(&input);

        let out: Vec<Uuid> = normalized.iter().map(|f| f.id).collect();
        assert_eq!(out, ids);
    }

    async fn seed_branch_and_user(pool: &PgPool) -> (Uuid, String) {
        let branch_id = Uuid::new_v4();
        sqlx::query("INSERT INTO branch (id, name) VALUES ($1, $2)")
            .bind(branch_id)
            .bind(format!("Branch {}", branch_id))
            .execute(pool)
            .await
            .unwrap();

        let user_id = format!("dispatcher-{}", Uuid::new_v4());
        sqlx::query("INSERT INTO users (id, email, role, branch) VALUES ($1, $2, 'Dispatcher', $3)")
            .bind(&user_id)
            .bind(format!("{}@example.com", user_id))
            .bind(branch_id)
            .execute(pool)
            .await
            .unwrap();

        (branch_id, user_id)
    }

    fn create_dto(files: serde_json::Value) -> CreateLoadDto {
        serde_json::from_value(json!({
            "customerId": Uuid::new_v4(),
            "referenceNumber": format!("REF-{}", Uuid::new_v4()),
            "contactName": "Dana",
            "carrier": "ACME Trucking",
            "carrierRate": 1450.0,
            "loadType": "FTL",
            "serviceType": "Dry Van",
            "serviceGivenAs": "FTL",
            "commodity": "Paper",
            "bookedAs": "FTL",
            "soldAs": "FTL",
            "weight": "42000 lbs",
            "pickup": {"cityZipCode": "Austin 78701", "phone": "555-0101", "carrier": "ACME", "name": "Dock A", "address": "1 Main St"},
            "dropoff": {"cityZipCode": "Dallas 75201", "phone": "555-0102", "carrier": "ACME", "name": "Dock B", "address": "2 Elm St"},
            "files": files
        }))
        .unwrap()
    }

    async fn linked_file_ids(pool: &PgPool, load_id: Uuid) -> HashSet<Uuid> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT file_id FROM load_files WHERE load_id = $1")
                .bind(load_id)
                .fetch_all(pool)
                .await
                .unwrap();
        ids.into_iter().collect()
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn updating_files_replaces_membership_without_deleting_file_rows() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = LoadService::new(Arc::clone(&db));

        let (_, user_id) = seed_branch_and_user(&pool).await;
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        let f3 = Uuid::new_v4();

        let load_id = service
            .create(
                &create_dto(json!([
                    {"id": f1, "fileName": "bol.pdf"},
                    {"id": f2, "fileName": "pod.pdf"}
                ])),
                &user_id,
            )
            .await
            .unwrap();
        assert_eq!(linked_file_ids(&pool, load_id).await, HashSet::from([f1, f2]));

        // f2 is already persisted, so its name may be omitted; f3 is new
        let dto: UpdateLoadDto = serde_json::from_value(json!({
            "files": [{"id": f2}, {"id": f3, "fileName": "rate-con.pdf"}]
        }))
        .unwrap();
        assert!(service.update(load_id, &dto).await.unwrap());

        assert_eq!(linked_file_ids(&pool, load_id).await, HashSet::from([f2, f3]));

        // f1 is unlinked but its row survives
        let f1_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file WHERE id = $1")
            .bind(f1)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(f1_count, 1);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn a_nameless_new_file_rolls_back_the_whole_creation() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = LoadService::new(Arc::clone(&db));

        let (_, user_id) = seed_branch_and_user(&pool).await;
        let named = Uuid::new_v4();
        let nameless = Uuid::new_v4();

        let dto = create_dto(json!([
            {"id": named, "fileName": "bol.pdf"},
            {"id": nameless}
        ]));
        let reference = dto.reference_number.clone();

        let result = service.create(&dto, &user_id).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        // Neither the load nor the already-inserted file row survived
        let loads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM load WHERE reference_number = $1")
            .bind(&reference)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(loads, 0);

        let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file WHERE id = $1")
            .bind(named)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(files, 0);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn updating_to_an_unknown_branch_is_rejected_with_not_found() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = LoadService::new(Arc::clone(&db));

        let (_, user_id) = seed_branch_and_user(&pool).await;
        let load_id = service.create(&create_dto(json!([])), &user_id).await.unwrap();

        let dto: UpdateLoadDto =
            serde_json::from_value(json!({ "branchId": Uuid::new_v4() })).unwrap();
        let result = service.update(load_id, &dto).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn status_change_records_the_changer() {
        let db = test_connection_cache().await;
        let pool = db.acquire().await.unwrap();
        let service = LoadService::new(Arc::clone(&db));

        let (_, user_id) = seed_branch_and_user(&pool).await;
        let load_id = service.create(&create_dto(json!([])), &user_id).await.unwrap();

        assert!(service
            .change_status(load_id, LoadStatus::InTransit, &user_id)
            .await
            .unwrap());

        let load = service.get_by_id(load_id).await.unwrap();
        assert_eq!(load.status, LoadStatus::InTransit);
        assert_eq!(load.status_changed_by.as_deref(), Some(user_id.as_str()));

        // A missing load reports absence instead of failing
        assert!(!service
            .change_status(Uuid::new_v4(), LoadStatus::Delivered, &user_id)
            .await
            .unwrap());
    }
}
