use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User row joined with the name of the branch it belongs to
#[derive(Debug, Clone, FromRow)]
pub struct UserWithBranchRow {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub branch_id: Option<Uuid>,
    pub branch_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
