use sqlx::FromRow;
use uuid::Uuid;

/// Branch row joined with its owner (the user holding the Owner role for it)
#[derive(Debug, Clone, FromRow)]
pub struct BranchWithOwnerRow {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub owner_id: Option<String>,
    pub owner_email: Option<String>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
}
