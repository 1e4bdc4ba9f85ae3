use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity attached by the gateway: the subject claim doubles as the
/// `users.id` primary key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
