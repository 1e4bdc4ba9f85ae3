/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Role whose holder acts as a branch owner; at most one per branch
pub const ROLE_OWNER: &str = "Owner";
