use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Success envelope: the handler result plus the correlation id assigned by
/// the request-id layer. Errors never pass through here; they are shaped in
/// one place by `AppError`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, request_id: Option<String>) -> Self {
        Self { data, request_id }
    }
}

/// Plain acknowledgement body used by mutations that return no entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// PAGINATION & SORTING
// =============================================================================

/// Sort direction tokens as the frontend sends them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    #[default]
    Descend,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascend => "ASC",
            SortOrder::Descend => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascend" => Ok(SortOrder::Ascend),
            "descend" => Ok(SortOrder::Descend),
            _ => Err(()),
        }
    }
}

/// SQL OFFSET for a zero-based page index
pub fn page_offset(page: i64, limit: i64) -> i64 {
    page.max(0) * clamp_limit(limit)
}

/// Clamped page size (respects MAX_PAGE_SIZE)
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

// Query parameters arrive as strings; malformed values fall back to the
// documented defaults instead of failing the request.

pub fn de_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or(0))
}

pub fn de_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PAGE_SIZE))
}

/// Lenient token parsing for sort fields and directions: unknown tokens fall
/// back to the type's default rather than rejecting the request.
pub fn de_lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

pub fn default_page() -> i64 {
    0
}

pub fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default = "default_page", deserialize_with = "de_page")]
        page: i64,
        #[serde(default = "default_limit", deserialize_with = "de_limit")]
        limit: i64,
        #[serde(default, deserialize_with = "de_lenient")]
        sort_order: SortOrder,
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let params: Params =
            serde_urlencoded::from_str("page=abc&limit=&sort_order=descend").unwrap();
        assert_eq!(params.page, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn missing_parameters_use_defaults() {
        let params: Params = serde_urlencoded::from_str("").unwrap();
        assert_eq!(params.page, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(params.sort_order, SortOrder::Descend);
    }

    #[test]
    fn unknown_sort_order_falls_back_to_descending() {
        let params: Params = serde_urlencoded::from_str("sort_order=sideways").unwrap();
        assert_eq!(params.sort_order, SortOrder::Descend);
    }

    #[test]
    fn offset_is_page_times_clamped_limit() {
        assert_eq!(page_offset(0, 5), 0);
        assert_eq!(page_offset(3, 5), 15);
        assert_eq!(page_offset(-1, 5), 0);
        assert_eq!(page_offset(1, 500), MAX_PAGE_SIZE);
    }

    #[test]
    fn limit_is_clamped_to_bounds() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(10), 10);
        assert_eq!(clamp_limit(1000), MAX_PAGE_SIZE);
    }
}
