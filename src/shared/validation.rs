use std::borrow::Cow;

use validator::ValidationError;

/// Struct-level error for update payloads that name no fields at all.
/// Rejecting these at the schema stage keeps empty PATCH requests from ever
/// reaching the database.
pub fn empty_update_error(message: &'static str) -> ValidationError {
    ValidationError::new("empty_update").with_message(Cow::Borrowed(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_code_and_message() {
        let error = empty_update_error("At least one field is required");
        assert_eq!(error.code, "empty_update");
        assert_eq!(
            error.message.as_deref(),
            Some("At least one field is required")
        );
    }
}
