use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::storage::{DownloadTicket, UploadTicket};

/// Request DTO for minting a presigned upload URL
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileDto {
    #[validate(length(min = 1, message = "fileName is required"))]
    pub file_name: String,

    #[validate(length(min = 1, message = "contentType is required"))]
    pub content_type: String,

    #[validate(range(min = 1, max = 104_857_600, message = "size must be between 1 byte and 100MB"))]
    #[schema(maximum = 104857600)]
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponseDto {
    pub file_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
    pub required_headers: HashMap<String, String>,
    pub file_name: String,
    pub content_type: String,
    pub content_length: i64,
}

impl From<UploadTicket> for UploadUrlResponseDto {
    fn from(ticket: UploadTicket) -> Self {
        Self {
            file_id: ticket.file_id,
            bucket: ticket.bucket,
            key: ticket.key,
            upload_url: ticket.upload_url,
            expires_at: ticket.expires_at,
            required_headers: ticket.required_headers,
            file_name: ticket.file_name,
            content_type: ticket.content_type,
            content_length: ticket.content_length,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponseDto {
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

impl From<DownloadTicket> for DownloadUrlResponseDto {
    fn from(ticket: DownloadTicket) -> Self {
        Self {
            download_url: ticket.download_url,
            expires_at: ticket.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    const MAX_UPLOAD_SIZE_BYTES: i64 = 100 * 1024 * 1024;

    #[test]
    fn oversized_uploads_fail_validation() {
        let dto = UploadFileDto {
            file_name: "bol.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: MAX_UPLOAD_SIZE_BYTES + 1,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn zero_size_fails_validation() {
        let dto = UploadFileDto {
            file_name: "bol.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 0,
        };
        assert!(dto.validate().is_err());
    }
}
