//! S3-compatible storage client
//!
//! Load documents are uploaded and fetched by the browser directly against
//! presigned URLs; this service only mints the URLs and issues deletes.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use s3::creds::Credentials;
use s3::{Bucket, Region};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// Everything a client needs to PUT the file itself
#[derive(Debug, Clone)]
pub struct UploadTicket {
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

/// Temporary GET access to a stored file
#[derive(Debug, Clone)]
pub struct DownloadTicket {
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

/// S3-compatible storage client for load documents
pub struct StorageClient {
    bucket: Box<Bucket>,
    upload_url_expiry_secs: u32,
    download_url_expiry_secs: u32,
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket/key) for MinIO compatibility
        bucket.set_path_style();

        Ok(Self {
            bucket,
            upload_url_expiry_secs: config.upload_url_expiry_secs,
            download_url_expiry_secs: config.download_url_expiry_secs,
        })
    }

    /// Mint a file id and a presigned PUT URL for it.
    ///
    /// No database row is written here; the id becomes a `file` row the first
    /// time a load lists it.
    pub async fn create_upload_url(
        &self,
        file_name: &str,
        content_type: &str,
        content_length: i64,
    ) -> Result<UploadTicket, AppError> {
        let file_id = Uuid::new_v4();
        let key = file_id.to_string();

        let upload_url = self
            .bucket
            .presign_put(&key, self.upload_url_expiry_secs, None, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate upload URL for '{}': {}",
                    key, e
                ))
            })?;

        let expires_at = Utc::now() + Duration::seconds(self.upload_url_expiry_secs as i64);

        let mut required_headers = HashMap::new();
        required_headers.insert("Content-Type".to_string(), content_type.to_string());

        Ok(UploadTicket {
            file_id,
            bucket: self.bucket.name(),
            key,
            upload_url,
            expires_at,
            required_headers,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            content_length,
        })
    }

    /// Generate a presigned GET URL for a stored file
    pub async fn create_download_url(&self, file_id: Uuid) -> Result<DownloadTicket, AppError> {
        let key = file_id.to_string();

        let download_url = self
            .bucket
            .presign_get(&key, self.download_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate download URL for '{}': {}",
                    key, e
                ))
            })?;

        let expires_at = Utc::now() + Duration::seconds(self.download_url_expiry_secs as i64);

        Ok(DownloadTicket {
            download_url,
            expires_at,
        })
    }

    /// Delete a stored file
    pub async fn delete_file(&self, file_id: Uuid) -> Result<(), AppError> {
        let key = file_id.to_string();

        self.bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file '{}': {}", key, e)))?;

        tracing::debug!(
            "Deleted file '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }
}
