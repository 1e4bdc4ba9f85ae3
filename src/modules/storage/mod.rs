//! Storage module for load documents
//!
//! Provides an S3-compatible client for presigned upload/download URL
//! generation and object deletion.

mod s3_client;

pub use s3_client::{DownloadTicket, StorageClient, UploadTicket};
