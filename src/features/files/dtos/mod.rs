mod file_dto;

pub use file_dto::{DownloadUrlResponseDto, UploadFileDto, UploadUrlResponseDto};
