use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors from the image storage service
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Cloud image storage is not configured")]
    NotConfigured,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image storage failed: {0}")]
    Storage(String),
}

/// A stored image as reported by the storage backend
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedImage {
    pub public_id: String,
    pub url: String,
}

/// Cloud image storage used for book covers and profile pictures
#[async_trait]
pub trait CloudinaryService: Send + Sync {
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>)
        -> Result<UploadedImage, MediaError>;

    async fn delete_image(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Registered when no storage credentials are available; every call
/// reports `NotConfigured`
#[derive(Debug, Default)]
pub struct UnconfiguredCloudinaryService;

#[async_trait]
impl CloudinaryService for UnconfiguredCloudinaryService {
    async fn upload_image(
        &self,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<UploadedImage, MediaError> {
        tracing::warn!(file_name, "image upload requested but storage is not configured");
        Err(MediaError::NotConfigured)
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), MediaError> {
        tracing::warn!(public_id, "image delete requested but storage is not configured");
        Err(MediaError::NotConfigured)
    }
}
