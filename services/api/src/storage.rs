//! S3-backed storage for profile images

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use tracing::info;
use uuid::Uuid;

/// Image MIME types accepted for upload
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Upload size ceiling in bytes (5 MB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// File extension for an accepted MIME type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding profile images
    pub bucket: String,
    /// Base URL under which stored objects are publicly reachable
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: S3 bucket name (default: "tapfolio-media")
    /// - `MEDIA_PUBLIC_URL`: public base URL (default: the bucket's S3 URL)
    pub fn from_env() -> Self {
        let bucket =
            std::env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "tapfolio-media".to_string());

        let public_base_url = std::env::var("MEDIA_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        StorageConfig {
            bucket,
            public_base_url,
        }
    }
}

/// Reference to an uploaded image
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Object key inside the bucket
    pub key: String,
    /// Public URL of the object
    pub url: String,
}

/// Media storage backed by S3
#[derive(Clone)]
pub struct MediaStorage {
    s3_client: Client,
    config: StorageConfig,
}

impl MediaStorage {
    /// Create a new media storage
    pub fn new(s3_client: Client, config: StorageConfig) -> Self {
        Self { s3_client, config }
    }

    /// Upload a profile image and return its stored reference
    ///
    /// The caller is expected to have checked the MIME type and size
    /// already; the type check here is the last line of defense.
    pub async fn upload_image(
        &self,
        profile_id: Uuid,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredImage> {
        let extension = extension_for(content_type)
            .ok_or_else(|| anyhow::anyhow!("Unsupported image type: {}", content_type))?;

        let key = format!("profiles/{}/{}.{}", profile_id, Uuid::new_v4(), extension);

        self.s3_client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;

        info!("Uploaded profile image {}", key);

        let url = format!("{}/{}", self.config.public_base_url, key);
        Ok(StoredImage { key, url })
    }

    /// Delete a previously uploaded image
    pub async fn delete_image(&self, key: &str) -> Result<()> {
        self.s3_client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await?;

        info!("Deleted profile image {}", key);
        Ok(())
    }
}
