use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::config::StorageConfig;

/// Largest image accepted for upload.
pub const IMAGE_SIZE_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("empty file")]
    Empty,
    #[error("file too large ({0} bytes)")]
    TooLarge(usize),
    #[error("unsupported media type: {0}")]
    Unsupported(String),
    #[error("other: {0}")]
    Other(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return the public URL it can be fetched from.
    async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError>;
}

/// Object key for an upload: `image-<millis>-<originalName>`, directory parts stripped.
pub fn object_key(original_name: &str, timestamp_millis: i64) -> String {
    let base = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("image-{timestamp_millis}-{base}")
}

/// Size and MIME checks shared by every backend. Returns the sniffed MIME type.
pub fn check_image(bytes: &[u8]) -> Result<String, ImageStoreError> {
    if bytes.is_empty() {
        return Err(ImageStoreError::Empty);
    }
    if bytes.len() > IMAGE_SIZE_LIMIT {
        return Err(ImageStoreError::TooLarge(bytes.len()));
    }
    let mime = infer::get(bytes)
        .map(|t| t.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".into());
    if !mime.starts_with("image/") {
        return Err(ImageStoreError::Unsupported(mime));
    }
    Ok(mime)
}

// ---------------- S3 Implementation (MinIO compatible) ----------------
pub struct S3ImageStore {
    bucket: String,
    client: aws_sdk_s3::Client,
    public_url: String,
}

impl S3ImageStore {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        use aws_credential_types::provider::SharedCredentialsProvider;
        use aws_credential_types::Credentials;

        use aws_config::timeout::TimeoutConfig;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(cfg.region.clone()))
            .timeout_config(TimeoutConfig::builder().operation_timeout(cfg.timeout).build());
        loader = loader.endpoint_url(cfg.endpoint.clone());
        if !cfg.access_key.is_empty() && !cfg.secret_key.is_empty() {
            let creds = Credentials::new(cfg.access_key.clone(), cfg.secret_key.clone(), None, None, "static");
            loader = loader.credentials_provider(SharedCredentialsProvider::new(creds));
        }
        let conf = loader.load().await;
        // Path-style addressing: MinIO / local endpoints rarely have wildcard DNS
        let s3_conf = aws_sdk_s3::config::Builder::from(&conf)
            .force_path_style(true)
            .build();
        let client = aws_sdk_s3::Client::from_conf(s3_conf);
        info!("Initialized S3 client for bucket '{}'", cfg.bucket);

        // The bucket is provisioned server-side; only warn if it is not reachable
        if let Err(e) = client.head_bucket().bucket(&cfg.bucket).send().await {
            warn!("head_bucket failed for '{}': {e:?}", cfg.bucket);
        }

        Ok(Self {
            bucket: cfg.bucket.clone(),
            client,
            public_url: cfg.public_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, urlencoding::encode(key))
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        use aws_sdk_s3::error::SdkError;
        use aws_sdk_s3::primitives::ByteStream;
        let mime = check_image(bytes)?;
        let key = object_key(original_name, Utc::now().timestamp_millis());
        let put = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(mime);
        if let Err(e) = put.send().await {
            error!("put_object failed key={key} bucket={} err={:?}", self.bucket, e);
            let hint = if matches!(e, SdkError::TimeoutError(_)) {
                " (timed out)"
            } else if e.to_string().contains("NoSuchBucket") {
                " (bucket missing)"
            } else if e.to_string().contains("AccessDenied") {
                " (check S3_ACCESS_KEY/S3_SECRET_KEY permissions)"
            } else {
                ""
            };
            return Err(ImageStoreError::Other(format!("{e}{hint}")));
        }
        Ok(self.url_for(&key))
    }
}

/// Builds the store when storage is configured.
pub async fn build_image_store(cfg: Option<&StorageConfig>) -> anyhow::Result<Option<Arc<dyn ImageStore>>> {
    match cfg {
        Some(cfg) => {
            let store: Arc<dyn ImageStore> = Arc::new(S3ImageStore::new(cfg).await?);
            Ok(Some(store))
        }
        None => Ok(None),
    }
}
