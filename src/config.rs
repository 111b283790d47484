use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_IMAGE_BUCKET: &str = "images";

/// Object storage settings for report images.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base used to build the public URL of an uploaded object.
    pub public_url: String,
    /// Bound on each storage operation, retries included.
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Upper bound for every remote call; exceeding it is a transport error.
    pub request_timeout: Duration,
    pub session_file: PathBuf,
    /// `None` when `S3_ENDPOINT` is unset; reports then cannot carry an image.
    pub storage: Option<StorageConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            session_file: PathBuf::from("data/session.json"),
            storage: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        fn str_env(name: &str, default: &str) -> String { std::env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string()) }
        fn dur_env(name: &str, default: u64) -> Duration { Duration::from_secs(std::env::var(name).ok().and_then(|v| v.parse().ok()).filter(|s| *s > 0).unwrap_or(default)) }

        let request_timeout = dur_env("LF_REQUEST_TIMEOUT_SECS", 15);
        let storage = std::env::var("S3_ENDPOINT").ok().filter(|v| !v.trim().is_empty()).map(|endpoint| StorageConfig {
            bucket: str_env("S3_BUCKET", DEFAULT_IMAGE_BUCKET),
            region: str_env("S3_REGION", "us-east-1"),
            access_key: std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("S3_SECRET_KEY").unwrap_or_default(),
            public_url: str_env("S3_PUBLIC_URL", &endpoint),
            timeout: request_timeout,
            endpoint,
        });
        if storage.is_none() {
            info!("S3_ENDPOINT not set; image uploads disabled");
        }

        Self {
            api_base_url: str_env("LF_API_BASE_URL", DEFAULT_API_BASE_URL).trim_end_matches('/').to_string(),
            request_timeout,
            session_file: PathBuf::from(str_env("LF_SESSION_FILE", "data/session.json")),
            storage,
        }
    }
}
