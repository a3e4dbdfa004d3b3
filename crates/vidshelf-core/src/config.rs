//! Configuration module
//!
//! Configuration is read from environment variables (optionally from a `.env` file) and
//! covers the HTTP server, the storage backend, and upload limits.

use std::env;

use crate::constants::VIDEO_EXTENSIONS;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 4000;
const MAX_VIDEO_SIZE_MB: usize = 500;
const LOCAL_STORAGE_PATH: &str = "uploads";
const CATALOG_PATH: &str = "data/videos.json";
const S3_PREFIX: &str = "videos";
const CATALOG_KEY: &str = "catalog/videos.json";

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Storage and upload configuration for the video store
#[derive(Clone, Debug)]
pub struct VideoStoreConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    // Local backend
    pub local_storage_path: String,
    pub catalog_path: String,
    /// Used to build URLs when no request context is available.
    pub public_base_url: Option<String>,
    // Remote backend
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub s3_prefix: String,
    pub catalog_key: String,
    // Uploads
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<VideoStoreConfig>);

impl Config {
    fn inner(&self) -> &VideoStoreConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = VideoStoreConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn catalog_path(&self) -> &str {
        &self.inner().catalog_path
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.inner().public_base_url.as_deref()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn s3_prefix(&self) -> &str {
        &self.inner().s3_prefix
    }

    pub fn catalog_key(&self) -> &str {
        &self.inner().catalog_key
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.inner().max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.inner().video_allowed_extensions
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl VideoStoreConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let storage_backend = match optional_var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let video_allowed_extensions = optional_var("VIDEO_ALLOWED_EXTENSIONS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect());

        let config = VideoStoreConfig {
            base,
            storage_backend,
            local_storage_path: optional_var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            catalog_path: optional_var("CATALOG_PATH").unwrap_or_else(|| CATALOG_PATH.to_string()),
            public_base_url: optional_var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            s3_bucket: optional_var("S3_BUCKET"),
            s3_region: optional_var("S3_REGION"),
            s3_endpoint: optional_var("S3_ENDPOINT"),
            aws_region: optional_var("AWS_REGION"),
            s3_prefix: optional_var("S3_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(|| S3_PREFIX.to_string()),
            catalog_key: optional_var("CATALOG_KEY").unwrap_or_else(|| CATALOG_KEY.to_string()),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than 0"));
        }
        if self.video_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH must not be empty"));
                }
                if self.catalog_path.trim().is_empty() {
                    return Err(anyhow::anyhow!("CATALOG_PATH must not be empty"));
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET is required when STORAGE_BACKEND=s3"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required when STORAGE_BACKEND=s3"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if matches!(
            self.storage_backend,
            StorageBackend::S3 | StorageBackend::Memory
        ) && self.catalog_key.trim().is_empty()
        {
            return Err(anyhow::anyhow!("CATALOG_KEY must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> VideoStoreConfig {
        VideoStoreConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
            },
            storage_backend: StorageBackend::Local,
            local_storage_path: "uploads".to_string(),
            catalog_path: "data/videos.json".to_string(),
            public_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            s3_prefix: "videos".to_string(),
            catalog_key: "catalog/videos.json".to_string(),
            max_video_size_bytes: 1024,
            video_allowed_extensions: vec!["mp4".to_string()],
        }
    }

    #[test]
    fn test_local_config_is_valid() {
        assert!(local_config().validate().is_ok());
    }

    #[test]
    fn test_s3_requires_bucket_and_region() {
        let mut config = local_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("videos".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_extension_list_rejected() {
        let mut config = local_config();
        config.video_allowed_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_detection() {
        let mut inner = local_config();
        inner.base.environment = "Prod".to_string();
        assert!(Config(Box::new(inner)).is_production());
        assert!(!Config(Box::new(local_config())).is_production());
    }
}
