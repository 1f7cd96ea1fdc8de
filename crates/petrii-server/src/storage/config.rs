use std::{env, path::PathBuf, str::FromStr};

/// Default directory for the local backend.
pub const DEFAULT_UPLOADS_DIR: &str = "./uploads";

/// Default public prefix for stored files.
pub const DEFAULT_PUBLIC_UPLOADS_URL: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Files on local disk, served by the server itself
    #[default]
    Local,
    /// S3-compatible object storage (AWS, MinIO)
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(StorageBackend::Local),
            "s3" | "minio" => Ok(StorageBackend::S3),
            other => anyhow::bail!("Unknown storage backend: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uploads_dir: PathBuf,
    /// Prefix of every public file location, e.g. `/uploads` or a CDN URL
    pub public_base_url: String,
    pub s3: S3Config,
}

#[derive(Clone)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("path_style", &self.path_style)
            .finish()
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            bucket: "petrii-uploads".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::for_local(DEFAULT_UPLOADS_DIR)
    }
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = S3Config::default();

        Ok(Self {
            backend: match env::var("STORAGE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StorageBackend::default(),
            },
            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOADS_DIR)),
            public_base_url: env::var("PUBLIC_UPLOADS_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_UPLOADS_URL.to_string()),
            s3: S3Config {
                endpoint: env::var("S3_ENDPOINT").ok(),
                region: env::var("S3_REGION").unwrap_or(defaults.region),
                bucket: env::var("S3_BUCKET").unwrap_or(defaults.bucket),
                access_key: env::var("S3_ACCESS_KEY")
                    .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                    .unwrap_or(defaults.access_key),
                secret_key: env::var("S3_SECRET_KEY")
                    .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                    .unwrap_or(defaults.secret_key),
                path_style: env::var("S3_PATH_STYLE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(false),
            },
        })
    }

    pub fn for_local(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Local,
            uploads_dir: dir.into(),
            public_base_url: DEFAULT_PUBLIC_UPLOADS_URL.to_string(),
            s3: S3Config::default(),
        }
    }

    pub fn for_minio(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::S3,
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            public_base_url: DEFAULT_PUBLIC_UPLOADS_URL.to_string(),
            s3: S3Config {
                endpoint: Some(endpoint.into()),
                bucket: bucket.into(),
                path_style: true,
                ..S3Config::default()
            },
        }
    }
}
