//! Configuration module
//!
//! Configuration for the API server and the maintenance CLI: database, object store,
//! upload limits, cleanup age floors, and the tag cache.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BUCKET: &str = "portfolio-iuri";
const MAX_FILE_SIZE_MB: u64 = 10;
const MAX_FILES: usize = 5;
const DEFAULT_ALLOWED_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
const CLEANUP_EDIT_AGE_MINUTES: u64 = 30;
const CLEANUP_DELETE_AGE_MINUTES: u64 = 5;
const TAG_CACHE_TTL_SECS: u64 = 3 * 60 * 60;
// Upper bounds accepted from the environment
const UPLOAD_MAX_SIZE_MB_LIMIT: u64 = 1024;
const CLEANUP_AGE_MINUTES_LIMIT: u64 = 365 * 24 * 60;

/// Object store settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Limits applied to files selected for upload
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_size_mb: u64,
    /// Exact MIME types; matching is case-sensitive.
    pub allowed_types: Vec<String>,
    pub max_files: usize,
    pub default_folder: String,
}

/// Orphan sweep policy
#[derive(Clone, Debug)]
pub struct CleanupConfig {
    pub enabled: bool,
    /// Minimum object age for sweeps triggered after a create/update.
    pub edit_age_minutes: u64,
    /// Minimum object age for sweeps triggered after a delete.
    pub delete_age_minutes: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub cleanup: CleanupConfig,
    pub tag_cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from the process environment (and `.env` when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = split_list(&cors_origins_str);

        let backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Supabase,
        };

        let storage = StorageConfig {
            backend,
            bucket: lookup("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            supabase_url: lookup("SUPABASE_URL")
                .or_else(|| lookup("NEXT_PUBLIC_SUPABASE_URL"))
                .map(|url| url.trim_end_matches('/').to_string()),
            supabase_service_key: lookup("SUPABASE_SERVICE_ROLE_KEY"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
        };

        let upload = UploadConfig {
            max_size_mb: lookup("UPLOAD_MAX_SIZE_MB")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILE_SIZE_MB),
            // Content types are compared exactly, so they are not lowercased here.
            allowed_types: split_list(
                &lookup("UPLOAD_ALLOWED_TYPES").unwrap_or_else(|| DEFAULT_ALLOWED_TYPES.to_string()),
            ),
            max_files: lookup("UPLOAD_MAX_FILES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILES),
            default_folder: lookup("UPLOAD_DEFAULT_FOLDER")
                .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string()),
        };

        let cleanup = CleanupConfig {
            enabled: lookup("CLEANUP_ENABLED")
                .map(|s| s.to_lowercase().parse().unwrap_or(true))
                .unwrap_or(true),
            edit_age_minutes: lookup("CLEANUP_EDIT_AGE_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CLEANUP_EDIT_AGE_MINUTES),
            delete_age_minutes: lookup("CLEANUP_DELETE_AGE_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CLEANUP_DELETE_AGE_MINUTES),
        };

        Ok(Config {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage,
            upload,
            cleanup,
            tag_cache_ttl_secs: lookup("TAG_CACHE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TAG_CACHE_TTL_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET cannot be empty"));
        }

        match self.storage.backend {
            StorageBackend::Supabase => {
                if self.storage.supabase_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "SUPABASE_URL must be set when using the supabase storage backend"
                    ));
                }
                if self.storage.supabase_service_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "SUPABASE_SERVICE_ROLE_KEY must be set when using the supabase storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using the local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using the local storage backend"
                    ));
                }
            }
        }

        if self.upload.max_size_mb == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_SIZE_MB must be greater than 0"));
        }
        if self.upload.max_size_mb > UPLOAD_MAX_SIZE_MB_LIMIT {
            return Err(anyhow::anyhow!(
                "UPLOAD_MAX_SIZE_MB must be at most {}",
                UPLOAD_MAX_SIZE_MB_LIMIT
            ));
        }
        if self.upload.max_files == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_FILES must be greater than 0"));
        }
        if self.upload.allowed_types.is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_ALLOWED_TYPES cannot be empty"));
        }
        if self.cleanup.edit_age_minutes > CLEANUP_AGE_MINUTES_LIMIT {
            return Err(anyhow::anyhow!(
                "CLEANUP_EDIT_AGE_MINUTES must be at most {}",
                CLEANUP_AGE_MINUTES_LIMIT
            ));
        }
        if self.cleanup.delete_age_minutes > CLEANUP_AGE_MINUTES_LIMIT {
            return Err(anyhow::anyhow!(
                "CLEANUP_DELETE_AGE_MINUTES must be at most {}",
                CLEANUP_AGE_MINUTES_LIMIT
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn bucket(&self) -> &str {
        &self.storage.bucket
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.upload.max_size_mb.saturating_mul(1024 * 1024)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
