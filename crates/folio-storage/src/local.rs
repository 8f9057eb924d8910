use crate::keys::{public_url, validate_path};
use crate::traits::{
    ListEntry, RemoveFailure, RemoveOutcome, Storage, StorageError, StorageObject, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// The directory at `base_path` is the bucket root. Public URLs use the same
/// shape as Supabase Storage so stored references parse identically.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for the bucket (e.g., "/var/lib/folio/portfolio-iuri")
    /// * `base_url` - Origin serving the files (e.g., "http://localhost:3000")
    /// * `bucket` - Bucket name used in public URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.into(),
            bucket: bucket.into(),
        })
    }

    /// Convert an object path to a filesystem path with traversal checks
    fn key_to_path(&self, path: &str) -> StorageResult<PathBuf> {
        validate_path(path)?;

        let full = self.base_path.join(path);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = full.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Object path resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(full)
    }

    fn prefix_to_dir(&self, prefix: &str) -> StorageResult<PathBuf> {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            Ok(self.base_path.clone())
        } else {
            self.key_to_path(prefix)
        }
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn created_at(meta: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    meta.created()
        .or_else(|_| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, path: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let file_path = self.key_to_path(path)?;
        let size = data.len();

        self.ensure_parent_dir(&file_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(path.to_string())
                } else {
                    StorageError::UploadFailed(format!(
                        "Failed to create file {}: {}",
                        file_path.display(),
                        e
                    ))
                }
            })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %file_path.display(),
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        public_url(&self.base_url, &self.bucket, path)
    }

    async fn list(
        &self,
        prefix: &str,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<ListEntry>> {
        let dir = self.prefix_to_dir(prefix)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut read_dir = fs::read_dir(&dir).await.map_err(|e| {
            StorageError::ListFailed(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(ListEntry {
                name,
                created_at: if meta.is_file() { created_at(&meta) } else { None },
                size: meta.is_file().then(|| meta.len()),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }

    async fn stat(&self, path: &str) -> StorageResult<Option<StorageObject>> {
        let file_path = self.key_to_path(path)?;
        match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => Ok(Some(StorageObject {
                path: path.to_string(),
                created_at: created_at(&meta),
                size_bytes: meta.len(),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<RemoveOutcome> {
        let start = std::time::Instant::now();
        let mut outcome = RemoveOutcome::default();

        for path in paths {
            let file_path = match self.key_to_path(path) {
                Ok(p) => p,
                Err(e) => {
                    outcome.failed.push(RemoveFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match fs::remove_file(&file_path).await {
                Ok(()) => outcome.removed.push(path.clone()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => outcome.failed.push(RemoveFailure {
                    path: path.clone(),
                    reason: format!("Failed to delete file {}: {}", file_path.display(), e),
                }),
            }
        }

        tracing::info!(
            requested = paths.len(),
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage remove finished"
        );

        Ok(outcome)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use crate::keys::parse_public_url;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000", "portfolio-iuri")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_and_stat() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .upload("trabalhos/1-abc.png", "image/png", b"test data".to_vec())
            .await
            .unwrap();

        let parsed = parse_public_url(&url).unwrap();
        assert_eq!(parsed.bucket, "portfolio-iuri");
        assert_eq!(parsed.path, "trabalhos/1-abc.png");

        let object = storage.stat("trabalhos/1-abc.png").await.unwrap().unwrap();
        assert_eq!(object.size_bytes, 9);
        assert!(object.created_at.is_some());
    }

    #[tokio::test]
    async fn test_upload_never_overwrites() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload("uploads/a.png", "image/png", b"one".to_vec())
            .await
            .unwrap();
        let result = storage
            .upload("uploads/a.png", "image/png", b"two".to_vec())
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.stat("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .upload("/etc/passwd", "text/plain", Vec::new())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let outcome = storage.remove(&["../etc/passwd".to_string()]).await.unwrap();
        assert_eq!(outcome.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_reports_removed_and_skips_missing() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload("uploads/a.png", "image/png", b"a".to_vec())
            .await
            .unwrap();

        let outcome = storage
            .remove(&["uploads/a.png".to_string(), "uploads/missing.png".to_string()])
            .await
            .unwrap();
        assert_eq!(outcome.removed, vec!["uploads/a.png".to_string()]);
        assert!(outcome.failed.is_empty());
        assert!(storage.stat("uploads/a.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_marks_folders_and_pages() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        for name in ["a.png", "b.png", "c.png"] {
            storage
                .upload(&format!("uploads/{}", name), "image/png", b"x".to_vec())
                .await
                .unwrap();
        }
        storage
            .upload("uploads/nested/d.png", "image/png", b"x".to_vec())
            .await
            .unwrap();

        let root = storage.list("", 100, 0).await.unwrap();
        assert_eq!(root.len(), 1);
        assert!(!root[0].is_file());

        let page = storage.list("uploads", 2, 1).await.unwrap();
        let names: Vec<&str> = page.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.png", "c.png"]);

        assert!(storage.list("missing", 100, 0).await.unwrap().is_empty());
    }
}
