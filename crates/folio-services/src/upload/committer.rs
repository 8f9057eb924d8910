use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use folio_storage::{generate_object_path, Storage, StorageError};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use super::stager::CandidateFile;

/// Why a single upload failed
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Upload cancelled")]
    Cancelled,
}

/// A file that made it into the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub name: String,
    pub url: String,
}

#[derive(Debug)]
pub struct FileUploadFailure {
    pub name: String,
    pub error: UploadError,
}

/// Aggregate failure of a commit.
///
/// `uploaded` lists the files that did reach the bucket; they are not referenced by
/// any record and are left for the orphan sweep.
#[derive(Debug)]
pub struct CommitError {
    pub failures: Vec<FileUploadFailure>,
    pub uploaded: Vec<CommittedFile>,
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} uploads failed",
            self.failures.len(),
            self.failures.len() + self.uploaded.len()
        )
    }
}

impl std::error::Error for CommitError {}

/// Where committed files are written
#[async_trait]
pub trait UploadTarget: Send + Sync {
    /// Upload one file into `folder` and return its public URL
    async fn upload(&self, file: &CandidateFile, folder: &str) -> Result<String, UploadError>;
}

/// Uploads straight into the configured object store under a fresh unique path
#[derive(Clone)]
pub struct StorageUploadTarget {
    storage: Arc<dyn Storage>,
}

impl StorageUploadTarget {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl UploadTarget for StorageUploadTarget {
    async fn upload(&self, file: &CandidateFile, folder: &str) -> Result<String, UploadError> {
        let path = generate_object_path(folder, &file.name)?;
        let url = self
            .storage
            .upload(&path, &file.content_type, file.data.to_vec())
            .await?;
        Ok(url)
    }
}

/// Uploads a batch of staged files concurrently
#[derive(Clone)]
pub struct UploadCommitter {
    target: Arc<dyn UploadTarget>,
}

impl UploadCommitter {
    pub fn new(target: Arc<dyn UploadTarget>) -> Self {
        Self { target }
    }

    pub fn for_storage(storage: Arc<dyn Storage>) -> Self {
        Self::new(Arc::new(StorageUploadTarget::new(storage)))
    }

    /// Upload every file, wait for all of them, and fail if any failed.
    ///
    /// On success the URLs are returned in input order.
    #[tracing::instrument(skip(self, files), fields(upload.count = files.len(), upload.folder = %folder))]
    pub async fn commit(
        &self,
        files: &[CandidateFile],
        folder: &str,
    ) -> Result<Vec<CommittedFile>, CommitError> {
        let uploads = files.iter().map(|file| self.target.upload(file, folder));
        let results = join_all(uploads).await;
        collect_results(files, results)
    }

    /// Like [`commit`](Self::commit), but uploads still running when `token` is
    /// cancelled are reported as [`UploadError::Cancelled`].
    #[tracing::instrument(skip(self, files, token), fields(upload.count = files.len(), upload.folder = %folder))]
    pub async fn commit_cancellable(
        &self,
        files: &[CandidateFile],
        folder: &str,
        token: &CancellationToken,
    ) -> Result<Vec<CommittedFile>, CommitError> {
        let uploads = files.iter().map(|file| async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(UploadError::Cancelled),
                result = self.target.upload(file, folder) => result,
            }
        });
        let results = join_all(uploads).await;
        collect_results(files, results)
    }
}

fn collect_results(
    files: &[CandidateFile],
    results: Vec<Result<String, UploadError>>,
) -> Result<Vec<CommittedFile>, CommitError> {
    let mut uploaded = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(url) => uploaded.push(CommittedFile {
                name: file.name.clone(),
                url,
            }),
            Err(error) => {
                tracing::warn!(file = %file.name, error = %error, "Upload failed");
                failures.push(FileUploadFailure {
                    name: file.name.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        tracing::info!(uploaded = uploaded.len(), "Commit uploads finished");
        Ok(uploaded)
    } else {
        Err(CommitError { failures, uploaded })
    }
}

/// Existing URLs first, then the new ones in order.
pub fn merge_urls(existing: &[String], new: &[String]) -> Vec<String> {
    existing.iter().chain(new.iter()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStorage;
    use folio_storage::parse_public_url;

    fn file(name: &str, payload: &[u8]) -> CandidateFile {
        CandidateFile::new(name, "image/png", payload.to_vec())
    }

    #[tokio::test]
    async fn test_commit_uploads_all_in_order() {
        let storage = Arc::new(MockStorage::new());
        let committer = UploadCommitter::for_storage(storage.clone());

        let files = vec![file("a.png", b"a"), file("b.png", b"b"), file("c.png", b"c")];
        let committed = committer.commit(&files, "trabalhos").await.unwrap();

        let names: Vec<&str> = committed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        for c in &committed {
            let path = parse_public_url(&c.url).unwrap().path;
            assert!(path.starts_with("trabalhos/"));
            assert!(storage.has_object(&path));
        }
        assert_eq!(storage.object_count(), 3);
    }

    #[tokio::test]
    async fn test_commit_waits_for_all_and_reports_partial_success() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_uploads_of(b"broken");
        let committer = UploadCommitter::for_storage(storage.clone());

        let files = vec![file("a.png", b"a"), file("b.png", b"broken"), file("c.png", b"c")];
        let err = committer.commit(&files, "trabalhos").await.unwrap_err();

        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].name, "b.png");
        assert_eq!(err.uploaded.len(), 2);
        // Successful siblings stay in the bucket as unreferenced objects.
        assert_eq!(storage.object_count(), 2);
        assert_eq!(err.to_string(), "1 of 3 uploads failed");
    }

    #[tokio::test]
    async fn test_commit_empty_batch() {
        let committer = UploadCommitter::for_storage(Arc::new(MockStorage::new()));
        assert!(committer.commit(&[], "trabalhos").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_cancelled_before_start() {
        let storage = Arc::new(MockStorage::new());
        let committer = UploadCommitter::for_storage(storage.clone());
        let token = CancellationToken::new();
        token.cancel();

        let err = committer
            .commit_cancellable(&[file("a.png", b"a")], "trabalhos", &token)
            .await
            .unwrap_err();
        assert!(matches!(err.failures[0].error, UploadError::Cancelled));
        assert_eq!(storage.object_count(), 0);
    }

    #[test]
    fn test_merge_urls_existing_first() {
        let existing = vec!["u1".to_string(), "u2".to_string()];
        let new = vec!["n1".to_string(), "n2".to_string()];
        assert_eq!(
            merge_urls(&existing, &new),
            vec!["u1", "u2", "n1", "n2"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }
}
