use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use rand::Rng;

use super::committer::{merge_urls, CommitError, UploadCommitter};
use super::validator::{FileValidator, ValidationError};

const DEFAULT_MAX_FILES: usize = 5;
const LOCAL_ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A file selected for upload, held in memory until commit
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Default)]
struct PoolState {
    live: AtomicUsize,
    next_id: AtomicU64,
}

/// Tracks local preview resources handed out by a stager
#[derive(Debug, Clone, Default)]
pub struct PreviewPool {
    state: Arc<PoolState>,
}

impl PreviewPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> PreviewHandle {
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.live.fetch_add(1, Ordering::AcqRel);
        PreviewHandle {
            uri: format!("preview://{}", id),
            state: Arc::clone(&self.state),
        }
    }

    /// Number of previews not yet released
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::Acquire)
    }
}

/// Preview of a pending file; released when dropped
#[derive(Debug)]
pub struct PreviewHandle {
    uri: String,
    state: Arc<PoolState>,
}

impl PreviewHandle {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A staged file awaiting commit
#[derive(Debug)]
pub struct PendingFile {
    pub id: String,
    pub file: CandidateFile,
    pub preview: PreviewHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: ValidationError,
}

/// Outcome of adding a batch that fit within the file limit
#[derive(Debug, Default)]
pub struct AddReport {
    /// Local ids of the accepted files, in input order
    pub added: Vec<String>,
    pub rejected: Vec<RejectedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagingError {
    #[error("Too many files: {attempted} selected, at most {max} allowed")]
    TooManyFiles { attempted: usize, max: usize },
}

/// Holds selected files for one editing session
///
/// Nothing here touches the network: files are validated and previewed on
/// selection and only uploaded by [`commit`](Self::commit). Persisted URLs removed
/// during the session are only dropped from the edit buffer; the save path decides
/// what happens to them.
#[derive(Debug)]
pub struct PendingFileStager {
    validator: FileValidator,
    max_files: usize,
    folder: String,
    pending: Vec<PendingFile>,
    persisted: Vec<String>,
    removed_persisted: Vec<String>,
    previews: PreviewPool,
}

impl PendingFileStager {
    pub fn new(
        validator: FileValidator,
        max_files: usize,
        folder: impl Into<String>,
        persisted: Vec<String>,
    ) -> Self {
        Self {
            validator,
            max_files,
            folder: folder.into(),
            pending: Vec::new(),
            persisted,
            removed_persisted: Vec::new(),
            previews: PreviewPool::new(),
        }
    }

    /// Stager with the default limits for a folder and no persisted files
    pub fn for_folder(folder: impl Into<String>) -> Self {
        Self::new(FileValidator::default(), DEFAULT_MAX_FILES, folder, Vec::new())
    }

    /// Stage a batch of selected files.
    ///
    /// The whole batch is refused, with no state change, when it would push the
    /// total (persisted + pending + new) over the limit. Otherwise each file is
    /// validated on its own and invalid ones are reported and skipped.
    pub fn add_files(&mut self, files: Vec<CandidateFile>) -> Result<AddReport, StagingError> {
        let attempted = self.persisted.len() + self.pending.len() + files.len();
        if attempted > self.max_files {
            return Err(StagingError::TooManyFiles {
                attempted,
                max: self.max_files,
            });
        }

        let mut report = AddReport::default();
        for file in files {
            if let Err(reason) = self.validator.validate(file.size(), &file.content_type) {
                tracing::debug!(file = %file.name, reason = %reason, "Rejected selected file");
                report.rejected.push(RejectedFile {
                    name: file.name,
                    reason,
                });
                continue;
            }

            let id = generate_local_id();
            report.added.push(id.clone());
            self.pending.push(PendingFile {
                id,
                preview: self.previews.acquire(),
                file,
            });
        }

        Ok(report)
    }

    /// Drop one pending file and release its preview
    pub fn remove_file(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Remove a persisted URL from the edit buffer only
    pub fn remove_persisted(&mut self, url: &str) -> bool {
        let Some(position) = self.persisted.iter().position(|u| u == url) else {
            return false;
        };
        let removed = self.persisted.remove(position);
        self.removed_persisted.push(removed);
        true
    }

    /// Cancel: drop every pending file and release all previews
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Upload the pending files and fold their URLs into the persisted list.
    ///
    /// On success the pending list is emptied and the merged list is returned
    /// (persisted first, new uploads appended). On failure the pending files are
    /// kept for a retry.
    pub async fn commit(&mut self, committer: &UploadCommitter) -> Result<Vec<String>, CommitError> {
        if self.pending.is_empty() {
            return Ok(self.persisted.clone());
        }

        let files: Vec<CandidateFile> = self.pending.iter().map(|p| p.file.clone()).collect();
        let committed = committer.commit(&files, &self.folder).await?;

        let new_urls: Vec<String> = committed.into_iter().map(|c| c.url).collect();
        self.persisted = merge_urls(&self.persisted, &new_urls);
        self.pending.clear();

        Ok(self.persisted.clone())
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn persisted(&self) -> &[String] {
        &self.persisted
    }

    /// Persisted URLs dropped during this session
    pub fn removed_persisted(&self) -> &[String] {
        &self.removed_persisted
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn live_previews(&self) -> usize {
        self.previews.live()
    }
}

fn generate_local_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..LOCAL_ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}
