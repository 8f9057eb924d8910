use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use folio_db::{ProfileStore, WorkStore};
use folio_storage::parse_public_url;

use super::error::CleanupError;

/// Object paths referenced by the database of record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedPaths(HashSet<String>);

impl ReferencedPaths {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromIterator<String> for ReferencedPaths {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ReferencedPaths(iter.into_iter().collect())
    }
}

/// Convert stored URLs to object paths, skipping (and logging) any that do not parse.
///
/// Paths are kept whatever bucket the URL names.
pub fn paths_from_urls<I>(urls: I) -> ReferencedPaths
where
    I: IntoIterator<Item = String>,
{
    urls.into_iter()
        .filter_map(|url| match parse_public_url(&url) {
            Some(object) => Some(object.path),
            None => {
                tracing::warn!(url = %url, "Skipping unparseable file reference");
                None
            }
        })
        .collect()
}

/// Source of the set of live object paths
#[async_trait]
pub trait ReferencedFileIndex: Send + Sync {
    async fn build_index(&self) -> Result<ReferencedPaths, CleanupError>;
}

/// Builds the index by scanning every work's images and the profile photo
#[derive(Clone)]
pub struct ScanningIndex {
    works: Arc<dyn WorkStore>,
    profile: Arc<dyn ProfileStore>,
}

impl ScanningIndex {
    pub fn new(works: Arc<dyn WorkStore>, profile: Arc<dyn ProfileStore>) -> Self {
        Self { works, profile }
    }
}

#[async_trait]
impl ReferencedFileIndex for ScanningIndex {
    #[tracing::instrument(skip(self), fields(cleanup.operation = "build_index"))]
    async fn build_index(&self) -> Result<ReferencedPaths, CleanupError> {
        let image_urls = self
            .works
            .all_image_urls()
            .await
            .map_err(CleanupError::IndexBuild)?;
        let photo_urls = self
            .profile
            .photo_urls()
            .await
            .map_err(CleanupError::IndexBuild)?;

        let referenced = paths_from_urls(image_urls.into_iter().chain(photo_urls));
        tracing::debug!(referenced = referenced.len(), "Referenced-file index built");
        Ok(referenced)
    }
}
