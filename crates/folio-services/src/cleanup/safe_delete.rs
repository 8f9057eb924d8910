use std::sync::Arc;

use folio_db::{ProfileStore, WorkStore};
use folio_storage::{parse_public_url, Storage};
use serde::Serialize;

use super::error::CleanupError;
use super::index::paths_from_urls;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeDeleteOutcome {
    /// True only when the store confirmed the object was removed
    pub deleted: bool,
}

/// Deletes a single object by URL unless some record still points at it
#[derive(Clone)]
pub struct SafeDeleter {
    works: Arc<dyn WorkStore>,
    profile: Arc<dyn ProfileStore>,
    storage: Arc<dyn Storage>,
}

impl SafeDeleter {
    pub fn new(
        works: Arc<dyn WorkStore>,
        profile: Arc<dyn ProfileStore>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            works,
            profile,
            storage,
        }
    }

    /// Whether any work or the profile still references `url`.
    ///
    /// An exact URL match answers first. Otherwise every stored URL is resolved
    /// to its object path, the same way the referenced-file index does, so a
    /// query string or a different encoding still counts as a reference.
    pub async fn is_referenced(&self, url: &str) -> Result<bool, CleanupError> {
        let in_works = self
            .works
            .count_with_image(url)
            .await
            .map_err(CleanupError::ReferenceCheck)?;
        if in_works > 0 {
            return Ok(true);
        }

        let as_photo = self
            .profile
            .count_with_photo(url)
            .await
            .map_err(CleanupError::ReferenceCheck)?;
        if as_photo > 0 {
            return Ok(true);
        }

        let Some(object) = parse_public_url(url) else {
            return Ok(false);
        };

        let image_urls = self
            .works
            .all_image_urls()
            .await
            .map_err(CleanupError::ReferenceCheck)?;
        let photo_urls = self
            .profile
            .photo_urls()
            .await
            .map_err(CleanupError::ReferenceCheck)?;

        Ok(paths_from_urls(image_urls.into_iter().chain(photo_urls)).contains(&object.path))
    }

    #[tracing::instrument(skip(self), fields(cleanup.operation = "safe_delete"))]
    pub async fn safe_delete(&self, url: &str) -> Result<SafeDeleteOutcome, CleanupError> {
        if self.is_referenced(url).await? {
            tracing::info!(url = %url, "File still referenced; not deleting");
            return Ok(SafeDeleteOutcome { deleted: false });
        }

        let object =
            parse_public_url(url).ok_or_else(|| CleanupError::InvalidUrl(url.to_string()))?;
        if object.bucket != self.storage.bucket() {
            return Err(CleanupError::ForeignBucket {
                found: object.bucket,
                expected: self.storage.bucket().to_string(),
            });
        }

        let outcome = self
            .storage
            .remove(std::slice::from_ref(&object.path))
            .await
            .map_err(CleanupError::Delete)?;

        if let Some(failure) = outcome.failed.into_iter().find(|f| f.path == object.path) {
            return Err(CleanupError::DeleteRejected {
                path: failure.path,
                reason: failure.reason,
            });
        }

        let deleted = outcome.removed.iter().any(|p| p == &object.path);
        if deleted {
            tracing::info!(path = %object.path, "Deleted unreferenced file");
        } else {
            tracing::debug!(path = %object.path, "File was already gone");
        }

        Ok(SafeDeleteOutcome { deleted })
    }

    /// Safe-delete each URL in turn, logging failures instead of returning them.
    ///
    /// Returns how many objects were removed.
    pub async fn safe_delete_all(&self, urls: &[String]) -> usize {
        let mut deleted = 0;
        for url in urls {
            match self.safe_delete(url).await {
                Ok(outcome) if outcome.deleted => deleted += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, url = %url, "Failed to delete file");
                }
            }
        }
        deleted
    }
}
