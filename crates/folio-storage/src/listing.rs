//! Recursive bucket listing

use crate::traits::{Storage, StorageObject, StorageResult};

/// Page size for single-level listings
pub const LIST_PAGE_SIZE: usize = 1000;

/// Marker object Supabase writes to keep an otherwise empty folder visible
pub const EMPTY_FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

/// Walk the whole bucket depth-first and return every file with its full path.
///
/// Folders are any entries without size metadata; each level is paged until a
/// short page is returned. Folder placeholders are not reported as files.
/// Any listing error aborts the walk.
pub async fn list_all_objects(storage: &dyn Storage) -> StorageResult<Vec<StorageObject>> {
    let mut objects = Vec::new();
    let mut pending = vec![String::new()];

    while let Some(prefix) = pending.pop() {
        let mut offset = 0;
        loop {
            let page = storage.list(&prefix, LIST_PAGE_SIZE, offset).await?;
            let page_len = page.len();

            for entry in page {
                let full_path = if prefix.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", prefix, entry.name)
                };

                match entry.size {
                    Some(_) if entry.name == EMPTY_FOLDER_PLACEHOLDER => {}
                    Some(size_bytes) => objects.push(StorageObject {
                        path: full_path,
                        created_at: entry.created_at,
                        size_bytes,
                    }),
                    None => pending.push(full_path),
                }
            }

            if page_len < LIST_PAGE_SIZE {
                break;
            }
            offset += page_len;
        }
    }

    tracing::debug!(
        bucket = %storage.bucket(),
        object_count = objects.len(),
        "Bucket listing complete"
    );

    Ok(objects)
}
