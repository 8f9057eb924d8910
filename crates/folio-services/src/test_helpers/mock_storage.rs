//! In-memory object store

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_storage::{
    public_url, ListEntry, RemoveFailure, RemoveOutcome, Storage, StorageBackend, StorageError,
    StorageObject, StorageResult,
};

pub const MOCK_BASE_URL: &str = "https://mock.supabase.co";
pub const MOCK_BUCKET: &str = "portfolio-iuri";

#[derive(Clone)]
struct MockObject {
    data: Vec<u8>,
    created_at: Option<DateTime<Utc>>,
    /// Whether listings carry `created_at`; `stat` always does.
    timestamp_in_listing: bool,
}

/// Mock storage backed by a flat map of paths.
///
/// Listings are single-level like the real backends: keys with further `/`
/// segments below the prefix show up as folders without size metadata.
#[derive(Clone, Default)]
pub struct MockStorage {
    objects: Arc<Mutex<BTreeMap<String, MockObject>>>,
    failing_payloads: Arc<Mutex<Vec<Vec<u8>>>>,
    failing_removals: Arc<Mutex<HashSet<String>>>,
    listing_fails: Arc<AtomicBool>,
    remove_calls: Arc<AtomicUsize>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an object in the bucket directly
    pub fn insert_object(&self, path: &str, created_at: Option<DateTime<Utc>>) {
        self.put(path, created_at, true);
    }

    /// Put an object whose listing entry lacks a timestamp
    pub fn insert_object_unlisted_timestamp(&self, path: &str, created_at: Option<DateTime<Utc>>) {
        self.put(path, created_at, false);
    }

    fn put(&self, path: &str, created_at: Option<DateTime<Utc>>, timestamp_in_listing: bool) {
        self.objects.lock().unwrap().insert(
            path.to_string(),
            MockObject {
                data: b"mock".to_vec(),
                created_at,
                timestamp_in_listing,
            },
        );
    }

    pub fn has_object(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Make uploads whose body equals `payload` fail
    pub fn fail_uploads_of(&self, payload: &[u8]) {
        self.failing_payloads.lock().unwrap().push(payload.to_vec());
    }

    /// Make removal of `path` fail per-object
    pub fn fail_removal_of(&self, path: &str) {
        self.failing_removals.lock().unwrap().insert(path.to_string());
    }

    pub fn set_listing_fails(&self, fails: bool) {
        self.listing_fails.store(fails, Ordering::SeqCst);
    }

    /// Number of `remove` calls made so far
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload(&self, path: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        if self.failing_payloads.lock().unwrap().contains(&data) {
            return Err(StorageError::UploadFailed(format!("mock failure for {}", path)));
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            MockObject {
                data,
                created_at: Some(Utc::now()),
                timestamp_in_listing: true,
            },
        );
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        public_url(MOCK_BASE_URL, MOCK_BUCKET, path)
    }

    async fn list(&self, prefix: &str, limit: usize, offset: usize) -> StorageResult<Vec<ListEntry>> {
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(StorageError::ListFailed("mock listing failure".to_string()));
        }

        let objects = self.objects.lock().unwrap();
        let mut folders = BTreeSet::new();
        let mut entries = Vec::new();

        for (path, object) in objects.iter() {
            let rest = if prefix.is_empty() {
                path.as_str()
            } else {
                match path
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('/'))
                {
                    Some(rest) => rest,
                    None => continue,
                }
            };

            match rest.split_once('/') {
                Some((folder, _)) => {
                    folders.insert(folder.to_string());
                }
                None => entries.push(ListEntry {
                    name: rest.to_string(),
                    created_at: object.created_at.filter(|_| object.timestamp_in_listing),
                    size: Some(object.data.len() as u64),
                }),
            }
        }

        entries.extend(folders.into_iter().map(|name| ListEntry {
            name,
            created_at: None,
            size: None,
        }));
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }

    async fn stat(&self, path: &str) -> StorageResult<Option<StorageObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(path)
            .map(|object| StorageObject {
                path: path.to_string(),
                created_at: object.created_at,
                size_bytes: object.data.len() as u64,
            }))
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<RemoveOutcome> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_removals.lock().unwrap().clone();
        let mut objects = self.objects.lock().unwrap();
        let mut outcome = RemoveOutcome::default();

        for path in paths {
            if failing.contains(path) {
                outcome.failed.push(RemoveFailure {
                    path: path.clone(),
                    reason: "mock removal failure".to_string(),
                });
            } else if objects.remove(path).is_some() {
                outcome.removed.push(path.clone());
            }
        }
        Ok(outcome)
    }

    fn bucket(&self) -> &str {
        MOCK_BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Supabase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_storage::list_all_objects;

    #[tokio::test]
    async fn test_listing_is_single_level() {
        let storage = MockStorage::new();
        storage.insert_object("root.png", None);
        storage.insert_object("trabalhos/a.png", None);
        storage.insert_object("trabalhos/2024/b.png", None);

        let root = storage.list("", 100, 0).await.unwrap();
        let names: Vec<(&str, bool)> = root.iter().map(|e| (e.name.as_str(), e.is_file())).collect();
        assert_eq!(names, vec![("root.png", true), ("trabalhos", false)]);

        let all = list_all_objects(&storage).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
