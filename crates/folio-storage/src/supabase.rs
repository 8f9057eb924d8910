use crate::keys::{public_url, validate_path};
use crate::traits::{
    ListEntry, RemoveFailure, RemoveOutcome, Storage, StorageError, StorageObject, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

const CACHE_CONTROL_SECS: u32 = 3600;

/// Supabase Storage backend speaking the Storage REST API with the service-role key
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ObjectInfo {
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RemovedItem {
    name: String,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn metadata_size(metadata: Option<&Value>) -> Option<u64> {
    metadata.and_then(|m| m.get("size")).and_then(Value::as_u64)
}

impl SupabaseStorage {
    /// Create a new SupabaseStorage instance
    ///
    /// # Arguments
    /// * `base_url` - Project URL (e.g., "https://abcd.supabase.co")
    /// * `service_key` - Service-role key; bypasses row-level policies on the bucket
    /// * `bucket` - Public bucket holding the uploads
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(SupabaseStorage {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        })
    }

    fn object_endpoint(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encoded.join("/")
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }
}

#[async_trait]
impl Storage for SupabaseStorage {
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        validate_path(path)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let response = self
            .authorized(self.client.post(self.object_endpoint(path)))
            .header("content-type", content_type)
            .header("cache-control", format!("max-age={}", CACHE_CONTROL_SECS))
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::CONFLICT || body.contains("Duplicate") {
                return Err(StorageError::AlreadyExists(path.to_string()));
            }
            return Err(StorageError::UploadFailed(format!("{}: {}", status, body)));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Supabase storage upload successful"
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
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let body = json!({
            "prefix": prefix.trim_matches('/'),
            "limit": limit,
            "offset": offset,
            "sortBy": { "column": "name", "order": "asc" },
        });

        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ListFailed(format!("{}: {}", status, body)));
        }

        let items: Vec<ListItem> = response
            .json()
            .await
            .map_err(|e| StorageError::ListFailed(format!("Invalid listing response: {}", e)))?;

        Ok(items
            .into_iter()
            .map(|item| ListEntry {
                size: metadata_size(item.metadata.as_ref()),
                created_at: parse_timestamp(item.created_at.as_deref()),
                name: item.name,
            })
            .collect())
    }

    async fn stat(&self, path: &str) -> StorageResult<Option<StorageObject>> {
        validate_path(path)?;
        let url = self
            .object_endpoint(path)
            .replacen("/storage/v1/object/", "/storage/v1/object/info/", 1);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            // The API answers 400 "Object not found" for missing objects.
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::BackendError(format!("{}: {}", status, body)));
        }

        let info: ObjectInfo = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(format!("Invalid info response: {}", e)))?;

        Ok(Some(StorageObject {
            path: path.to_string(),
            created_at: parse_timestamp(info.created_at.as_deref()),
            size_bytes: info
                .size
                .or_else(|| metadata_size(info.metadata.as_ref()))
                .unwrap_or(0),
        }))
    }

    async fn remove(&self, paths: &[String]) -> StorageResult<RemoveOutcome> {
        if paths.is_empty() {
            return Ok(RemoveOutcome::default());
        }

        let mut outcome = RemoveOutcome::default();
        let mut valid = Vec::with_capacity(paths.len());
        for path in paths {
            match validate_path(path) {
                Ok(()) => valid.push(path.clone()),
                Err(e) => outcome.failed.push(RemoveFailure {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            }
        }
        if valid.is_empty() {
            return Ok(outcome);
        }

        let start = std::time::Instant::now();
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);

        let response = self
            .authorized(self.client.delete(url))
            .json(&json!({ "prefixes": valid }))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::DeleteFailed(format!("{}: {}", status, body)));
        }

        let removed: Vec<RemovedItem> = response
            .json()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("Invalid delete response: {}", e)))?;
        outcome.removed = removed.into_iter().map(|item| item.name).collect();

        tracing::info!(
            bucket = %self.bucket,
            requested = paths.len(),
            removed = outcome.removed.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Supabase storage remove finished"
        );

        Ok(outcome)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Supabase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_item_folder_detection() {
        let items: Vec<ListItem> = serde_json::from_str(
            r#"[
                {"name": "trabalhos", "id": null, "created_at": null, "metadata": null},
                {"name": "a.png", "id": "1", "created_at": "2024-05-01T12:00:00.000Z",
                 "metadata": {"size": 2048, "mimetype": "image/png"}},
                {"name": "empty.png", "id": "2", "created_at": "2024-05-01T12:00:00Z",
                 "metadata": {"size": 0}}
            ]"#,
        )
        .unwrap();

        assert_eq!(metadata_size(items[0].metadata.as_ref()), None);
        assert_eq!(metadata_size(items[1].metadata.as_ref()), Some(2048));
        assert_eq!(metadata_size(items[2].metadata.as_ref()), Some(0));
        assert!(parse_timestamp(items[1].created_at.as_deref()).is_some());
        assert!(parse_timestamp(items[0].created_at.as_deref()).is_none());
    }

    #[test]
    fn test_object_endpoint_encodes_segments() {
        let storage =
            SupabaseStorage::new("https://proj.supabase.co/", "key", "portfolio-iuri").unwrap();
        assert_eq!(
            storage.object_endpoint("bio/foto perfil.jpg"),
            "https://proj.supabase.co/storage/v1/object/portfolio-iuri/bio/foto%20perfil.jpg"
        );
        assert_eq!(storage.backend_type(), StorageBackend::Supabase);
    }
}
