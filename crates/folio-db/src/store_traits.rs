//! Store trait abstractions
//!
//! These traits define the interface the content and cleanup services need from the
//! database of record, allowing for easy mocking and testing without Postgres.

use async_trait::async_trait;
use folio_core::error::AppError;
use folio_core::models::{
    CreateTagRequest, Profile, ProfileInput, Tag, UpdateTagRequest, Work, WorkInput,
};
use uuid::Uuid;

use crate::db::{ProfileRepository, TagRepository, WorkRepository};

/// Work persistence and reference queries
#[async_trait]
pub trait WorkStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Work>, AppError>;

    async fn list_visible(&self) -> Result<Vec<Work>, AppError>;

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Work>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Work>, AppError>;

    async fn create(&self, input: &WorkInput) -> Result<Work, AppError>;

    async fn update(&self, id: Uuid, input: &WorkInput) -> Result<Option<Work>, AppError>;

    /// Delete a work, returning the row as it was
    async fn delete(&self, id: Uuid) -> Result<Option<Work>, AppError>;

    /// Every image URL referenced by any work
    async fn all_image_urls(&self) -> Result<Vec<String>, AppError>;

    /// Number of works whose image list contains `url`
    async fn count_with_image(&self, url: &str) -> Result<i64, AppError>;

    async fn count_with_tag(&self, tag: &str) -> Result<i64, AppError>;

    async fn distinct_tags(&self) -> Result<Vec<String>, AppError>;
}

/// Profile singleton persistence and reference queries
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self) -> Result<Option<Profile>, AppError>;

    async fn create(&self, input: &ProfileInput) -> Result<Profile, AppError>;

    async fn update(&self, id: Uuid, input: &ProfileInput) -> Result<Option<Profile>, AppError>;

    async fn photo_urls(&self) -> Result<Vec<String>, AppError>;

    async fn count_with_photo(&self, url: &str) -> Result<i64, AppError>;
}

/// Tag persistence
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Tag>, AppError>;

    async fn list_menu(&self) -> Result<Vec<Tag>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Tag>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError>;

    async fn create(&self, request: &CreateTagRequest) -> Result<Tag, AppError>;

    async fn update(&self, id: Uuid, request: &UpdateTagRequest)
        -> Result<Option<Tag>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl WorkStore for WorkRepository {
    async fn list_all(&self) -> Result<Vec<Work>, AppError> {
        WorkRepository::list_all(self).await
    }

    async fn list_visible(&self) -> Result<Vec<Work>, AppError> {
        WorkRepository::list_visible(self).await
    }

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Work>, AppError> {
        WorkRepository::list_by_tag(self, tag).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        WorkRepository::get(self, id).await
    }

    async fn create(&self, input: &WorkInput) -> Result<Work, AppError> {
        WorkRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: &WorkInput) -> Result<Option<Work>, AppError> {
        WorkRepository::update(self, id, input).await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        WorkRepository::delete(self, id).await
    }

    async fn all_image_urls(&self) -> Result<Vec<String>, AppError> {
        WorkRepository::all_image_urls(self).await
    }

    async fn count_with_image(&self, url: &str) -> Result<i64, AppError> {
        WorkRepository::count_with_image(self, url).await
    }

    async fn count_with_tag(&self, tag: &str) -> Result<i64, AppError> {
        WorkRepository::count_with_tag(self, tag).await
    }

    async fn distinct_tags(&self) -> Result<Vec<String>, AppError> {
        WorkRepository::distinct_tags(self).await
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn get(&self) -> Result<Option<Profile>, AppError> {
        ProfileRepository::get(self).await
    }

    async fn create(&self, input: &ProfileInput) -> Result<Profile, AppError> {
        ProfileRepository::create(self, input).await
    }

    async fn update(&self, id: Uuid, input: &ProfileInput) -> Result<Option<Profile>, AppError> {
        ProfileRepository::update(self, id, input).await
    }

    async fn photo_urls(&self) -> Result<Vec<String>, AppError> {
        ProfileRepository::photo_urls(self).await
    }

    async fn count_with_photo(&self, url: &str) -> Result<i64, AppError> {
        ProfileRepository::count_with_photo(self, url).await
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn list_all(&self) -> Result<Vec<Tag>, AppError> {
        TagRepository::list_all(self).await
    }

    async fn list_menu(&self) -> Result<Vec<Tag>, AppError> {
        TagRepository::list_menu(self).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tag>, AppError> {
        TagRepository::get(self, id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        TagRepository::find_by_name(self, name).await
    }

    async fn create(&self, request: &CreateTagRequest) -> Result<Tag, AppError> {
        TagRepository::create(self, request).await
    }

    async fn update(
        &self,
        id: Uuid,
        request: &UpdateTagRequest,
    ) -> Result<Option<Tag>, AppError> {
        TagRepository::update(self, id, request).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        TagRepository::delete(self, id).await
    }
}
