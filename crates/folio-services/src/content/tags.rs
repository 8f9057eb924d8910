use std::sync::Arc;

use folio_core::models::{CreateTagRequest, Tag, TagUsage, UpdateTagRequest};
use folio_core::AppError;
use folio_db::{TagStore, WorkStore};
use uuid::Uuid;
use validator::Validate;

use crate::cache::TagCache;

/// Tag administration and the cached menu of tag names
#[derive(Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
    works: Arc<dyn WorkStore>,
    cache: Arc<dyn TagCache>,
}

impl TagService {
    pub fn new(
        tags: Arc<dyn TagStore>,
        works: Arc<dyn WorkStore>,
        cache: Arc<dyn TagCache>,
    ) -> Self {
        Self { tags, works, cache }
    }

    /// Every tag, ordered by name
    pub async fn list_all(&self) -> Result<Vec<Tag>, AppError> {
        self.tags.list_all().await
    }

    /// Active tags flagged for the menu
    pub async fn list_menu(&self) -> Result<Vec<Tag>, AppError> {
        self.tags.list_menu().await
    }

    #[tracing::instrument(skip(self, request), fields(tag.name = %request.name))]
    pub async fn create(&self, mut request: CreateTagRequest) -> Result<Tag, AppError> {
        request.name = request.name.trim().to_string();
        request.validate()?;

        if self.tags.find_by_name(&request.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Tag '{}' already exists",
                request.name
            )));
        }

        let tag = self.tags.create(&request).await?;
        self.cache.clear().await;
        tracing::info!(tag_id = %tag.id, "Tag created");
        Ok(tag)
    }

    #[tracing::instrument(skip(self, request), fields(tag.id = %id))]
    pub async fn update(&self, id: Uuid, mut request: UpdateTagRequest) -> Result<Tag, AppError> {
        request.name = request.name.map(|n| n.trim().to_string());
        request.validate()?;

        if let Some(name) = request.name.as_deref() {
            if let Some(other) = self.tags.find_by_name(name).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Another tag is already named '{}'",
                        name
                    )));
                }
            }
        }

        let tag = self
            .tags
            .update(id, &request)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;
        self.cache.clear().await;
        Ok(tag)
    }

    /// Delete a tag no work uses.
    #[tracing::instrument(skip(self), fields(tag.id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let tag = self
            .tags
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        let in_use = self.works.count_with_tag(&tag.name).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Tag '{}' is used by {} work(s)",
                tag.name, in_use
            )));
        }

        if !self.tags.delete(id).await? {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }
        self.cache.clear().await;
        tracing::info!(tag.name = %tag.name, "Tag deleted");
        Ok(())
    }

    pub async fn usage(&self, name: &str) -> Result<TagUsage, AppError> {
        let works_count = self.works.count_with_tag(name).await?;
        Ok(TagUsage {
            tag_name: name.to_string(),
            works_count,
        })
    }

    /// Tag names for the gallery menu.
    ///
    /// Served from the cache when fresh, otherwise from the tags table, falling
    /// back to the tags found on works. Lookup failures yield an empty list.
    pub async fn tag_names(&self) -> Vec<String> {
        if let Some(cached) = self.cache.get().await {
            return cached;
        }

        match self.tags.list_menu().await {
            Ok(tags) if !tags.is_empty() => {
                let names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
                self.cache.set(names.clone()).await;
                return names;
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Failed to load menu tags"),
        }

        match self.works.distinct_tags().await {
            Ok(names) if !names.is_empty() => {
                self.cache.set(names.clone()).await;
                names
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load tags from works");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{work_fixture, TestContext};

    fn create(name: &str) -> CreateTagRequest {
        CreateTagRequest {
            name: name.to_string(),
            description: None,
            is_active: true,
            show_in_menu: true,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let ctx = TestContext::new();
        let service = ctx.tag_service();

        service.create(create(" design ")).await.unwrap();
        let err = service.create(create("design")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_rename_collision_and_self_rename() {
        let ctx = TestContext::new();
        let service = ctx.tag_service();
        let design = service.create(create("design")).await.unwrap();
        service.create(create("motion")).await.unwrap();

        let collide = UpdateTagRequest {
            name: Some("motion".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(design.id, collide).await,
            Err(AppError::Conflict(_))
        ));

        let same = UpdateTagRequest {
            name: Some("design".to_string()),
            show_in_menu: Some(false),
            ..Default::default()
        };
        let updated = service.update(design.id, same).await.unwrap();
        assert!(!updated.show_in_menu);

        assert!(matches!(
            service
                .update(Uuid::new_v4(), UpdateTagRequest::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_while_in_use() {
        let ctx = TestContext::new();
        let service = ctx.tag_service();
        let tag = service.create(create("design")).await.unwrap();
        let mut work = work_fixture("poster", &[]);
        work.tags = vec!["design".to_string()];
        ctx.works.insert(work);

        assert!(matches!(service.delete(tag.id).await, Err(AppError::Conflict(_))));
        assert_eq!(service.usage("design").await.unwrap().works_count, 1);
        assert!(matches!(
            service.delete(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unused_tag() {
        let ctx = TestContext::new();
        let service = ctx.tag_service();
        let tag = service.create(create("design")).await.unwrap();

        service.delete(tag.id).await.unwrap();
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tag_names_cached_until_mutation() {
        let ctx = TestContext::new();
        let service = ctx.tag_service();
        service.create(create("design")).await.unwrap();

        assert_eq!(service.tag_names().await, vec!["design".to_string()]);
        assert_eq!(ctx.cache.get().await, Some(vec!["design".to_string()]));

        service.create(create("motion")).await.unwrap();
        assert_eq!(ctx.cache.get().await, None);
        assert_eq!(
            service.tag_names().await,
            vec!["design".to_string(), "motion".to_string()]
        );
    }

    #[tokio::test]
    async fn test_tag_names_fall_back_to_work_tags() {
        let ctx = TestContext::new();
        let mut work = work_fixture("poster", &[]);
        work.tags = vec!["zine".to_string(), "arte".to_string()];
        ctx.works.insert(work);

        assert_eq!(
            ctx.tag_service().tag_names().await,
            vec!["arte".to_string(), "zine".to_string()]
        );
    }

    #[tokio::test]
    async fn test_tag_names_empty_on_failure() {
        let ctx = TestContext::new();
        ctx.tags.set_failing(true);
        ctx.works.set_failing(true);

        assert!(ctx.tag_service().tag_names().await.is_empty());
    }
}
