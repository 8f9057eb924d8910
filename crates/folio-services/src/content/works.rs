use std::sync::Arc;

use folio_core::models::{Work, WorkInput};
use folio_core::AppError;
use folio_db::WorkStore;
use rand::seq::SliceRandom;
use uuid::Uuid;
use validator::Validate;

use crate::cleanup::{CleanupScheduler, SafeDeleter, SweepReason};

/// Gallery order: favourites first, each group in random order.
pub fn split_gallery(works: Vec<Work>) -> Vec<Work> {
    let (mut favorites, mut others): (Vec<Work>, Vec<Work>) =
        works.into_iter().partition(|w| w.favorite);

    let mut rng = rand::rng();
    favorites.shuffle(&mut rng);
    others.shuffle(&mut rng);

    favorites.extend(others);
    favorites
}

/// Work CRUD plus file cleanup after writes
#[derive(Clone)]
pub struct WorkService {
    works: Arc<dyn WorkStore>,
    deleter: SafeDeleter,
    scheduler: CleanupScheduler,
}

impl WorkService {
    pub fn new(
        works: Arc<dyn WorkStore>,
        deleter: SafeDeleter,
        scheduler: CleanupScheduler,
    ) -> Self {
        Self {
            works,
            deleter,
            scheduler,
        }
    }

    /// Works shown on the home page
    pub async fn list_gallery(&self) -> Result<Vec<Work>, AppError> {
        let works = self.works.list_visible().await?;
        Ok(split_gallery(works))
    }

    /// Every work, newest first
    pub async fn list_all(&self) -> Result<Vec<Work>, AppError> {
        self.works.list_all().await
    }

    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Work>, AppError> {
        self.works.list_by_tag(tag.trim()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Work, AppError> {
        self.works
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work {} not found", id)))
    }

    pub async fn distinct_tags(&self) -> Result<Vec<String>, AppError> {
        self.works.distinct_tags().await
    }

    #[tracing::instrument(skip(self, input), fields(work.name = %input.name))]
    pub async fn create(&self, input: WorkInput) -> Result<Work, AppError> {
        let input = input.normalized();
        input.validate()?;

        let work = self.works.create(&input).await?;
        tracing::info!(work_id = %work.id, images = work.images.len(), "Work created");

        self.scheduler.trigger(SweepReason::AfterEdit);
        Ok(work)
    }

    /// Replace a work. Images present before and absent after are deleted once
    /// the new record is saved.
    #[tracing::instrument(skip(self, input), fields(work.id = %id))]
    pub async fn update(&self, id: Uuid, input: WorkInput) -> Result<Work, AppError> {
        let input = input.normalized();
        input.validate()?;

        let previous = self.get(id).await?;
        let work = self
            .works
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work {} not found", id)))?;

        let dropped: Vec<String> = previous
            .images
            .into_iter()
            .filter(|url| !work.images.contains(url))
            .collect();
        if !dropped.is_empty() {
            let deleted = self.deleter.safe_delete_all(&dropped).await;
            tracing::info!(dropped = dropped.len(), deleted, "Removed images dropped from work");
        }

        self.scheduler.trigger(SweepReason::AfterEdit);
        Ok(work)
    }

    /// Delete a work and then its images.
    #[tracing::instrument(skip(self), fields(work.id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Work, AppError> {
        let work = self
            .works
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work {} not found", id)))?;

        let deleted = self.deleter.safe_delete_all(&work.images).await;
        tracing::info!(images = work.images.len(), deleted, "Work deleted");

        self.scheduler.trigger(SweepReason::AfterDelete);
        Ok(work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{work_fixture, TestContext};
    use folio_core::models::WorkKind;
    use folio_storage::Storage;

    fn input(images: Vec<String>) -> WorkInput {
        WorkInput {
            name: " Poster ".to_string(),
            text: Some("  ".to_string()),
            text_en: None,
            images,
            tags: vec!["design".to_string(), "design".to_string()],
            kind: WorkKind::Imagem,
            youtube_url: None,
            favorite: false,
            front_page_hide: false,
        }
    }

    #[test]
    fn test_split_gallery_puts_favorites_first() {
        let mut works = Vec::new();
        for i in 0..6 {
            let mut w = work_fixture(&format!("w{}", i), &[]);
            w.favorite = i % 2 == 0;
            works.push(w);
        }

        let ordered = split_gallery(works);

        assert_eq!(ordered.len(), 6);
        assert!(ordered[..3].iter().all(|w| w.favorite));
        assert!(ordered[3..].iter().all(|w| !w.favorite));
    }

    #[tokio::test]
    async fn test_gallery_hides_front_page_hidden_works() {
        let ctx = TestContext::new();
        let mut hidden = work_fixture("hidden", &[]);
        hidden.front_page_hide = true;
        ctx.works.insert(hidden);
        ctx.works.insert(work_fixture("shown", &[]));

        let gallery = ctx.work_service().list_gallery().await.unwrap();

        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].name, "shown");
    }

    #[tokio::test]
    async fn test_create_normalizes_and_validates() {
        let ctx = TestContext::new();
        let service = ctx.work_service();

        let work = service
            .create(input(vec![ctx.storage.public_url("trabalhos/a.png")]))
            .await
            .unwrap();
        assert_eq!(work.name, "Poster");
        assert_eq!(work.text, None);
        assert_eq!(work.tags, vec!["design".to_string()]);

        let err = service.create(input(vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_deletes_dropped_images_only() {
        let ctx = TestContext::new();
        ctx.storage.insert_object("trabalhos/a.png", None);
        ctx.storage.insert_object("trabalhos/b.png", None);
        let a = ctx.storage.public_url("trabalhos/a.png");
        let b = ctx.storage.public_url("trabalhos/b.png");
        let service = ctx.work_service();

        let work = service.create(input(vec![a.clone(), b.clone()])).await.unwrap();
        let updated = service.update(work.id, input(vec![b.clone()])).await.unwrap();

        assert_eq!(updated.images, vec![b]);
        assert!(!ctx.storage.has_object("trabalhos/a.png"));
        assert!(ctx.storage.has_object("trabalhos/b.png"));
    }

    #[tokio::test]
    async fn test_update_keeps_image_shared_with_another_work() {
        let ctx = TestContext::new();
        ctx.storage.insert_object("trabalhos/shared.png", None);
        ctx.storage.insert_object("trabalhos/own.png", None);
        let shared = ctx.storage.public_url("trabalhos/shared.png");
        let own = ctx.storage.public_url("trabalhos/own.png");
        ctx.works.insert(work_fixture("other", &[&shared]));
        let service = ctx.work_service();

        let work = service.create(input(vec![shared.clone(), own.clone()])).await.unwrap();
        service.update(work.id, input(vec![own])).await.unwrap();

        assert!(ctx.storage.has_object("trabalhos/shared.png"));
    }

    #[tokio::test]
    async fn test_delete_removes_images() {
        let ctx = TestContext::new();
        ctx.storage.insert_object("trabalhos/a.png", None);
        let a = ctx.storage.public_url("trabalhos/a.png");
        let service = ctx.work_service();

        let work = service.create(input(vec![a])).await.unwrap();
        service.delete(work.id).await.unwrap();

        assert!(!ctx.storage.has_object("trabalhos/a.png"));
        assert!(matches!(service.get(work.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_work_is_not_found() {
        let ctx = TestContext::new();
        let service = ctx.work_service();
        let id = Uuid::new_v4();

        assert!(matches!(service.delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service
                .update(id, input(vec!["https://x.y/a.png".to_string()]))
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
