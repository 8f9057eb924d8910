use std::sync::Arc;

use folio_core::models::{Profile, ProfileInput};
use folio_core::AppError;
use folio_db::ProfileStore;
use validator::Validate;

use crate::cleanup::{CleanupScheduler, SafeDeleter, SweepReason};

/// The site owner's profile (a single row)
#[derive(Clone)]
pub struct ProfileService {
    profile: Arc<dyn ProfileStore>,
    deleter: SafeDeleter,
    scheduler: CleanupScheduler,
}

impl ProfileService {
    pub fn new(
        profile: Arc<dyn ProfileStore>,
        deleter: SafeDeleter,
        scheduler: CleanupScheduler,
    ) -> Self {
        Self {
            profile,
            deleter,
            scheduler,
        }
    }

    pub async fn get(&self) -> Result<Profile, AppError> {
        self.profile
            .get()
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not configured".to_string()))
    }

    /// Create the profile or update the existing one.
    ///
    /// A photo replaced or cleared by this write is deleted after the save.
    #[tracing::instrument(skip(self, input))]
    pub async fn upsert(&self, input: ProfileInput) -> Result<Profile, AppError> {
        let input = input.normalized();
        input.validate()?;

        let saved = match self.profile.get().await? {
            None => {
                let created = self.profile.create(&input).await?;
                tracing::info!(profile_id = %created.id, "Profile created");
                created
            }
            Some(existing) => {
                let updated = self
                    .profile
                    .update(existing.id, &input)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Profile not configured".to_string()))?;

                if let Some(old_photo) = existing.photo_url {
                    if updated.photo_url.as_deref() != Some(old_photo.as_str()) {
                        match self.deleter.safe_delete(&old_photo).await {
                            Ok(outcome) => {
                                tracing::info!(deleted = outcome.deleted, "Replaced profile photo")
                            }
                            Err(e) => {
                                tracing::error!(error = %e, url = %old_photo, "Failed to delete replaced profile photo")
                            }
                        }
                    }
                }
                updated
            }
        };

        self.scheduler.trigger(SweepReason::AfterEdit);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestContext;
    use folio_storage::Storage;

    fn input(photo_url: Option<String>) -> ProfileInput {
        ProfileInput {
            name: "Iuri".to_string(),
            text: "Designer".to_string(),
            text_en: None,
            photo_url,
            email: Some("iuri@example.com".to_string()),
            phone: Some("(11) 98765-4321".to_string()),
            behance: None,
            linkedin: Some("  ".to_string()),
            facebook: None,
            instagram: None,
            color_header: None,
            color_background_index: None,
            color_background_works: None,
            font: None,
        }
    }

    #[tokio::test]
    async fn test_get_before_create_is_not_found() {
        let ctx = TestContext::new();
        assert!(matches!(
            ctx.profile_service().get().await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let ctx = TestContext::new();
        let service = ctx.profile_service();

        let created = service.upsert(input(None)).await.unwrap();
        assert_eq!(created.linkedin, None);

        let mut changed = input(None);
        changed.name = "Iuri S.".to_string();
        let updated = service.upsert(changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(service.get().await.unwrap().name, "Iuri S.");
    }

    #[tokio::test]
    async fn test_replaced_photo_is_deleted() {
        let ctx = TestContext::new();
        ctx.storage.insert_object("bio/old.png", None);
        ctx.storage.insert_object("bio/new.png", None);
        let old = ctx.storage.public_url("bio/old.png");
        let new = ctx.storage.public_url("bio/new.png");
        let service = ctx.profile_service();

        service.upsert(input(Some(old))).await.unwrap();
        service.upsert(input(Some(new))).await.unwrap();

        assert!(!ctx.storage.has_object("bio/old.png"));
        assert!(ctx.storage.has_object("bio/new.png"));
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected() {
        let ctx = TestContext::new();
        let mut bad = input(None);
        bad.phone = Some("11987654321".to_string());

        let err = ctx.profile_service().upsert(bad).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
