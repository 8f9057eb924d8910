//! In-memory database stores

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use folio_core::error::AppError;
use folio_core::models::{
    CreateTagRequest, Profile, ProfileInput, Tag, UpdateTagRequest, Work, WorkInput,
};
use folio_db::{ProfileStore, TagStore, WorkStore};
use uuid::Uuid;

fn check(failing: &AtomicBool, store: &str) -> Result<(), AppError> {
    if failing.load(Ordering::SeqCst) {
        Err(AppError::Internal(format!("{} unavailable", store)))
    } else {
        Ok(())
    }
}

/// Works kept in insertion order; listings return newest first
#[derive(Clone, Default)]
pub struct MockWorkStore {
    works: Arc<Mutex<Vec<Work>>>,
    failing: Arc<AtomicBool>,
}

impl MockWorkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, work: Work) {
        self.works.lock().unwrap().push(work);
    }

    /// Make every call fail with an internal error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current rows, bypassing the failure switch
    pub fn snapshot(&self) -> Vec<Work> {
        self.works.lock().unwrap().clone()
    }

    fn newest_first(&self, keep: impl Fn(&Work) -> bool) -> Vec<Work> {
        self.works
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|w| keep(w))
            .cloned()
            .collect()
    }
}

fn apply_work_input(work: &mut Work, input: &WorkInput) {
    work.name = input.name.clone();
    work.text = input.text.clone();
    work.text_en = input.text_en.clone();
    work.images = input.images.clone();
    work.tags = input.tags.clone();
    work.kind = input.kind;
    work.youtube_url = input.youtube_url.clone();
    work.favorite = input.favorite;
    work.front_page_hide = input.front_page_hide;
    work.updated_at = Utc::now();
}

#[async_trait]
impl WorkStore for MockWorkStore {
    async fn list_all(&self) -> Result<Vec<Work>, AppError> {
        check(&self.failing, "work store")?;
        Ok(self.newest_first(|_| true))
    }

    async fn list_visible(&self) -> Result<Vec<Work>, AppError> {
        check(&self.failing, "work store")?;
        Ok(self.newest_first(|w| !w.front_page_hide))
    }

    async fn list_by_tag(&self, tag: &str) -> Result<Vec<Work>, AppError> {
        check(&self.failing, "work store")?;
        Ok(self.newest_first(|w| w.has_tag(tag)))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        check(&self.failing, "work store")?;
        Ok(self.works.lock().unwrap().iter().find(|w| w.id == id).cloned())
    }

    async fn create(&self, input: &WorkInput) -> Result<Work, AppError> {
        check(&self.failing, "work store")?;
        let now = Utc::now();
        let mut work = Work {
            id: Uuid::new_v4(),
            name: String::new(),
            text: None,
            text_en: None,
            images: Vec::new(),
            tags: Vec::new(),
            kind: input.kind,
            youtube_url: None,
            favorite: false,
            front_page_hide: false,
            created_at: now,
            updated_at: now,
        };
        apply_work_input(&mut work, input);
        self.works.lock().unwrap().push(work.clone());
        Ok(work)
    }

    async fn update(&self, id: Uuid, input: &WorkInput) -> Result<Option<Work>, AppError> {
        check(&self.failing, "work store")?;
        let mut works = self.works.lock().unwrap();
        Ok(works.iter_mut().find(|w| w.id == id).map(|work| {
            apply_work_input(work, input);
            work.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        check(&self.failing, "work store")?;
        let mut works = self.works.lock().unwrap();
        Ok(works
            .iter()
            .position(|w| w.id == id)
            .map(|index| works.remove(index)))
    }

    async fn all_image_urls(&self) -> Result<Vec<String>, AppError> {
        check(&self.failing, "work store")?;
        Ok(self
            .works
            .lock()
            .unwrap()
            .iter()
            .flat_map(|w| w.images.iter().cloned())
            .collect())
    }

    async fn count_with_image(&self, url: &str) -> Result<i64, AppError> {
        check(&self.failing, "work store")?;
        Ok(self
            .works
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.images.iter().any(|i| i == url))
            .count() as i64)
    }

    async fn count_with_tag(&self, tag: &str) -> Result<i64, AppError> {
        check(&self.failing, "work store")?;
        Ok(self
            .works
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.has_tag(tag))
            .count() as i64)
    }

    async fn distinct_tags(&self) -> Result<Vec<String>, AppError> {
        check(&self.failing, "work store")?;
        let mut tags: Vec<String> = self
            .works
            .lock()
            .unwrap()
            .iter()
            .flat_map(|w| w.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }
}

/// The profile singleton
#[derive(Clone, Default)]
pub struct MockProfileStore {
    profile: Arc<Mutex<Option<Profile>>>,
    failing: Arc<AtomicBool>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, profile: Profile) {
        *self.profile.lock().unwrap() = Some(profile);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

fn apply_profile_input(profile: &mut Profile, input: &ProfileInput) {
    profile.name = input.name.clone();
    profile.text = input.text.clone();
    profile.text_en = input.text_en.clone();
    profile.photo_url = input.photo_url.clone();
    profile.email = input.email.clone();
    profile.phone = input.phone.clone();
    profile.behance = input.behance.clone();
    profile.linkedin = input.linkedin.clone();
    profile.facebook = input.facebook.clone();
    profile.instagram = input.instagram.clone();
    profile.color_header = input.color_header.clone();
    profile.color_background_index = input.color_background_index.clone();
    profile.color_background_works = input.color_background_works.clone();
    profile.font = input.font.clone();
    profile.updated_at = Utc::now();
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get(&self) -> Result<Option<Profile>, AppError> {
        check(&self.failing, "profile store")?;
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn create(&self, input: &ProfileInput) -> Result<Profile, AppError> {
        check(&self.failing, "profile store")?;
        let now = Utc::now();
        let mut profile = Profile {
            id: Uuid::new_v4(),
            name: String::new(),
            text: String::new(),
            text_en: None,
            photo_url: None,
            email: None,
            phone: None,
            behance: None,
            linkedin: None,
            facebook: None,
            instagram: None,
            color_header: None,
            color_background_index: None,
            color_background_works: None,
            font: None,
            created_at: now,
            updated_at: now,
        };
        apply_profile_input(&mut profile, input);
        *self.profile.lock().unwrap() = Some(profile.clone());
        Ok(profile)
    }

    async fn update(&self, id: Uuid, input: &ProfileInput) -> Result<Option<Profile>, AppError> {
        check(&self.failing, "profile store")?;
        let mut current = self.profile.lock().unwrap();
        Ok(current.as_mut().filter(|p| p.id == id).map(|profile| {
            apply_profile_input(profile, input);
            profile.clone()
        }))
    }

    async fn photo_urls(&self) -> Result<Vec<String>, AppError> {
        check(&self.failing, "profile store")?;
        Ok(self
            .profile
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|p| p.photo_url.clone())
            .into_iter()
            .collect())
    }

    async fn count_with_photo(&self, url: &str) -> Result<i64, AppError> {
        check(&self.failing, "profile store")?;
        let matches = self
            .profile
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|p| p.photo_url.as_deref() == Some(url));
        Ok(matches as i64)
    }
}

/// Tags ordered by name on read
#[derive(Clone, Default)]
pub struct MockTagStore {
    tags: Arc<Mutex<Vec<Tag>>>,
    failing: Arc<AtomicBool>,
}

impl MockTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn sorted(&self, keep: impl Fn(&Tag) -> bool) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|t| keep(t))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }
}

#[async_trait]
impl TagStore for MockTagStore {
    async fn list_all(&self) -> Result<Vec<Tag>, AppError> {
        check(&self.failing, "tag store")?;
        Ok(self.sorted(|_| true))
    }

    async fn list_menu(&self) -> Result<Vec<Tag>, AppError> {
        check(&self.failing, "tag store")?;
        Ok(self.sorted(|t| t.is_active && t.show_in_menu))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tag>, AppError> {
        check(&self.failing, "tag store")?;
        Ok(self.tags.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        check(&self.failing, "tag store")?;
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create(&self, request: &CreateTagRequest) -> Result<Tag, AppError> {
        check(&self.failing, "tag store")?;
        let mut tags = self.tags.lock().unwrap();
        if tags.iter().any(|t| t.name == request.name) {
            return Err(AppError::Conflict(format!("duplicate tag {}", request.name)));
        }
        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            is_active: request.is_active,
            show_in_menu: request.show_in_menu,
            created_at: now,
            updated_at: now,
        };
        tags.push(tag.clone());
        Ok(tag)
    }

    async fn update(&self, id: Uuid, request: &UpdateTagRequest) -> Result<Option<Tag>, AppError> {
        check(&self.failing, "tag store")?;
        let mut tags = self.tags.lock().unwrap();
        Ok(tags.iter_mut().find(|t| t.id == id).map(|tag| {
            if let Some(name) = &request.name {
                tag.name = name.clone();
            }
            if let Some(description) = &request.description {
                tag.description = Some(description.clone());
            }
            if let Some(is_active) = request.is_active {
                tag.is_active = is_active;
            }
            if let Some(show_in_menu) = request.show_in_menu {
                tag.show_in_menu = show_in_menu;
            }
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        check(&self.failing, "tag store")?;
        let mut tags = self.tags.lock().unwrap();
        let before = tags.len();
        tags.retain(|t| t.id != id);
        Ok(tags.len() < before)
    }
}
