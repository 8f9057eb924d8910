//! Record fixtures

use chrono::Utc;
use folio_core::models::{Profile, Work, WorkKind};
use uuid::Uuid;

/// An image work tagged `design` referencing `images`
pub fn work_fixture(name: &str, images: &[&str]) -> Work {
    let now = Utc::now();
    Work {
        id: Uuid::new_v4(),
        name: name.to_string(),
        text: None,
        text_en: None,
        images: images.iter().map(|s| s.to_string()).collect(),
        tags: vec!["design".to_string()],
        kind: WorkKind::Imagem,
        youtube_url: None,
        favorite: false,
        front_page_hide: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn profile_fixture(photo_url: Option<&str>) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        name: "Iuri".to_string(),
        text: "Designer".to_string(),
        text_en: None,
        photo_url: photo_url.map(str::to_string),
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
    }
}
