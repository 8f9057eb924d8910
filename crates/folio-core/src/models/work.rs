use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{blank_to_none, normalize_tags};

/// How a work is presented in the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "work_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    Imagem,
    Gif,
    Youtube,
}

/// A portfolio work. `images` holds public URLs of objects in the bucket; every
/// entry is a live reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: Uuid,
    pub name: String,
    pub text: Option<String>,
    pub text_en: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub kind: WorkKind,
    pub youtube_url: Option<String>,
    pub favorite: bool,
    pub front_page_hide: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Work {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Request DTO for creating or replacing a work
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_work_media"))]
pub struct WorkInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_en: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(length(min = 1, message = "At least one tag is required"))]
    pub tags: Vec<String>,
    pub kind: WorkKind,
    #[serde(default)]
    #[validate(url(message = "Invalid YouTube URL"))]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub front_page_hide: bool,
}

impl WorkInput {
    /// Trim text, drop blank optionals, and de-duplicate tags.
    pub fn normalized(self) -> Self {
        WorkInput {
            name: self.name.trim().to_string(),
            text: blank_to_none(self.text),
            text_en: blank_to_none(self.text_en),
            images: self.images,
            tags: normalize_tags(self.tags),
            kind: self.kind,
            youtube_url: blank_to_none(self.youtube_url),
            favorite: self.favorite,
            front_page_hide: self.front_page_hide,
        }
    }
}

fn validate_work_media(input: &WorkInput) -> Result<(), validator::ValidationError> {
    let complete = match input.kind {
        WorkKind::Youtube => input.youtube_url.is_some() && !input.images.is_empty(),
        WorkKind::Imagem | WorkKind::Gif => !input.images.is_empty(),
    };
    if complete {
        Ok(())
    } else {
        Err(validator::ValidationError::new("incomplete_media").with_message(Cow::from(
            "Incomplete data for the selected kind: images are required, and YouTube works also need a URL",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(kind: WorkKind, images: &[&str], youtube_url: Option<&str>) -> WorkInput {
        WorkInput {
            name: "Poster".to_string(),
            text: None,
            text_en: None,
            images: images.iter().map(|s| s.to_string()).collect(),
            tags: vec!["design".to_string()],
            kind,
            youtube_url: youtube_url.map(str::to_string),
            favorite: false,
            front_page_hide: false,
        }
    }

    #[test]
    fn test_image_work_needs_images() {
        assert!(input(WorkKind::Imagem, &[], None).validate().is_err());
        assert!(input(WorkKind::Gif, &["https://x/a.gif"], None)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_youtube_work_needs_url_and_thumbnail() {
        assert!(input(WorkKind::Youtube, &["https://x/t.png"], None)
            .validate()
            .is_err());
        assert!(
            input(WorkKind::Youtube, &[], Some("https://youtube.com/watch?v=1"))
                .validate()
                .is_err()
        );
        assert!(input(
            WorkKind::Youtube,
            &["https://x/t.png"],
            Some("https://youtube.com/watch?v=1")
        )
        .validate()
        .is_ok());
    }

    #[test]
    fn test_tags_and_name_rules() {
        let mut missing_tags = input(WorkKind::Imagem, &["https://x/a.png"], None);
        missing_tags.tags = vec!["  ".to_string()];
        assert!(missing_tags.normalized().validate().is_err());

        let mut long_name = input(WorkKind::Imagem, &["https://x/a.png"], None);
        long_name.name = "a".repeat(101);
        assert!(long_name.validate().is_err());
    }

    #[test]
    fn test_blank_youtube_url_is_absent() {
        let work = input(WorkKind::Imagem, &["https://x/a.png"], Some("  ")).normalized();
        assert!(work.youtube_url.is_none());
        assert!(work.validate().is_ok());
    }

    #[test]
    fn test_kind_serde() {
        let kind: WorkKind = serde_json::from_str("\"youtube\"").unwrap();
        assert_eq!(kind, WorkKind::Youtube);
        assert_eq!(serde_json::to_string(&WorkKind::Imagem).unwrap(), "\"imagem\"");
    }
}
