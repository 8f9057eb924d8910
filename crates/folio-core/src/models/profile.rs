use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{blank_to_none, PHONE_REGEX};

/// The site owner's profile and theme settings (singleton row)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub text_en: Option<String>,
    /// Public URL of the biography photo; a live reference when set.
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub behance: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub color_header: Option<String>,
    pub color_background_index: Option<String>,
    pub color_background_works: Option<String>,
    pub font: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating or updating the profile
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub text: String,
    #[serde(default)]
    pub text_en: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(regex(path = *PHONE_REGEX, message = "Phone must use the format (XX) XXXXX-XXXX"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Invalid URL"))]
    pub behance: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Invalid URL"))]
    pub linkedin: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Invalid URL"))]
    pub facebook: Option<String>,
    #[serde(default)]
    #[validate(url(message = "Invalid URL"))]
    pub instagram: Option<String>,
    #[serde(default)]
    pub color_header: Option<String>,
    #[serde(default)]
    pub color_background_index: Option<String>,
    #[serde(default)]
    pub color_background_works: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
}

impl ProfileInput {
    pub fn normalized(self) -> Self {
        ProfileInput {
            name: self.name.trim().to_string(),
            text: self.text.trim().to_string(),
            text_en: blank_to_none(self.text_en),
            photo_url: blank_to_none(self.photo_url),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            behance: blank_to_none(self.behance),
            linkedin: blank_to_none(self.linkedin),
            facebook: blank_to_none(self.facebook),
            instagram: blank_to_none(self.instagram),
            color_header: blank_to_none(self.color_header),
            color_background_index: blank_to_none(self.color_background_index),
            color_background_works: blank_to_none(self.color_background_works),
            font: blank_to_none(self.font),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProfileInput {
        ProfileInput {
            name: "Iuri".to_string(),
            text: "Designer".to_string(),
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
        }
    }

    #[test]
    fn test_minimal_profile_is_valid() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_blank_links_are_accepted() {
        let mut p = input();
        p.behance = Some(String::new());
        p.email = Some(" ".to_string());
        assert!(p.normalized().validate().is_ok());
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut p = input();
        p.phone = Some("12345".to_string());
        assert!(p.validate().is_err());

        let mut p = input();
        p.email = Some("not-an-email".to_string());
        assert!(p.validate().is_err());

        let mut p = input();
        p.text = String::new();
        assert!(p.validate().is_err());
    }
}
