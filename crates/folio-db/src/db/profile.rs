use folio_core::{
    models::{Profile, ProfileInput},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, name, text, text_en, photo_url, email, phone, behance, linkedin, \
     facebook, instagram, color_header, color_background_index, color_background_works, font, \
     created_at, updated_at";

/// Repository for the profile singleton
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The profile row, if one was ever saved
    #[tracing::instrument(skip(self), fields(db.table = "profile", db.operation = "select"))]
    pub async fn get(&self) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            "SELECT {} FROM profile ORDER BY created_at ASC LIMIT 1",
            PROFILE_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "profile", db.operation = "insert"))]
    pub async fn create(&self, input: &ProfileInput) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            r#"
            INSERT INTO profile (name, text, text_en, photo_url, email, phone, behance, linkedin,
                                 facebook, instagram, color_header, color_background_index,
                                 color_background_works, font)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.text_en)
        .bind(&input.photo_url)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.behance)
        .bind(&input.linkedin)
        .bind(&input.facebook)
        .bind(&input.instagram)
        .bind(&input.color_header)
        .bind(&input.color_background_index)
        .bind(&input.color_background_works)
        .bind(&input.font)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "profile", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, input: &ProfileInput) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            r#"
            UPDATE profile
            SET name = $2, text = $3, text_en = $4, photo_url = $5, email = $6, phone = $7,
                behance = $8, linkedin = $9, facebook = $10, instagram = $11, color_header = $12,
                color_background_index = $13, color_background_works = $14, font = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.text_en)
        .bind(&input.photo_url)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.behance)
        .bind(&input.linkedin)
        .bind(&input.facebook)
        .bind(&input.instagram)
        .bind(&input.color_header)
        .bind(&input.color_background_index)
        .bind(&input.color_background_works)
        .bind(&input.font)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Photo URLs of every profile row that has one
    #[tracing::instrument(skip(self), fields(db.table = "profile", db.operation = "select"))]
    pub async fn photo_urls(&self) -> Result<Vec<String>, AppError> {
        let urls = sqlx::query_scalar::<Postgres, String>(
            "SELECT photo_url FROM profile WHERE photo_url IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(urls)
    }

    #[tracing::instrument(skip(self), fields(db.table = "profile", db.operation = "select"))]
    pub async fn count_with_photo(&self, url: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM profile WHERE photo_url = $1")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
