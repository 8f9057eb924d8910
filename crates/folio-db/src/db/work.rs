use folio_core::{
    models::{Work, WorkInput},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const WORK_COLUMNS: &str = "id, name, text, text_en, images, tags, kind, youtube_url, favorite, \
     front_page_hide, created_at, updated_at";

/// Repository for portfolio works
#[derive(Clone)]
pub struct WorkRepository {
    pool: PgPool,
}

impl WorkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All works, newest first
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<Work>, AppError> {
        let works = sqlx::query_as::<Postgres, Work>(&format!(
            "SELECT {} FROM works ORDER BY created_at DESC",
            WORK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(works)
    }

    /// Works shown on the front page (not hidden), newest first
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn list_visible(&self) -> Result<Vec<Work>, AppError> {
        let works = sqlx::query_as::<Postgres, Work>(&format!(
            "SELECT {} FROM works WHERE front_page_hide = FALSE ORDER BY created_at DESC",
            WORK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(works)
    }

    /// Works carrying a tag, newest first
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Work>, AppError> {
        let works = sqlx::query_as::<Postgres, Work>(&format!(
            "SELECT {} FROM works WHERE $1 = ANY(tags) ORDER BY created_at DESC",
            WORK_COLUMNS
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        Ok(works)
    }

    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        let work = sqlx::query_as::<Postgres, Work>(&format!(
            "SELECT {} FROM works WHERE id = $1",
            WORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "works", db.operation = "insert"))]
    pub async fn create(&self, input: &WorkInput) -> Result<Work, AppError> {
        let work = sqlx::query_as::<Postgres, Work>(&format!(
            r#"
            INSERT INTO works (name, text, text_en, images, tags, kind, youtube_url, favorite, front_page_hide)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            WORK_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.text_en)
        .bind(&input.images)
        .bind(&input.tags)
        .bind(input.kind)
        .bind(&input.youtube_url)
        .bind(input.favorite)
        .bind(input.front_page_hide)
        .fetch_one(&self.pool)
        .await?;

        Ok(work)
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "works", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, input: &WorkInput) -> Result<Option<Work>, AppError> {
        let work = sqlx::query_as::<Postgres, Work>(&format!(
            r#"
            UPDATE works
            SET name = $2, text = $3, text_en = $4, images = $5, tags = $6, kind = $7,
                youtube_url = $8, favorite = $9, front_page_hide = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            WORK_COLUMNS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.text)
        .bind(&input.text_en)
        .bind(&input.images)
        .bind(&input.tags)
        .bind(input.kind)
        .bind(&input.youtube_url)
        .bind(input.favorite)
        .bind(input.front_page_hide)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work)
    }

    /// Delete a work and return the deleted row
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        let work = sqlx::query_as::<Postgres, Work>(&format!(
            "DELETE FROM works WHERE id = $1 RETURNING {}",
            WORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work)
    }

    /// Every image URL across all works
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn all_image_urls(&self) -> Result<Vec<String>, AppError> {
        let urls = sqlx::query_scalar::<Postgres, String>("SELECT unnest(images) FROM works")
            .fetch_all(&self.pool)
            .await?;

        Ok(urls)
    }

    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn count_with_image(&self, url: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM works WHERE $1 = ANY(images)",
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn count_with_tag(&self, tag: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM works WHERE $1 = ANY(tags)")
                .bind(tag)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Distinct tag names used by any work, sorted
    #[tracing::instrument(skip(self), fields(db.table = "works", db.operation = "select"))]
    pub async fn distinct_tags(&self) -> Result<Vec<String>, AppError> {
        let tags = sqlx::query_scalar::<Postgres, String>(
            "SELECT DISTINCT unnest(tags) AS tag FROM works ORDER BY tag",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}
