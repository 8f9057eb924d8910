use folio_core::{
    models::{CreateTagRequest, Tag, UpdateTagRequest},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const TAG_COLUMNS: &str = "id, name, description, is_active, show_in_menu, created_at, updated_at";

/// Repository for gallery tags
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<Postgres, Tag>(&format!(
            "SELECT {} FROM tags ORDER BY name ASC",
            TAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Active tags flagged for the gallery menu
    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    pub async fn list_menu(&self) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<Postgres, Tag>(&format!(
            "SELECT {} FROM tags WHERE is_active = TRUE AND show_in_menu = TRUE ORDER BY name ASC",
            TAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(&format!(
            "SELECT {} FROM tags WHERE id = $1",
            TAG_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "select"))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(&format!(
            "SELECT {} FROM tags WHERE name = $1",
            TAG_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self, request), fields(db.table = "tags", db.operation = "insert"))]
    pub async fn create(&self, request: &CreateTagRequest) -> Result<Tag, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(&format!(
            r#"
            INSERT INTO tags (name, description, is_active, show_in_menu)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.is_active)
        .bind(request.show_in_menu)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    /// Apply the fields present in `request`; absent fields keep their value
    #[tracing::instrument(skip(self, request), fields(db.table = "tags", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateTagRequest,
    ) -> Result<Option<Tag>, AppError> {
        let tag = sqlx::query_as::<Postgres, Tag>(&format!(
            r#"
            UPDATE tags
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                show_in_menu = COALESCE($5, show_in_menu),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.is_active)
        .bind(request.show_in_menu)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tags", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
