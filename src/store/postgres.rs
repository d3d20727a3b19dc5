use async_trait::async_trait;
use sqlx::PgPool;

use super::{Sheet, SheetStore};
use crate::error::StoreError;
use crate::models::PersistedRow;

/// Sheets stored in PostgreSQL. Row order is the serial `id`, which is the
/// order rows were appended in.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SheetStore for PgStore {
    async fn sheet_by_name(&self, name: &str) -> Result<Option<Sheet>, StoreError> {
        let sheet = sqlx::query_as::<_, Sheet>("SELECT id, name FROM sheets WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sheet)
    }

    async fn list_sheets(&self) -> Result<Vec<Sheet>, StoreError> {
        let sheets = sqlx::query_as::<_, Sheet>("SELECT id, name FROM sheets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(sheets)
    }

    async fn create_sheet(&self, name: &str) -> Result<Sheet, StoreError> {
        let sheet = sqlx::query_as::<_, Sheet>(
            "INSERT INTO sheets (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(sheet)
    }

    async fn is_empty(&self, sheet: &Sheet) -> Result<bool, StoreError> {
        let (empty,): (bool,) = sqlx::query_as(
            "SELECT s.header IS NULL
                AND NOT EXISTS (SELECT 1 FROM sheet_rows r WHERE r.sheet_id = s.id)
             FROM sheets s WHERE s.id = $1",
        )
        .bind(sheet.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(empty)
    }

    async fn write_header_row(&self, sheet: &Sheet, header: &[&str]) -> Result<(), StoreError> {
        let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        sqlx::query("UPDATE sheets SET header = $2 WHERE id = $1")
            .bind(sheet.id)
            .bind(header)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_row(&self, sheet: &Sheet, row: &PersistedRow) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sheet_rows
                (sheet_id, submitted_at, email, interests, language, source, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(sheet.id)
        .bind(row.timestamp)
        .bind(&row.email)
        .bind(&row.interests)
        .bind(&row.language)
        .bind(&row.source)
        .bind(&row.user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn read_all_rows(&self, sheet: &Sheet) -> Result<Vec<PersistedRow>, StoreError> {
        let rows = sqlx::query_as::<_, PersistedRow>(
            r#"SELECT submitted_at AS "timestamp", email, interests, language, source, user_agent
               FROM sheet_rows
               WHERE sheet_id = $1
               ORDER BY id ASC"#,
        )
        .bind(sheet.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
