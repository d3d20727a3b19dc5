//! The sheet that accepted submissions are appended to.
//!
//! A store holds named sheets. Each sheet has an optional header row and an
//! append-only list of [`PersistedRow`]s kept in insertion order.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{PersistedRow, COLUMNS};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Handle to one sheet, resolved once per request.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Sheet {
    pub id: i64,
    pub name: String,
}

#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn sheet_by_name(&self, name: &str) -> Result<Option<Sheet>, StoreError>;

    /// All sheets, in creation order.
    async fn list_sheets(&self) -> Result<Vec<Sheet>, StoreError>;

    async fn create_sheet(&self, name: &str) -> Result<Sheet, StoreError>;

    /// True when the sheet has neither a header nor any rows.
    async fn is_empty(&self, sheet: &Sheet) -> Result<bool, StoreError>;

    async fn write_header_row(&self, sheet: &Sheet, header: &[&str]) -> Result<(), StoreError>;

    async fn append_row(&self, sheet: &Sheet, row: &PersistedRow) -> Result<(), StoreError>;

    /// Every row, oldest first. Callers may rely on this order being the
    /// append order.
    async fn read_all_rows(&self, sheet: &Sheet) -> Result<Vec<PersistedRow>, StoreError>;
}

/// Find the sheet named `name`, or fall back to the first sheet in the store.
pub async fn resolve_sheet(store: &dyn SheetStore, name: &str) -> Result<Sheet, StoreError> {
    if let Some(sheet) = store.sheet_by_name(name).await? {
        return Ok(sheet);
    }

    let fallback = store
        .list_sheets()
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::NoSheet)?;

    tracing::warn!("Sheet '{name}' not found, using '{}'", fallback.name);
    Ok(fallback)
}

/// Create the sheet if it is missing and give it a header row if it is empty.
pub async fn setup_sheet(store: &dyn SheetStore, name: &str) -> Result<Sheet, StoreError> {
    let sheet = match store.sheet_by_name(name).await? {
        Some(sheet) => sheet,
        None => {
            tracing::info!("Creating sheet '{name}'");
            store.create_sheet(name).await?
        }
    };

    if store.is_empty(&sheet).await? {
        store.write_header_row(&sheet, &COLUMNS).await?;
        tracing::info!("Wrote header row to sheet '{name}'");
    }

    Ok(sheet)
}
