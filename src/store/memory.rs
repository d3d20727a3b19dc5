use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Sheet, SheetStore};
use crate::error::StoreError;
use crate::models::PersistedRow;

struct MemorySheet {
    sheet: Sheet,
    header: Option<Vec<String>>,
    rows: Vec<PersistedRow>,
}

/// Sheets held in process memory. Lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    sheets: RwLock<Vec<MemorySheet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn header(&self, sheet: &Sheet) -> Result<Vec<String>, StoreError> {
        let sheets = self.sheets.read().await;
        let entry = find(&sheets, sheet)?;
        Ok(entry.header.clone().unwrap_or_default())
    }
}

fn find<'a>(sheets: &'a [MemorySheet], sheet: &Sheet) -> Result<&'a MemorySheet, StoreError> {
    sheets
        .iter()
        .find(|s| s.sheet.id == sheet.id)
        .ok_or_else(|| StoreError::Other(format!("Unknown sheet '{}'", sheet.name)))
}

fn find_mut<'a>(
    sheets: &'a mut [MemorySheet],
    sheet: &Sheet,
) -> Result<&'a mut MemorySheet, StoreError> {
    sheets
        .iter_mut()
        .find(|s| s.sheet.id == sheet.id)
        .ok_or_else(|| StoreError::Other(format!("Unknown sheet '{}'", sheet.name)))
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn sheet_by_name(&self, name: &str) -> Result<Option<Sheet>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .iter()
            .find(|s| s.sheet.name == name)
            .map(|s| s.sheet.clone()))
    }

    async fn list_sheets(&self) -> Result<Vec<Sheet>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets.iter().map(|s| s.sheet.clone()).collect())
    }

    async fn create_sheet(&self, name: &str) -> Result<Sheet, StoreError> {
        let mut sheets = self.sheets.write().await;
        if sheets.iter().any(|s| s.sheet.name == name) {
            return Err(StoreError::Other(format!("Sheet '{name}' already exists")));
        }

        let sheet = Sheet {
            id: sheets.len() as i64 + 1,
            name: name.to_string(),
        };
        sheets.push(MemorySheet {
            sheet: sheet.clone(),
            header: None,
            rows: Vec::new(),
        });
        Ok(sheet)
    }

    async fn is_empty(&self, sheet: &Sheet) -> Result<bool, StoreError> {
        let sheets = self.sheets.read().await;
        let entry = find(&sheets, sheet)?;
        Ok(entry.header.is_none() && entry.rows.is_empty())
    }

    async fn write_header_row(&self, sheet: &Sheet, header: &[&str]) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        let entry = find_mut(&mut sheets, sheet)?;
        entry.header = Some(header.iter().map(|h| h.to_string()).collect());
        Ok(())
    }

    async fn append_row(&self, sheet: &Sheet, row: &PersistedRow) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write().await;
        find_mut(&mut sheets, sheet)?.rows.push(row.clone());
        Ok(())
    }

    async fn read_all_rows(&self, sheet: &Sheet) -> Result<Vec<PersistedRow>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(find(&sheets, sheet)?.rows.clone())
    }
}
