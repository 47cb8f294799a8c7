// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use biashara::application::LedgerService;
use biashara::domain::Category;
use biashara::io::Sheet;
use biashara::storage::{RemoteStore, SheetStore};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Helper to create a sheet store backed by a temporary SQLite file
pub async fn test_sheet() -> Result<(SheetStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("sheet.db");
    let store = SheetStore::open(db_path.to_str().unwrap()).await?;
    Ok((store, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to build a recording timestamp in the middle of the given day
pub fn at(date_str: &str) -> NaiveDateTime {
    parse_date(date_str).and_hms_opt(10, 15, 0).unwrap()
}

/// Remote store whose every call fails, standing in for a lost connection
pub struct OfflineStore;

impl RemoteStore for OfflineStore {
    async fn read(&self) -> Result<Sheet> {
        anyhow::bail!("connection refused")
    }

    async fn write(&self, _sheet: &Sheet) -> Result<()> {
        anyhow::bail!("connection refused")
    }
}

/// Test fixture: a typical day at the shop
pub struct ShopDay;

impl ShopDay {
    /// Three sales and two jobs on one date
    pub fn record(service: &mut LedgerService, date_str: &str) -> Result<()> {
        let now = at(date_str);
        service.record_transaction("a10s", "screen", Category::SpareGood, 15000, now)?;
        service.record_transaction("a10s", "screen", Category::SpareGood, 15000, now)?;
        service.record_transaction("tecno spark 5", "battery", Category::SpareGood, 8000, now)?;
        service.record_transaction("", "flashing", Category::JobService, 5000, now)?;
        service.record_transaction("itel a56", "charging port", Category::JobService, 4000, now)?;
        Ok(())
    }
}
