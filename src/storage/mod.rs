mod sheet_store;

use anyhow::Result;

use crate::io::Sheet;

pub use sheet_store::*;

/// SQL migration for the sheet table
pub const MIGRATION_001_SHEET: &str = include_str!("migrations/001_sheet.sql");

/// A remote, spreadsheet-like copy of the ledger.
///
/// The store holds whatever table it was given. It is not trusted to enforce the column
/// layout or row uniqueness; the ledger service decodes and merges what it reads.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn read(&self) -> Result<Sheet>;

    /// Overwrite the whole remote sheet.
    async fn write(&self, sheet: &Sheet) -> Result<()>;
}
