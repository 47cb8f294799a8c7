use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::io::Sheet;

use super::{RemoteStore, MIGRATION_001_SHEET};

/// A spreadsheet kept in SQLite: one table, one JSON-encoded row per sheet row.
pub struct SheetStore {
    pool: SqlitePool,
}

impl SheetStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to sheet database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_SHEET)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a sheet database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Open the sheet stored at `path`, creating the file if needed.
    pub async fn open(path: &str) -> Result<Self> {
        Self::init(&format!("sqlite:{}?mode=rwc", path)).await
    }

    fn decode_cells(row: &sqlx::sqlite::SqliteRow) -> Result<Vec<String>> {
        let index: i64 = row.get("row_index");
        let cells: String = row.get("cells");
        serde_json::from_str(&cells).with_context(|| format!("Sheet row {} is not a cell list", index))
    }
}

impl RemoteStore for SheetStore {
    async fn read(&self) -> Result<Sheet> {
        let rows = sqlx::query("SELECT row_index, cells FROM sheet_rows ORDER BY row_index")
            .fetch_all(&self.pool)
            .await
            .context("Failed to read sheet rows")?;

        let mut rows = rows.iter().map(Self::decode_cells);
        let headers = match rows.next() {
            Some(headers) => headers?,
            None => return Ok(Sheet::default()),
        };
        let rows = rows.collect::<Result<Vec<_>>>()?;

        tracing::debug!(rows = rows.len(), "read remote sheet");
        Ok(Sheet { headers, rows })
    }

    async fn write(&self, sheet: &Sheet) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start sheet write")?;

        sqlx::query("DELETE FROM sheet_rows")
            .execute(&mut *tx)
            .await
            .context("Failed to clear sheet")?;

        for (index, cells) in std::iter::once(&sheet.headers).chain(&sheet.rows).enumerate() {
            sqlx::query("INSERT INTO sheet_rows (row_index, cells) VALUES (?, ?)")
                .bind(index as i64)
                .bind(serde_json::to_string(cells)?)
                .execute(&mut *tx)
                .await
                .context("Failed to write sheet row")?;
        }

        tx.commit().await.context("Failed to commit sheet write")?;

        tracing::debug!(rows = sheet.rows.len(), "wrote remote sheet");
        Ok(())
    }
}
