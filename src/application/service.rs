use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    merge_records, normalize_item, normalize_model, Category, Ledger, Transaction,
};
use crate::io::{ImportResult, Sheet};
use crate::storage::RemoteStore;

use super::reporting::{self, RankEntry, RankKey, RevenueReport};
use super::{AppError, ImportError, ValidationError};

/// How an imported snapshot is combined with the current ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the ledger and install the snapshot (restore from backup)
    Replace,
    /// Smart merge: keep the ledger, add rows it does not already have
    Merge,
}

/// Outcome of a remote sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub pulled: ImportResult,
    pub pushed: usize,
}

/// Application service owning the ledger for one business.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
#[derive(Debug, Default)]
pub struct LedgerService {
    ledger: Ledger,
}

impl LedgerService {
    /// Create a service with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Recording
    // ========================

    /// Validate raw input and append one transaction dated `now`.
    pub fn record_transaction(
        &mut self,
        raw_model: &str,
        raw_item: &str,
        category: Category,
        raw_price: i64,
        now: NaiveDateTime,
    ) -> Result<Transaction, ValidationError> {
        let model = normalize_model(raw_model);
        let item = normalize_item(raw_item);

        if item.is_empty() || raw_price <= 0 {
            return Err(ValidationError::MissingFields);
        }

        let record = Transaction::new(now.date(), model, item, category, raw_price as u64);
        let stored = self.ledger.append(record).clone();

        tracing::info!(
            item = %stored.item,
            model = %stored.model,
            category = %stored.category,
            price = stored.price,
            "recorded transaction"
        );
        Ok(stored)
    }

    /// Remove the most recent transaction, if any.
    pub fn delete_last(&mut self) -> Option<Transaction> {
        let removed = self.ledger.delete_last();
        if let Some(record) = &removed {
            tracing::info!(item = %record.item, date = %record.date, "deleted last transaction");
        }
        removed
    }

    // ========================
    // Snapshots
    // ========================

    /// Read-only view of the ledger in insertion order.
    pub fn records(&self) -> &[Transaction] {
        self.ledger.records()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Full copy of the ledger for serialization.
    pub fn export_snapshot(&self) -> Vec<Transaction> {
        self.ledger.records().to_vec()
    }

    /// The ledger in its wire layout.
    pub fn export_sheet(&self) -> Sheet {
        Sheet::from_records(self.ledger.records())
    }

    /// Install already-parsed records. Returns how many records were installed or added.
    pub fn import_snapshot(&mut self, records: Vec<Transaction>, mode: ImportMode) -> usize {
        let count = match mode {
            ImportMode::Replace => {
                let count = records.len();
                self.ledger.replace(records);
                count
            }
            ImportMode::Merge => self.ledger.merge(records),
        };
        tracing::info!(?mode, count, total = self.ledger.len(), "imported snapshot");
        count
    }

    /// Decode a raw table and import it.
    /// A schema mismatch rejects the whole table and leaves the ledger untouched.
    pub fn import_sheet(&mut self, sheet: &Sheet, mode: ImportMode) -> Result<ImportResult, AppError> {
        let decoded = sheet.decode()?;
        let received = decoded.records.len();

        for issue in &decoded.issues {
            tracing::warn!(line = issue.line, field = ?issue.field, "skipped row: {}", issue.error);
        }

        let imported = self.import_snapshot(decoded.records, mode);

        Ok(ImportResult {
            imported,
            duplicates: received - imported,
            skipped: decoded.issues.len(),
            errors: decoded.issues,
        })
    }

    /// What `import_sheet` would do, without changing the ledger.
    pub fn preview_sheet(&self, sheet: &Sheet, mode: ImportMode) -> Result<ImportResult, ImportError> {
        let decoded = sheet.decode()?;
        let received = decoded.records.len();

        let imported = match mode {
            ImportMode::Replace => received,
            ImportMode::Merge => {
                merge_records(self.export_snapshot(), decoded.records).len() - self.ledger.len()
            }
        };

        Ok(ImportResult {
            imported,
            duplicates: received - imported,
            skipped: decoded.issues.len(),
            errors: decoded.issues,
        })
    }

    // ========================
    // Remote store
    // ========================

    /// Read the remote sheet and import it.
    /// On failure the local ledger is kept as it is and `RemoteUnavailable` is returned,
    /// so the caller can carry on locally.
    pub async fn pull<R: RemoteStore>(
        &mut self,
        remote: &R,
        mode: ImportMode,
    ) -> Result<ImportResult, AppError> {
        let sheet = match remote.read().await {
            Ok(sheet) => sheet,
            Err(err) => {
                tracing::warn!("remote read failed, keeping local ledger: {err:#}");
                return Err(AppError::RemoteUnavailable(err));
            }
        };
        self.import_sheet(&sheet, mode)
    }

    /// Overwrite the remote sheet with the ledger.
    /// The in-memory ledger is never rolled back when the write fails.
    pub async fn push<R: RemoteStore>(&self, remote: &R) -> Result<usize, AppError> {
        let sheet = self.export_sheet();
        remote.write(&sheet).await.map_err(|err| {
            tracing::error!("remote write failed: {err:#}");
            AppError::RemoteUnavailable(err)
        })?;
        tracing::info!(rows = sheet.rows.len(), "pushed ledger to remote");
        Ok(sheet.rows.len())
    }

    /// Merge the remote sheet into the ledger, then write the result back.
    /// This is a plain read-then-write; a concurrent writer in between is overwritten.
    pub async fn sync<R: RemoteStore>(&mut self, remote: &R) -> Result<SyncResult, AppError> {
        let pulled = self.pull(remote, ImportMode::Merge).await?;
        let pushed = self.push(remote).await?;
        Ok(SyncResult { pulled, pushed })
    }

    // ========================
    // Reports
    // ========================

    pub fn transactions_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        reporting::filter_by_range(self.records(), start, end)
    }

    pub fn revenue_report(&self, start: NaiveDate, end: NaiveDate) -> RevenueReport {
        reporting::revenue_report(self.records(), start, end)
    }

    /// Ranking over `start..=end`, truncated to `limit` groups when given.
    pub fn ranking(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        key: RankKey,
        limit: Option<usize>,
    ) -> Vec<RankEntry> {
        let in_range = reporting::filter_by_range(self.records(), start, end);
        let mut ranking = reporting::rank_by_frequency(&in_range, key);
        if let Some(limit) = limit {
            ranking.truncate(limit);
        }
        ranking
    }
}
