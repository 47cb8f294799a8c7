use std::collections::HashSet;

use super::Transaction;

/// The ordered collection of transactions for one business.
/// Insertion order is the only ordering the ledger guarantees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Transaction>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.records.last()
    }

    /// Append a record. Appending never deduplicates.
    pub fn append(&mut self, record: Transaction) -> &Transaction {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Remove the most recently appended record. Empty ledgers are left alone.
    pub fn delete_last(&mut self) -> Option<Transaction> {
        self.records.pop()
    }

    /// Discard the current contents and install `records` verbatim.
    pub fn replace(&mut self, records: Vec<Transaction>) {
        self.records = records;
    }

    /// Merge `records` into the ledger, dropping exact full-row duplicates.
    /// Returns the number of records that were added.
    pub fn merge(&mut self, records: Vec<Transaction>) -> usize {
        let before = self.records.len();
        self.records = merge_records(std::mem::take(&mut self.records), records);
        self.records.len() - before
    }
}

/// Union of two record sequences with whole-row deduplication.
///
/// Existing records are kept in their original order, including repeats that were
/// appended on purpose. Incoming records follow in input order, and each one is dropped
/// when an identical record already appears earlier in the combined sequence.
pub fn merge_records(existing: Vec<Transaction>, incoming: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen: HashSet<Transaction> = existing.iter().cloned().collect();
    let mut merged = existing;

    for record in incoming {
        if seen.insert(record.clone()) {
            merged.push(record);
        }
    }

    merged
}
