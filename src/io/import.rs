use std::io::Read;

use crate::application::{AppError, ImportError, ImportMode, LedgerService, RowIssue};
use crate::io::Sheet;

/// Result of an import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Records installed (replace) or added (merge)
    pub imported: usize,
    /// Records dropped by merge because an identical row was already present
    pub duplicates: usize,
    /// Rows that could not be turned into records
    pub skipped: usize,
    pub errors: Vec<RowIssue>,
}

/// Options for import operations
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub dry_run: bool,
}

/// Read a CSV table. Rows may be ragged; decoding deals with missing cells.
pub fn read_csv<R: Read>(reader: R) -> Result<Sheet, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(Sheet { headers, rows })
}

/// Importer for loading backup files into the ledger
pub struct Importer<'a> {
    service: &'a mut LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut LedgerService) -> Self {
        Self { service }
    }

    /// Import a CSV backup. The file is read completely before the ledger is touched.
    pub fn import_csv<R: Read>(
        &mut self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult, AppError> {
        let sheet = read_csv(reader)?;

        if options.dry_run {
            return Ok(self.service.preview_sheet(&sheet, options.mode)?);
        }

        self.service.import_sheet(&sheet, options.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let data = "Date,Model,Item,Category,Price\n2024-03-09,A10S,Screen,Spare/Good,15000\n2024-03-10,N/A,Unlock,Job/Service,3000\n";
        let sheet = read_csv(data.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["Date", "Model", "Item", "Category", "Price"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1][2], "Unlock");
    }

    #[test]
    fn test_read_csv_strips_byte_order_mark() {
        let data = "\u{feff}Date,Model,Item,Category,Price\n";
        let sheet = read_csv(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers[0], "Date");
    }

    #[test]
    fn test_read_csv_tolerates_ragged_rows() {
        let data = "Date,Model,Item,Category,Price\n2024-03-09,A10S,Screen\n";
        let sheet = read_csv(data.as_bytes()).unwrap();
        assert_eq!(sheet.rows[0].len(), 3);
    }

    #[test]
    fn test_read_empty_csv_is_blank() {
        let sheet = read_csv("".as_bytes()).unwrap();
        assert!(sheet.is_blank());
    }
}
