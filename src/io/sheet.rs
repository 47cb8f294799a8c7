use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::{ImportError, RowIssue};
use crate::domain::{normalize_item, normalize_model, parse_amount, Category, Transaction};

/// Column layout shared by CSV backups and the remote sheet.
pub const COLUMNS: [&str; 5] = ["Date", "Model", "Item", "Category", "Price"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw table of strings: one header row and any number of data rows.
/// This is the wire shape of a ledger snapshot; nothing about it is validated until
/// it is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Records recovered from a sheet plus the rows that were left out.
#[derive(Debug, Clone, Default)]
pub struct DecodedSheet {
    pub records: Vec<Transaction>,
    pub issues: Vec<RowIssue>,
}

impl Sheet {
    /// Encode records in ledger order.
    pub fn from_records(records: &[Transaction]) -> Self {
        let rows = records
            .iter()
            .map(|t| {
                vec![
                    t.date.format(DATE_FORMAT).to_string(),
                    t.model.clone(),
                    t.item.clone(),
                    t.category.as_str().to_string(),
                    t.price.to_string(),
                ]
            })
            .collect();

        Self {
            headers: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// A sheet nobody has written to yet: no header and no rows.
    pub fn is_blank(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Decode the table into transactions.
    ///
    /// Headers are matched trimmed and case-insensitively; extra columns are ignored.
    /// A missing required column rejects the whole sheet. Rows without an item or a
    /// positive price, or with a cell that does not parse, are skipped and reported.
    /// Model and item text is normalized the same way as recorded input.
    pub fn decode(&self) -> Result<DecodedSheet, ImportError> {
        if self.is_blank() {
            return Ok(DecodedSheet::default());
        }

        let mut positions = [0usize; 5];
        let mut missing = Vec::new();
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            match self
                .headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
            {
                Some(idx) => *slot = idx,
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ImportError::SchemaMismatch(missing));
        }

        let [date_idx, model_idx, item_idx, category_idx, price_idx] = positions;
        let mut decoded = DecodedSheet::default();

        for (row_num, row) in self.rows.iter().enumerate() {
            let line = row_num + 2;

            // Blank trailing lines from spreadsheet exports
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }

            match decode_row(
                cell(row, date_idx),
                cell(row, model_idx),
                cell(row, item_idx),
                cell(row, category_idx),
                cell(row, price_idx),
            ) {
                Ok(record) => decoded.records.push(record),
                Err((field, error)) => decoded.issues.push(RowIssue {
                    line,
                    field: Some(field.to_string()),
                    error,
                }),
            }
        }

        Ok(decoded)
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

fn decode_row(
    date: &str,
    model: &str,
    item: &str,
    category: &str,
    price: &str,
) -> Result<Transaction, (&'static str, String)> {
    if item.is_empty() {
        return Err(("Item", "missing item".to_string()));
    }
    if price.is_empty() {
        return Err(("Price", "missing price".to_string()));
    }

    let date = parse_date_cell(date).ok_or_else(|| ("Date", format!("invalid date '{}'", date)))?;
    let category = Category::from_str(category)
        .ok_or_else(|| ("Category", format!("unknown category '{}'", category)))?;
    let price = parse_amount(price).map_err(|e| ("Price", e.to_string()))?;
    if price == 0 {
        return Err(("Price", "price must be greater than zero".to_string()));
    }

    Ok(Transaction::new(
        date,
        normalize_model(model),
        normalize_item(item),
        category,
        price,
    ))
}

/// `YYYY-MM-DD`, also accepting a trailing time part as spreadsheets sometimes write it.
fn parse_date_cell(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet {
            headers: row(headers),
            rows: rows.iter().map(|r| row(r)).collect(),
        }
    }

    #[test]
    fn test_encode_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let sheet = Sheet::from_records(&[Transaction::new(
            date,
            "A10S",
            "Screen",
            Category::SpareGood,
            15000,
        )]);

        assert_eq!(sheet.headers, row(&COLUMNS));
        assert_eq!(sheet.rows, vec![row(&["2024-03-09", "A10S", "Screen", "Spare/Good", "15000"])]);
    }

    #[test]
    fn test_decode_ignores_extra_columns_and_header_case() {
        let sheet = sheet(
            &["", "date", "MODEL", "Item ", "Category", "Price", "Notes"],
            &[&["0", "2024-03-09", "A10S", "Screen", "Spare/Good", "15000", "paid"]],
        );

        let decoded = sheet.decode().unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].item, "Screen");
        assert_eq!(decoded.records[0].price, 15000);
        assert!(decoded.issues.is_empty());
    }

    #[test]
    fn test_decode_missing_column_is_schema_mismatch() {
        let sheet = sheet(&["Date", "Model", "Item", "Category"], &[]);

        match sheet.decode() {
            Err(ImportError::SchemaMismatch(missing)) => assert_eq!(missing, vec!["Price"]),
            other => panic!("expected schema mismatch, got {:?}", other.map(|d| d.records)),
        }
    }

    #[test]
    fn test_decode_skips_rows_missing_item_or_price() {
        let sheet = sheet(
            &COLUMNS,
            &[
                &["2024-03-09", "A10S", "", "Spare/Good", "15000"],
                &["2024-03-09", "A10S", "Glass", "Spare/Good", ""],
                &["2024-03-09", "", "Unlock", "Job/Service", "3000"],
            ],
        );

        let decoded = sheet.decode().unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].model, "N/A");
        assert_eq!(decoded.issues.len(), 2);
        assert_eq!(decoded.issues[0].line, 2);
        assert_eq!(decoded.issues[0].field.as_deref(), Some("Item"));
        assert_eq!(decoded.issues[1].line, 3);
        assert_eq!(decoded.issues[1].field.as_deref(), Some("Price"));
    }

    #[test]
    fn test_decode_reports_unparsable_cells() {
        let sheet = sheet(
            &COLUMNS,
            &[
                &["09/03/2024", "A10S", "Screen", "Spare/Good", "15000"],
                &["2024-03-09", "A10S", "Screen", "Gift", "15000"],
                &["2024-03-09", "A10S", "Screen", "Spare/Good", "-1"],
                &["2024-03-09 00:00:00", "A10S", "Screen", "Spare/Good", "15000.0"],
            ],
        );

        let decoded = sheet.decode().unwrap();
        assert_eq!(decoded.records.len(), 1);
        let fields: Vec<_> = decoded.issues.iter().filter_map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, vec!["Date", "Category", "Price"]);
    }

    #[test]
    fn test_decode_skips_zero_price() {
        let sheet = sheet(
            &COLUMNS,
            &[
                &["2024-03-09", "A10S", "Screen", "Spare/Good", "0"],
                &["2024-03-09", "A10S", "Glass", "Spare/Good", "0.0"],
            ],
        );

        let decoded = sheet.decode().unwrap();
        assert!(decoded.records.is_empty());
        assert_eq!(decoded.issues.len(), 2);
        assert!(decoded.issues.iter().all(|i| i.field.as_deref() == Some("Price")));
    }

    #[test]
    fn test_decode_normalizes_model_and_item() {
        let sheet = sheet(
            &COLUMNS,
            &[
                &["2024-03-09", " a10s ", "lcd SCREEN", "Spare/Good", "15000"],
                &["2024-03-09", "   ", "unlock", "Job/Service", "3000"],
            ],
        );

        let decoded = sheet.decode().unwrap();
        assert_eq!(decoded.records[0].model, "A10S");
        assert_eq!(decoded.records[0].item, "Lcd Screen");
        assert_eq!(decoded.records[1].model, "N/A");
        assert_eq!(decoded.records[1].item, "Unlock");
    }

    #[test]
    fn test_blank_sheet_decodes_to_nothing() {
        let decoded = Sheet::default().decode().unwrap();
        assert!(decoded.records.is_empty());
        assert!(decoded.issues.is_empty());
    }
}
