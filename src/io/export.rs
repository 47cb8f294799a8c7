use anyhow::Result;
use std::io::Write;

use crate::application::LedgerService;
use crate::io::Sheet;

/// Write a sheet as CSV, header first.
pub fn write_csv<W: Write>(sheet: &Sheet, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Exporter for writing the ledger out as a backup file
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the whole ledger as CSV, returning the number of rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let sheet = self.service.export_sheet();
        write_csv(&sheet, writer)?;
        Ok(sheet.rows.len())
    }
}
