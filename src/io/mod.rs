// Snapshot codec and backup files.
// The same Date/Model/Item/Category/Price table is used for CSV backups and for the
// remote sheet, so both directions go through `Sheet`.

mod export;
mod import;
mod sheet;

pub use export::*;
pub use import::*;
pub use sheet::*;
