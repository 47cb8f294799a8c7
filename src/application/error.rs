use thiserror::Error;

/// Rejection of user input at the recording boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Item name and a positive price are required")]
    MissingFields,
}

/// Rejection of a whole snapshot import. The ledger is left unchanged.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Snapshot is missing required column(s): {}", .0.join(", "))]
    SchemaMismatch(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A row that was left out of an import, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based line in the source table, the header being line 1
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Remote store unavailable: {0:#}")]
    RemoteUnavailable(anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
