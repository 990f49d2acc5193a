//! Error types for the tariff dashboard.
//!
//! Only loading can fail. Per-query conditions (unknown code, unparseable rate,
//! zero totals) are carried in the shape of the query result instead.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tariff dashboard.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The workbook could not be opened or read.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// A required sheet is not present in the workbook.
    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    /// A required column is not present in a sheet.
    #[error("Missing column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    /// Data error (structurally invalid cell contents).
    #[error("Data error: {0}")]
    Data(String),

    /// An earlier load failed; the session no longer serves queries.
    #[error("Dataset unavailable after failed load: {0}")]
    LoadHalted(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a workbook error.
    pub fn workbook(msg: impl Into<String>) -> Self {
        Error::Workbook(msg.into())
    }

    /// Create a missing sheet error.
    pub fn missing_sheet(name: impl Into<String>) -> Self {
        Error::MissingSheet(name.into())
    }

    /// Create a missing column error.
    pub fn missing_column(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            sheet: sheet.into(),
            column: column.into(),
        }
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a load-halted error.
    pub fn load_halted(msg: impl Into<String>) -> Self {
        Error::LoadHalted(msg.into())
    }
}
