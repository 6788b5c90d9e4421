//! Error types for grid reconstruction and range extraction

use thiserror::Error;

/// Errors raised while reading a range out of a published sheet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The document could not be fetched (transport failure or non-success status)
    #[error("Document {document} is unavailable: {reason}")]
    DocumentUnavailable { document: String, reason: String },

    /// The markup does not contain a recognizable spreadsheet container
    #[error("Invalid document structure: {0}")]
    InvalidDocumentStructure(String),

    #[error("Page {0} does not exist")]
    TabNotFound(String),

    #[error("Row {0} does not exist")]
    RowNotFound(String),

    #[error("Col {0} does not exist")]
    ColumnNotFound(String),

    /// A textual cell or range reference could not be parsed
    #[error("Invalid reference '{0}'")]
    InvalidReference(String),

    /// Resolved bounds exceed the configured occupancy limit
    #[error("Range of {cells} cells exceeds the limit of {limit}")]
    RangeTooLarge { cells: u64, limit: u64 },

    /// No tab id was given and the document has several tabs
    #[error("The document has {} tabs, choose one:\n{}", .tabs.len(), crate::tabs::format_names(.tabs))]
    TabSelectionRequired { tabs: Vec<String> },
}

pub type Result<T> = std::result::Result<T, SheetError>;
