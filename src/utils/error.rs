// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Workbook not found: {0}")]
    NotFound(String),

    #[error("Failed to open workbook {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Failed to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },

    #[error("Invalid column window '{0}'")]
    ColumnWindow(String),

    #[error("Header row {0} is beyond the last addressable spreadsheet row")]
    HeaderRow(usize),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Sheet '{sheet}' has {found} columns, expected {expected}")]
    ColumnCount {
        sheet: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid destination table name: {0}")]
    InvalidTable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Workbook access failed: {0}")]
    Sheet(#[from] SheetError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
