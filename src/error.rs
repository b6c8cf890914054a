//! Error types for document processing
//!
//! Per-section and per-paragraph misses are not errors: they are logged and
//! reported through [`crate::processor::ProcessingResult`]. The variants here
//! cover failures that stop a variant, a document or the whole run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad folder or mapping path, missing required mapping columns, bad config
    #[error("validation error: {0}")]
    Validation(String),

    /// Mapping row lookup failed (no row for a language or country)
    #[error("mapping error: {0}")]
    Mapping(String),

    /// Span replacement or header ordering failure
    #[error("document error: {0}")]
    Document(String),

    /// Catch-all for unexpected lower-level faults
    #[error("processing error: {0}")]
    Processing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to read .docx: {0}")]
    Docx(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl From<docx_rs::ReaderError> for Error {
    fn from(err: docx_rs::ReaderError) -> Self {
        Error::Docx(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Docx(err.to_string())
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}
