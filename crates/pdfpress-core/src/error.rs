use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfPressError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid selection: {0}")]
    InvalidRange(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Invalid permission: {0}")]
    InvalidPermission(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported file {path}: only {accepted} accepted")]
    UnsupportedFile { path: PathBuf, accepted: String },

    #[error("No input produced any page: {0}")]
    EmptyInput(String),

    #[error("Project error: {0}")]
    Project(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PdfPressError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PdfPressError::Io {
            path: path.into(),
            source,
        }
    }
}
