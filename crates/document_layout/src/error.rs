//! Rendering errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF backend rejected the document
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The document cannot be laid out, e.g. an empty page set
    #[error("Layout error: {0}")]
    Layout(String),
}

impl RenderError {
    pub fn pdf(message: impl std::fmt::Display) -> Self {
        RenderError::Pdf(message.to_string())
    }
}
