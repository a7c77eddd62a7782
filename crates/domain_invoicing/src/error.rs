//! Invoicing domain errors

use thiserror::Error;

use core_kernel::{CoreError, MoneyError, PortError};

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// Input failed validation
    #[error("Validation error on {field}: {message}")]
    Validation {
        field: String,
        message: String,
    },

    /// Invalid status transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// A client with this email already exists for the tenant
    #[error("Client with email {0} already exists")]
    DuplicateClient(String),

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Export or import format is not supported
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Import data could not be parsed
    #[error("Invalid import data: {0}")]
    InvalidImport(String),

    /// Export data could not be produced
    #[error("Export failed: {0}")]
    Export(String),

    /// Counter store failure
    #[error("Counter store error: {0}")]
    Port(#[from] PortError),

    /// Core kernel error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl InvoicingError {
    /// Creates a validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InvoicingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InvoicingError::Validation { .. }
                | InvoicingError::DuplicateClient(_)
                | InvoicingError::UnsupportedFormat(_)
                | InvoicingError::InvalidImport(_)
        )
    }
}

impl From<MoneyError> for InvoicingError {
    fn from(err: MoneyError) -> Self {
        InvoicingError::Core(CoreError::Money(err))
    }
}

impl From<validator::ValidationErrors> for InvoicingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        InvoicingError::Validation {
            field: fields.join(", "),
            message: errors.to_string(),
        }
    }
}
