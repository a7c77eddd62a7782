//! CLI error handling

use thiserror::Error;

use core_kernel::{CoreError, PortError};
use document_layout::RenderError;
use domain_invoicing::InvoicingError;
use infra_db::DatabaseError;

/// Errors surfaced by the `invoicer` commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Invoicing(#[from] InvoicingError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),

    #[error(transparent)]
    Port(#[from] PortError),

    /// Reading an input file failed
    #[error("Cannot read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Client not found: {0}")]
    UnknownClient(String),
}

impl CliError {
    /// Process exit code: 2 for bad input, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Input { .. } | CliError::UnknownClient(_) => 2,
            CliError::Invoicing(e) if e.is_validation() => 2,
            _ => 1,
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(error: config::ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        CliError::Config(error.to_string())
    }
}
