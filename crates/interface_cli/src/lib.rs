//! Invoicer command line interface
//!
//! One process serves one company, configured through [`config::AppConfig`].
//! Invoice and client counters live in a JSON file under the data directory,
//! or in PostgreSQL when a database URL is configured. Client directories
//! are always kept as files next to the counters.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{execute, Cli, Command};
pub use config::{AppConfig, CompanySettings};
pub use error::CliError;
