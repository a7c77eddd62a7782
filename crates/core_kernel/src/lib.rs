//! Core Kernel - Foundational types and utilities for the invoicing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Currency table, two-decimal rounding and amount formatting
//! - Country table with default currencies
//! - Clocks and tenant timezones
//! - Common identifiers and the port error type

pub mod money;
pub mod locale;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Currency, MoneyError, Percentage, format_amount, round_money, symbol_for_code};
pub use locale::{Country, currency_for_country};
pub use temporal::{Clock, FixedClock, SystemClock, Timezone, TemporalError};
pub use identifiers::{ClientId, InvoiceId, LineItemId, TenantId};
pub use ports::{DomainPort, PortError};
pub use error::CoreError;
