//! Invoicing Domain
//!
//! This crate holds the invoice financial model and everything a tenant needs
//! to issue invoices: clients, line items, invoice numbering, and the client
//! directory with its import and export formats.
//!
//! # Totals
//!
//! Every derived amount is rounded to two decimal places at the step where it
//! is produced:
//!
//! ```text
//! subtotal                = round(Σ round(qty × rate))
//! discount_amount         = round(subtotal × discount% / 100)
//! subtotal_after_discount = round(subtotal − discount_amount)
//! tax_amount              = round(subtotal_after_discount × tax% / 100)
//! total                   = round(subtotal_after_discount + tax_amount)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use core_kernel::Percentage;
//! use domain_invoicing::client::{Client, NewClient};
//! use domain_invoicing::invoice::Invoice;
//! use domain_invoicing::line_item::LineItem;
//! use domain_invoicing::numbering::InvoiceNumber;
//! use rust_decimal_macros::dec;
//!
//! let client = Client::new(NewClient::new("Acme", "billing@acme.test", "1 Main St")).unwrap();
//! let issued = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut invoice = Invoice::new(
//!     InvoiceNumber::new("INV-0001"),
//!     client,
//!     issued,
//!     issued + chrono::Days::new(30),
//!     "USD",
//! )
//! .with_tax_rate(Percentage::new(dec!(8)).unwrap())
//! .with_discount(Percentage::new(dec!(10)).unwrap());
//! invoice.add_item(LineItem::new("Consulting", dec!(2), dec!(50)));
//!
//! assert_eq!(invoice.total(), dec!(97.20));
//! assert_eq!(invoice.format_amount(invoice.total()), "$97.20");
//! ```

pub mod error;
pub mod client;
pub mod line_item;
pub mod invoice;
pub mod tenant;
pub mod input;
pub mod numbering;
pub mod ports;
pub mod directory;
pub mod services;

pub use error::InvoicingError;
pub use client::{Client, ClientUpdate, NewClient};
pub use line_item::LineItem;
pub use invoice::{Invoice, InvoiceStats, InvoiceStatus, InvoiceTotals};
pub use tenant::{Company, InvoicePrefix};
pub use input::{InvoiceDraft, LineItemInput, RawNumber, ValidatedDraft};
pub use numbering::{InvoiceNumber, InvoiceNumberAllocator, SequenceKey, SequenceKind};
pub use ports::{CounterState, CounterStore, InMemoryCounterStore};
pub use directory::{ClientDirectory, ClientSummary, ExchangeFormat};
pub use services::InvoicingService;
