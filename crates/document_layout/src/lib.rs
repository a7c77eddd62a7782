//! Document Layout - Invoice PDF rendering
//!
//! Rendering runs in three stages:
//!
//! - [`invoice_layout`] builds a declarative [`Document`] from an invoice;
//! - [`pagination`] flows it onto pages as positioned elements;
//! - [`pdf`] draws those elements with `printpdf`.
//!
//! [`PdfInvoiceGenerator`] runs all three and writes the file.

pub mod error;
pub mod invoice_layout;
pub mod layout;
pub mod output;
pub mod pagination;
pub mod pdf;
pub mod styles;

pub use error::RenderError;
pub use invoice_layout::{abbreviate_unit, format_long_date, format_quantity, layout_invoice, RenderOptions};
pub use layout::{Block, Cell, Document, Paragraph, Row, Rule, Section, SectionKind, Table, TableStyle};
pub use output::{invoice_filename, PdfInvoiceGenerator, RenderedInvoice};
pub use pagination::{paginate, Element, Page, PageSpec, PagedDocument};
pub use pdf::render_pdf;
