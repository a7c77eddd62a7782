//! Invoice PDF files
//!
//! [`PdfInvoiceGenerator`] runs the whole pipeline (layout, pagination,
//! rendering) and writes the result into its output directory. Files are
//! written to a temporary sibling and renamed into place, so a reader never
//! sees a partial PDF.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use domain_invoicing::{Company, Invoice};

use crate::error::RenderError;
use crate::invoice_layout::{layout_invoice, RenderOptions};
use crate::layout::Document;
use crate::pagination::{paginate, PageSpec, PagedDocument};
use crate::pdf::render_pdf;

/// `invoice_{number}_{YYYYMMDD}.pdf`
///
/// Characters that cannot appear in a file name are replaced by `_`.
pub fn invoice_filename(invoice_number: &str, generated_on: NaiveDate) -> String {
    let safe: String = invoice_number
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("invoice_{}_{}.pdf", safe, generated_on.format("%Y%m%d"))
}

/// Result of one render
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub document: Document,
    pub paged: PagedDocument,
    pub bytes: Vec<u8>,
}

/// Renders invoices into PDF files under one directory
#[derive(Debug, Clone)]
pub struct PdfInvoiceGenerator {
    output_dir: PathBuf,
    page: PageSpec,
}

impl PdfInvoiceGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            page: PageSpec::LETTER,
        }
    }

    pub fn with_page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Lays out and renders `invoice` without touching the file system
    pub fn render(
        &self,
        invoice: &Invoice,
        company: &Company,
        options: &RenderOptions,
    ) -> Result<RenderedInvoice, RenderError> {
        let document = layout_invoice(invoice, company, options);
        let paged = paginate(&document, &self.page);
        let bytes = render_pdf(&paged)?;
        Ok(RenderedInvoice {
            document,
            paged,
            bytes,
        })
    }

    /// Renders `invoice` and writes it to the output directory
    ///
    /// Returns the path of the written file. An existing file of the same
    /// name is replaced.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Io` if the directory cannot be created or the
    /// file cannot be written, and `RenderError::Pdf` if rendering fails.
    pub fn generate(
        &self,
        invoice: &Invoice,
        company: &Company,
        options: &RenderOptions,
    ) -> Result<PathBuf, RenderError> {
        let rendered = self.render(invoice, company, options)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let filename = invoice_filename(invoice.invoice_number().as_str(), options.generated_on);
        let path = self.output_dir.join(&filename);

        let mut file = tempfile::Builder::new()
            .prefix(".invoice-")
            .suffix(".pdf.tmp")
            .tempfile_in(&self.output_dir)?;
        file.write_all(&rendered.bytes)?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| RenderError::Io(e.error))?;

        info!(
            invoice_number = %invoice.invoice_number(),
            path = %path.display(),
            pages = rendered.paged.page_count(),
            bytes = rendered.bytes.len(),
            watermark = rendered.document.watermark.is_some(),
            "Generated invoice PDF"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(invoice_filename("INV-0001", date), "invoice_INV-0001_20240301.pdf");
    }

    #[test]
    fn test_filename_sanitizes_separators() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(invoice_filename("A/B\\C", date), "invoice_A_B_C_20240301.pdf");
    }
}
