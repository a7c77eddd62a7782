//! Invoicing domain services
//!
//! [`InvoicingService`] ties a tenant's profile, its counters and a clock
//! together. It validates requests before touching the counters, so invalid
//! input never consumes an invoice or client number.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::Clock;

use crate::client::{Client, NewClient};
use crate::directory::{ClientDirectory, ExchangeFormat};
use crate::error::InvoicingError;
use crate::input::InvoiceDraft;
use crate::invoice::{Invoice, InvoiceStats};
use crate::numbering::{InvoiceNumber, InvoiceNumberAllocator};
use crate::ports::CounterStore;
use crate::tenant::Company;

/// Service issuing invoices and registering clients for one tenant
pub struct InvoicingService<S: CounterStore> {
    company: Company,
    allocator: InvoiceNumberAllocator<S>,
    clock: Arc<dyn Clock>,
}

impl<S: CounterStore> InvoicingService<S> {
    /// Creates the service and registers the tenant's sequences
    ///
    /// # Errors
    ///
    /// Returns an error if the company profile is incomplete or the counter
    /// store cannot register the sequences.
    pub async fn new(company: Company, store: Arc<S>, clock: Arc<dyn Clock>) -> Result<Self, InvoicingError> {
        company.validate()?;
        let allocator = InvoiceNumberAllocator::new(store);
        allocator.register(&company).await?;
        Ok(Self {
            company,
            allocator,
            clock,
        })
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn allocator(&self) -> &InvoiceNumberAllocator<S> {
        &self.allocator
    }

    /// Today's date in the tenant's timezone
    pub fn today(&self) -> NaiveDate {
        self.company.today(self.clock.as_ref())
    }

    /// Validates a draft, reserves a number and builds the invoice
    ///
    /// When the draft requests a status other than draft, the invoice is
    /// moved there after creation, subject to the usual transition rules.
    ///
    /// # Errors
    ///
    /// - `InvoicingError::Validation` for invalid drafts; no number is used
    /// - `InvoicingError::Port` when the counter cannot be advanced
    /// - `InvoicingError::InvalidStateTransition` for an unreachable status;
    ///   the reserved number is not returned to the counter
    pub async fn create_invoice(&self, draft: &InvoiceDraft) -> Result<Invoice, InvoicingError> {
        let valid = draft.validate(&self.company, self.today()).map_err(|e| {
            warn!(tenant = %self.company.id, error = %e, "Rejected invoice draft");
            e
        })?;

        let number = self.allocator.allocate_next(&self.company).await?;

        let mut invoice = Invoice::new(number, valid.client, valid.issue_date, valid.due_date, valid.currency)
            .with_items(valid.items)
            .with_tax_rate(valid.tax_rate)
            .with_discount(valid.discount_percentage);
        invoice.notes = valid.notes;
        invoice.payment_terms = valid.payment_terms;
        if valid.status != invoice.status() {
            invoice.transition_to(valid.status)?;
        }

        info!(
            tenant = %self.company.id,
            invoice_number = %invoice.invoice_number(),
            items = invoice.items.len(),
            total = %invoice.total(),
            currency = %invoice.currency,
            "Created invoice"
        );
        Ok(invoice)
    }

    /// The number the next invoice would receive
    pub async fn peek_next_number(&self) -> Result<InvoiceNumber, InvoicingError> {
        self.allocator.peek_next(&self.company).await
    }

    /// Validates and registers a client, assigning its `CL-NNN` number
    pub async fn add_client(&self, directory: &mut ClientDirectory, input: NewClient) -> Result<Client, InvoicingError> {
        let client = Client::new(input)?;
        directory.ensure_unique_email(&client.email).map_err(|e| {
            warn!(tenant = %self.company.id, error = %e, "Rejected client");
            e
        })?;

        let number = self.allocator.allocate_client_number(self.company.id).await?;
        let client = directory.insert(client.with_number(number))?.clone();
        info!(
            tenant = %self.company.id,
            client_number = client.client_number.as_deref().unwrap_or_default(),
            "Added client"
        );
        Ok(client)
    }

    /// Imports clients exported by [`ClientDirectory::export`]
    ///
    /// Every record is validated before any number is reserved; one bad or
    /// duplicate record aborts the import and leaves the directory unchanged.
    ///
    /// Returns the number of clients imported.
    pub async fn import_clients(
        &self,
        directory: &mut ClientDirectory,
        data: &str,
        format: ExchangeFormat,
    ) -> Result<usize, InvoicingError> {
        let clients = directory.prepare_import(data, format).map_err(|e| {
            warn!(tenant = %self.company.id, format = %format, error = %e, "Rejected client import");
            e
        })?;

        let count = clients.len();
        let mut numbers = Vec::with_capacity(count);
        for _ in 0..count {
            numbers.push(self.allocator.allocate_client_number(self.company.id).await?);
        }
        for (client, number) in clients.into_iter().zip(numbers) {
            directory.insert(client.with_number(number))?;
        }
        info!(tenant = %self.company.id, format = %format, count, "Imported clients");
        Ok(count)
    }

    /// Statistics over `invoices` as of today
    pub fn stats<'a>(&self, invoices: impl IntoIterator<Item = &'a Invoice>) -> InvoiceStats {
        InvoiceStats::from_invoices(invoices, self.today())
    }
}
