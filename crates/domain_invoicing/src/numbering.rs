//! Invoice and client numbering
//!
//! Numbers come from per-tenant counters behind the [`CounterStore`] port.
//! Allocation reserves the counter value and advances it in one store call,
//! so two invoices of a tenant never share a number. A reserved number is
//! never reused, even if the invoice it was reserved for is never saved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::TenantId;

use crate::error::InvoicingError;
use crate::ports::{CounterState, CounterStore};
use crate::tenant::Company;

/// Prefix of client numbers
pub const CLIENT_PREFIX: &str = "CL";

/// What a sequence numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
    /// `{prefix}-NNNN`
    Invoice,
    /// `CL-NNN`
    Client,
}

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Invoice => "invoice",
            SequenceKind::Client => "client",
        }
    }

    /// Minimum number of digits, zero-padded
    pub fn width(&self) -> usize {
        match self {
            SequenceKind::Invoice => 4,
            SequenceKind::Client => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "invoice" => Some(SequenceKind::Invoice),
            "client" => Some(SequenceKind::Client),
            _ => None,
        }
    }
}

/// Identifies one counter: a tenant and what it numbers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceKey {
    pub tenant: TenantId,
    pub kind: SequenceKind,
}

impl SequenceKey {
    pub fn new(tenant: TenantId, kind: SequenceKind) -> Self {
        Self { tenant, kind }
    }

    pub fn invoices(tenant: TenantId) -> Self {
        Self::new(tenant, SequenceKind::Invoice)
    }

    pub fn clients(tenant: TenantId) -> Self {
        Self::new(tenant, SequenceKind::Client)
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant, self.kind.as_str())
    }
}

/// Renders `{prefix}-{value}` with `value` zero-padded to `width` digits
///
/// Values wider than `width` print in full (`INV-12345`).
pub fn format_number(prefix: &str, value: u64, width: usize) -> String {
    format!("{}-{:0width$}", prefix, value, width = width)
}

/// A tenant-unique invoice number such as `INV-0042`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out invoice and client numbers from a [`CounterStore`]
#[derive(Debug)]
pub struct InvoiceNumberAllocator<S: CounterStore> {
    store: Arc<S>,
}

impl<S: CounterStore> Clone for InvoiceNumberAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CounterStore> InvoiceNumberAllocator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers the company's sequences with its current prefix
    ///
    /// Safe to call on every start: existing counters keep their value.
    pub async fn register(&self, company: &Company) -> Result<(), InvoicingError> {
        let invoices = self
            .store
            .register(&SequenceKey::invoices(company.id), company.invoice_prefix.as_str())
            .await?;
        let clients = self
            .store
            .register(&SequenceKey::clients(company.id), CLIENT_PREFIX)
            .await?;
        debug!(
            tenant = %company.id,
            next_invoice = invoices.next,
            next_client = clients.next,
            "Registered sequences"
        );
        Ok(())
    }

    /// Reserves the next invoice number of the company
    ///
    /// The counter is advanced durably before the number is returned.
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Port` when the store cannot advance the
    /// counter; no number is handed out in that case.
    pub async fn allocate_next(&self, company: &Company) -> Result<InvoiceNumber, InvoicingError> {
        let key = SequenceKey::invoices(company.id);
        let reserved = self.store.reserve(&key).await?;
        let number = InvoiceNumber::new(render(&reserved, SequenceKind::Invoice));
        info!(tenant = %company.id, invoice_number = %number, "Allocated invoice number");
        Ok(number)
    }

    /// Reserves the next `CL-NNN` client number of a tenant
    pub async fn allocate_client_number(&self, tenant: TenantId) -> Result<String, InvoicingError> {
        let reserved = self.store.reserve(&SequenceKey::clients(tenant)).await?;
        let number = render(&reserved, SequenceKind::Client);
        debug!(tenant = %tenant, client_number = %number, "Allocated client number");
        Ok(number)
    }

    /// The invoice number the next allocation would return
    pub async fn peek_next(&self, company: &Company) -> Result<InvoiceNumber, InvoicingError> {
        let state = self.store.peek(&SequenceKey::invoices(company.id)).await?;
        Ok(InvoiceNumber::new(render(&state, SequenceKind::Invoice)))
    }
}

fn render(state: &CounterState, kind: SequenceKind) -> String {
    format_number(&state.prefix, state.next, kind.width())
}
