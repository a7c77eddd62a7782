//! Clients billed by a tenant
//!
//! A client's identity within a tenant is its email address, compared without
//! regard to case. Clients are never hard-deleted; deactivation hides them
//! from listings while keeping historical invoices intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ClientId;

use crate::error::InvoicingError;

/// Input for registering a client
///
/// Required fields are trimmed before validation, so whitespace-only values
/// are rejected as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone is too long"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "company is too long"))]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewClient {
    pub fn new(name: impl Into<String>, email: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            phone: None,
            company: None,
            notes: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trims every field and drops optional values that are blank
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: non_blank(self.phone),
            company: non_blank(self.company),
            notes: non_blank(self.notes),
        }
    }
}

/// Partial update of a client's contact details
///
/// The client number, email identity and creation time are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

/// A client of a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// `CL-NNN` number assigned when the client joins a directory
    pub client_number: Option<String>,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Validates the input and creates an active client without a number
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Validation` naming the offending fields when
    /// name, email or address is missing, or the email is malformed.
    pub fn new(input: NewClient) -> Result<Self, InvoicingError> {
        let input = input.normalized();
        input.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: ClientId::new_v7(),
            client_number: None,
            name: input.name,
            email: input.email,
            address: input.address,
            phone: input.phone,
            company: input.company,
            notes: input.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Assigns the directory number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.client_number = Some(number.into());
        self
    }

    /// Returns true when `email` identifies this client
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Applies a partial update, rejecting blank required fields
    pub fn apply(&mut self, update: ClientUpdate) -> Result<(), InvoicingError> {
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(InvoicingError::validation("name", "name is required"));
            }
            self.name = name.to_string();
        }
        if let Some(address) = update.address {
            let address = address.trim();
            if address.is_empty() {
                return Err(InvoicingError::validation("address", "address is required"));
            }
            self.address = address.to_string();
        }
        if update.phone.is_some() {
            self.phone = non_blank(update.phone);
        }
        if update.company.is_some() {
            self.company = non_blank(update.company);
        }
        if update.notes.is_some() {
            self.notes = non_blank(update.notes);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Soft delete
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Returns true when `query` (lowercase) occurs in the name, email,
    /// company or client number
    pub(crate) fn matches(&self, query: &str) -> bool {
        let fields = [
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            self.company.as_deref(),
            self.client_number.as_deref(),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(query))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_trims_fields() {
        let client = Client::new(
            NewClient::new("  Acme  ", " billing@acme.test ", "1 Main St").with_phone("   "),
        )
        .unwrap();
        assert_eq!(client.name, "Acme");
        assert_eq!(client.email, "billing@acme.test");
        assert_eq!(client.phone, None);
        assert!(client.is_active);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let err = Client::new(NewClient::new(" ", "not-an-email", "")).unwrap_err();
        match err {
            InvoicingError::Validation { field, .. } => {
                assert_eq!(field, "address, email, name");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_identity_ignores_case() {
        let client = Client::new(NewClient::new("Acme", "Billing@Acme.test", "1 Main St")).unwrap();
        assert!(client.has_email("billing@acme.TEST"));
        assert!(!client.has_email("other@acme.test"));
    }

    #[test]
    fn test_apply_rejects_blank_name() {
        let mut client = Client::new(NewClient::new("Acme", "a@acme.test", "1 Main St")).unwrap();
        let err = client
            .apply(ClientUpdate { name: Some("  ".into()), ..Default::default() })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(client.name, "Acme");
    }
}
