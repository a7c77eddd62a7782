//! Client directory of a tenant
//!
//! Holds every client a tenant has registered, active or not. Lookups by
//! email ignore case; search matches name, email, company and client number.
//! The directory can be exported to and imported from JSON or CSV.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClientId, TenantId};

use crate::client::{Client, ClientUpdate, NewClient};
use crate::error::InvoicingError;

/// Interchange formats for client export and import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeFormat {
    Json,
    Csv,
}

impl ExchangeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeFormat::Json => "json",
            ExchangeFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeFormat {
    type Err = InvoicingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExchangeFormat::Json),
            "csv" => Ok(ExchangeFormat::Csv),
            _ => Err(InvoicingError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Counts of a directory's clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub total_clients: usize,
    pub active_clients: usize,
    pub inactive_clients: usize,
}

/// Flat row used by both interchange formats
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientRecord {
    #[serde(default)]
    client_number: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<&Client> for ClientRecord {
    fn from(client: &Client) -> Self {
        Self {
            client_number: client.client_number.clone(),
            name: client.name.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            phone: client.phone.clone(),
            company: client.company.clone(),
            notes: client.notes.clone(),
            is_active: Some(client.is_active),
            created_at: Some(client.created_at),
        }
    }
}

impl From<ClientRecord> for NewClient {
    fn from(record: ClientRecord) -> Self {
        NewClient {
            name: record.name,
            email: record.email,
            address: record.address,
            phone: record.phone,
            company: record.company,
            notes: record.notes,
        }
    }
}

/// All clients of one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDirectory {
    pub tenant_id: TenantId,
    clients: Vec<Client>,
}

impl ClientDirectory {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            clients: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Rejects `email` if any client, active or not, already uses it
    pub fn ensure_unique_email(&self, email: &str) -> Result<(), InvoicingError> {
        match self.find_by_email(email) {
            Some(existing) => Err(InvoicingError::DuplicateClient(existing.email.clone())),
            None => Ok(()),
        }
    }

    /// Adds a validated client
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::DuplicateClient` when the email is taken.
    pub fn insert(&mut self, client: Client) -> Result<&Client, InvoicingError> {
        self.ensure_unique_email(&client.email)?;
        self.clients.push(client);
        let last = self.clients.len() - 1;
        Ok(&self.clients[last])
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Looks a client up by its `CL-NNN` number
    pub fn get_by_number(&self, number: &str) -> Option<&Client> {
        let number = number.trim();
        self.clients
            .iter()
            .find(|c| c.client_number.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(number)))
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.has_email(email))
    }

    pub fn update(&mut self, id: ClientId, update: ClientUpdate) -> Result<&Client, InvoicingError> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| InvoicingError::ClientNotFound(id.to_string()))?;
        client.apply(update)?;
        Ok(client)
    }

    /// Soft-deletes a client
    pub fn deactivate(&mut self, id: ClientId) -> Result<(), InvoicingError> {
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| InvoicingError::ClientNotFound(id.to_string()))?;
        client.deactivate();
        Ok(())
    }

    /// Clients sorted by name
    pub fn list(&self, active_only: bool) -> Vec<&Client> {
        let mut clients: Vec<&Client> = self
            .clients
            .iter()
            .filter(|c| !active_only || c.is_active)
            .collect();
        clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        clients
    }

    /// Case-insensitive substring search over name, email, company and number
    pub fn search(&self, query: &str, active_only: bool) -> Vec<&Client> {
        let query = query.trim().to_lowercase();
        self.list(active_only)
            .into_iter()
            .filter(|c| c.matches(&query))
            .collect()
    }

    pub fn summary(&self) -> ClientSummary {
        let active = self.clients.iter().filter(|c| c.is_active).count();
        ClientSummary {
            total_clients: self.clients.len(),
            active_clients: active,
            inactive_clients: self.clients.len() - active,
        }
    }

    /// Serializes every client, active or not
    pub fn export(&self, format: ExchangeFormat) -> Result<String, InvoicingError> {
        let records: Vec<ClientRecord> = self.clients.iter().map(ClientRecord::from).collect();
        match format {
            ExchangeFormat::Json => serde_json::to_string_pretty(&records)
                .map_err(|e| InvoicingError::Export(e.to_string())),
            ExchangeFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for record in &records {
                    writer
                        .serialize(record)
                        .map_err(|e| InvoicingError::Export(e.to_string()))?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| InvoicingError::Export(e.to_string()))?;
                String::from_utf8(bytes).map_err(|e| InvoicingError::Export(e.to_string()))
            }
        }
    }

    /// Parses exported data into client inputs and checks them against the
    /// directory without changing it
    ///
    /// Numbers, activity flags and timestamps in the data are ignored; the
    /// importer assigns fresh ones.
    ///
    /// # Errors
    ///
    /// - `InvoicingError::InvalidImport` when the data cannot be parsed
    /// - `InvoicingError::Validation` when a record is missing required fields
    /// - `InvoicingError::DuplicateClient` when an email already exists in the
    ///   directory or repeats within the data
    pub fn prepare_import(&self, data: &str, format: ExchangeFormat) -> Result<Vec<Client>, InvoicingError> {
        let records: Vec<ClientRecord> = match format {
            ExchangeFormat::Json => serde_json::from_str(data)
                .map_err(|e| InvoicingError::InvalidImport(format!("invalid JSON data: {}", e)))?,
            ExchangeFormat::Csv => csv::Reader::from_reader(data.as_bytes())
                .deserialize()
                .collect::<Result<Vec<ClientRecord>, _>>()
                .map_err(|e| InvoicingError::InvalidImport(format!("invalid CSV data: {}", e)))?,
        };

        let mut seen = HashSet::new();
        let mut clients = Vec::with_capacity(records.len());
        for record in records {
            let client = Client::new(NewClient::from(record))?;
            self.ensure_unique_email(&client.email)?;
            if !seen.insert(client.email.to_lowercase()) {
                return Err(InvoicingError::DuplicateClient(client.email));
            }
            clients.push(client);
        }
        Ok(clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ClientDirectory {
        let mut dir = ClientDirectory::new(TenantId::from_slug("acme"));
        let a = Client::new(NewClient::new("Zeta Corp", "ap@zeta.test", "9 Z St").with_company("Zeta"))
            .unwrap()
            .with_number("CL-001");
        let b = Client::new(NewClient::new("alpha llc", "billing@alpha.test", "1 A St"))
            .unwrap()
            .with_number("CL-002");
        dir.insert(a).unwrap();
        dir.insert(b).unwrap();
        dir
    }

    #[test]
    fn test_duplicate_email_rejected_case_insensitively() {
        let mut dir = directory();
        let dup = Client::new(NewClient::new("Other", "AP@ZETA.test", "2 Z St")).unwrap();
        assert!(matches!(dir.insert(dup), Err(InvoicingError::DuplicateClient(_))));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let mut dir = directory();
        let names: Vec<&str> = dir.list(true).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha llc", "Zeta Corp"]);

        let id = dir.find_by_email("ap@zeta.test").unwrap().id;
        dir.deactivate(id).unwrap();
        assert_eq!(dir.list(true).len(), 1);
        assert_eq!(dir.list(false).len(), 2);
        assert_eq!(dir.summary().inactive_clients, 1);
    }

    #[test]
    fn test_search_matches_number_and_company() {
        let dir = directory();
        assert_eq!(dir.search("cl-002", true).len(), 1);
        assert_eq!(dir.search("ZETA", true).len(), 1);
        assert!(dir.search("nobody", true).is_empty());
    }

    #[test]
    fn test_unsupported_format() {
        let err = "xml".parse::<ExchangeFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format: xml");
    }
}
