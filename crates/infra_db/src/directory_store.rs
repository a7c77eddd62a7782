//! Client directory files
//!
//! Each tenant's [`ClientDirectory`] is kept in its own JSON file named
//! after the tenant id, under one base directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use core_kernel::TenantId;
use domain_invoicing::ClientDirectory;

use crate::atomic::{read_optional, write_atomic};
use crate::error::DatabaseError;

/// Loads and saves client directories under a base directory
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    base: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// File holding `tenant`'s directory
    pub fn path_for(&self, tenant: TenantId) -> PathBuf {
        self.base.join(format!("clients-{}.json", tenant.as_uuid()))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Loads `tenant`'s directory, or an empty one if none was saved
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SerializationError` if the file is not a
    /// directory of this tenant.
    pub fn load(&self, tenant: TenantId) -> Result<ClientDirectory, DatabaseError> {
        let path = self.path_for(tenant);
        let Some(content) = read_optional(&path)? else {
            return Ok(ClientDirectory::new(tenant));
        };
        let directory: ClientDirectory = serde_json::from_str(&content)?;
        if directory.tenant_id != tenant {
            return Err(DatabaseError::SerializationError(format!(
                "{} belongs to tenant {}",
                path.display(),
                directory.tenant_id
            )));
        }
        debug!(tenant = %tenant, clients = directory.len(), "Loaded client directory");
        Ok(directory)
    }

    pub fn save(&self, directory: &ClientDirectory) -> Result<(), DatabaseError> {
        let bytes = serde_json::to_vec_pretty(directory)?;
        write_atomic(&self.path_for(directory.tenant_id), &bytes)?;
        debug!(tenant = %directory.tenant_id, clients = directory.len(), "Saved client directory");
        Ok(())
    }
}
