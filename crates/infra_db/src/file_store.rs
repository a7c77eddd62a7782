//! JSON file counter store
//!
//! Keeps every sequence of every tenant in one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "counters": [
//!     { "tenant": "…", "kind": "invoice", "prefix": "INV", "next": 3 }
//!   ]
//! }
//! ```
//!
//! Each operation holds an advisory lock on a sibling `.lock` file while it
//! reads, updates and atomically rewrites the document.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use core_kernel::{DomainPort, PortError, TenantId};
use domain_invoicing::{CounterState, CounterStore, SequenceKey, SequenceKind};

use crate::atomic::{read_optional, write_atomic};
use crate::error::DatabaseError;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CounterFile {
    version: u32,
    counters: Vec<CounterEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CounterEntry {
    tenant: TenantId,
    kind: SequenceKind,
    prefix: String,
    next: u64,
}

type Counters = BTreeMap<SequenceKey, CounterState>;

fn decode(content: &str) -> Result<Counters, DatabaseError> {
    let file: CounterFile = serde_json::from_str(content)?;
    if file.version != FORMAT_VERSION {
        return Err(DatabaseError::SerializationError(format!(
            "unsupported counter file version {}",
            file.version
        )));
    }
    let mut counters = Counters::new();
    for entry in file.counters {
        if entry.next == 0 {
            return Err(DatabaseError::SerializationError(format!(
                "counter {}/{} has value 0",
                entry.tenant,
                entry.kind.as_str()
            )));
        }
        counters.insert(
            SequenceKey::new(entry.tenant, entry.kind),
            CounterState {
                prefix: entry.prefix,
                next: entry.next,
            },
        );
    }
    Ok(counters)
}

fn encode(counters: &Counters) -> Result<Vec<u8>, DatabaseError> {
    let file = CounterFile {
        version: FORMAT_VERSION,
        counters: counters
            .iter()
            .map(|(key, state)| CounterEntry {
                tenant: key.tenant,
                kind: key.kind,
                prefix: state.prefix.clone(),
                next: state.next,
            })
            .collect(),
    };
    Ok(serde_json::to_vec_pretty(&file)?)
}

fn load(path: &Path) -> Result<Counters, DatabaseError> {
    match read_optional(path)? {
        Some(content) => decode(&content),
        None => Ok(Counters::new()),
    }
}

/// `<path>.lock`, next to the counter file
fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Advisory lock on the lock file, released on drop
///
/// The counter file itself is replaced by rename on every write, so the lock
/// is held on a separate file whose inode never changes.
struct CounterLock {
    file: File,
}

impl CounterLock {
    fn acquire(path: &Path, exclusive: bool) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if exclusive {
            FileExt::lock_exclusive(&file)?;
        } else {
            FileExt::lock_shared(&file)?;
        }
        Ok(Self { file })
    }
}

impl Drop for CounterLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Durable counter store backed by one JSON file
///
/// Every operation locks `<path>.lock` and reads the file afresh, so stores
/// opened on the same path, in this process or another, advance one shared
/// sequence.
#[derive(Debug, Clone)]
pub struct JsonFileCounterStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileCounterStore {
    /// Opens the store at `path`; a missing file is an empty store
    ///
    /// # Errors
    ///
    /// Returns `PortError::Corrupt` if the file exists but cannot be decoded.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PortError> {
        let path = path.into();
        let store = Self {
            lock_path: lock_path_for(&path),
            path,
        };
        let sequences = store.transact(false, |counters| Ok((counters.len(), false))).await?;
        info!(path = %store.path.display(), sequences, "Opened counter file");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `apply` on the current file contents under the lock
    ///
    /// `apply` returns its result and whether it changed the counters; a
    /// change is written back before the lock is released.
    async fn transact<T, F>(&self, exclusive: bool, apply: F) -> Result<T, PortError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Counters) -> Result<(T, bool), PortError> + Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = CounterLock::acquire(&lock_path, exclusive)?;
            let mut counters = load(&path)?;
            let (value, changed) = apply(&mut counters)?;
            if changed {
                write_atomic(&path, &encode(&counters)?)?;
            }
            Ok(value)
        })
        .await
        .map_err(|e| PortError::internal(format!("counter file task failed: {}", e)))?
    }
}

impl DomainPort for JsonFileCounterStore {}

#[async_trait]
impl CounterStore for JsonFileCounterStore {
    async fn register(&self, key: &SequenceKey, prefix: &str) -> Result<CounterState, PortError> {
        let owned_key = key.clone();
        let prefix = prefix.to_string();
        let state = self
            .transact(true, move |counters| {
                let is_new = !counters.contains_key(&owned_key);
                let state = counters
                    .entry(owned_key)
                    .or_insert_with(|| CounterState::new(prefix.as_str()));
                let changed = is_new || state.prefix != prefix;
                state.prefix = prefix;
                Ok((state.clone(), changed))
            })
            .await?;
        debug!(sequence = %key, prefix = %state.prefix, next = state.next, "Registered sequence");
        Ok(state)
    }

    async fn reserve(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let owned_key = key.clone();
        self.transact(true, move |counters| {
            let state = counters
                .get_mut(&owned_key)
                .ok_or_else(|| PortError::not_found("Sequence", &owned_key))?;
            let reserved = state.clone();
            state.next = reserved.next + 1;
            Ok((reserved, true))
        })
        .await
    }

    async fn peek(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let owned_key = key.clone();
        self.transact(false, move |counters| {
            counters
                .get(&owned_key)
                .cloned()
                .map(|state| (state, false))
                .ok_or_else(|| PortError::not_found("Sequence", &owned_key))
        })
        .await
    }
}
