//! Invoicing Domain Ports
//!
//! The only state the invoicing domain needs from outside is its counters.
//! Each tenant owns one sequence per [`SequenceKind`], storing the next
//! value to hand out together with the prefix it is rendered with.
//!
//! # Contract
//!
//! - `reserve` returns the current value and advances the counter in one
//!   serialized step; the advance is durable before the call returns.
//! - Values start at 1 and are never handed out twice.
//! - A reserved value is consumed even if the caller later fails.
//!
//! # Adapters
//!
//! - [`InMemoryCounterStore`] (this module): process-local, used by tests
//! - `infra_db::JsonFileCounterStore`: one JSON file rewritten atomically
//! - `infra_db::PgCounterStore`: one row per sequence, `UPDATE … RETURNING`
//!
//! [`SequenceKind`]: crate::numbering::SequenceKind

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use core_kernel::{DomainPort, PortError};

use crate::numbering::SequenceKey;

/// Stored state of one sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Prefix the sequence renders with
    pub prefix: String,
    /// Value the next `reserve` will return
    pub next: u64,
}

impl CounterState {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

/// Port for durable per-tenant counters
#[async_trait]
pub trait CounterStore: DomainPort {
    /// Creates the sequence if it does not exist, or updates its prefix
    ///
    /// The counter value of an existing sequence is left unchanged.
    async fn register(&self, key: &SequenceKey, prefix: &str) -> Result<CounterState, PortError>;

    /// Returns the current value and advances the counter
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when the sequence was never registered.
    async fn reserve(&self, key: &SequenceKey) -> Result<CounterState, PortError>;

    /// Returns the state without advancing it
    async fn peek(&self, key: &SequenceKey) -> Result<CounterState, PortError>;
}

/// Process-local counter store
///
/// All sequences sit behind one mutex, so each `reserve` is serialized.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCounterStore {
    counters: Arc<Mutex<HashMap<SequenceKey, CounterState>>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryCounterStore {}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn register(&self, key: &SequenceKey, prefix: &str) -> Result<CounterState, PortError> {
        let mut counters = self.counters.lock().await;
        let state = counters
            .entry(key.clone())
            .or_insert_with(|| CounterState::new(prefix));
        state.prefix = prefix.to_string();
        Ok(state.clone())
    }

    async fn reserve(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let mut counters = self.counters.lock().await;
        let state = counters
            .get_mut(key)
            .ok_or_else(|| PortError::not_found("Sequence", key))?;
        let reserved = state.clone();
        state.next += 1;
        Ok(reserved)
    }

    async fn peek(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        self.counters
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::not_found("Sequence", key))
    }
}
