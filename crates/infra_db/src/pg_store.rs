//! PostgreSQL counter store
//!
//! One row per tenant sequence in `invoice_counters`. A reservation is a
//! single `UPDATE … RETURNING` statement, so the row lock PostgreSQL takes
//! for the update serializes concurrent reservations across processes.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError};
use domain_invoicing::{CounterState, CounterStore, SequenceKey};

use crate::error::DatabaseError;

const REGISTER_SQL: &str = r#"
    INSERT INTO invoice_counters (tenant_id, sequence, prefix)
    VALUES ($1, $2, $3)
    ON CONFLICT (tenant_id, sequence)
    DO UPDATE SET prefix = EXCLUDED.prefix, updated_at = now()
    RETURNING prefix, next_value
"#;

const RESERVE_SQL: &str = r#"
    UPDATE invoice_counters
    SET next_value = next_value + 1, updated_at = now()
    WHERE tenant_id = $1 AND sequence = $2
    RETURNING prefix, next_value - 1 AS next_value
"#;

const PEEK_SQL: &str = r#"
    SELECT prefix, next_value
    FROM invoice_counters
    WHERE tenant_id = $1 AND sequence = $2
"#;

#[derive(Debug, sqlx::FromRow)]
struct CounterRow {
    prefix: String,
    next_value: i64,
}

impl CounterRow {
    fn into_state(self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let next = u64::try_from(self.next_value).map_err(|_| PortError::Corrupt {
            message: format!("sequence {} has negative value {}", key, self.next_value),
        })?;
        Ok(CounterState {
            prefix: self.prefix,
            next,
        })
    }
}

/// Counter store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    /// Creates a store over `pool`; run [`crate::run_migrations`] first
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PgCounterStore {}

#[async_trait]
impl CounterStore for PgCounterStore {
    #[instrument(skip(self), fields(sequence = %key))]
    async fn register(&self, key: &SequenceKey, prefix: &str) -> Result<CounterState, PortError> {
        let row = sqlx::query_as::<_, CounterRow>(REGISTER_SQL)
            .bind(*key.tenant.as_uuid())
            .bind(key.kind.as_str())
            .bind(prefix)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        debug!(next = row.next_value, "Registered sequence");
        row.into_state(key)
    }

    #[instrument(skip(self), fields(sequence = %key))]
    async fn reserve(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let row = sqlx::query_as::<_, CounterRow>(RESERVE_SQL)
            .bind(*key.tenant.as_uuid())
            .bind(key.kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| PortError::not_found("Sequence", key))?;
        row.into_state(key)
    }

    async fn peek(&self, key: &SequenceKey) -> Result<CounterState, PortError> {
        let row = sqlx::query_as::<_, CounterRow>(PEEK_SQL)
            .bind(*key.tenant.as_uuid())
            .bind(key.kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| PortError::not_found("Sequence", key))?;
        row.into_state(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::TenantId;

    #[test]
    fn test_negative_value_is_corrupt() {
        let key = SequenceKey::invoices(TenantId::from_slug("acme"));
        let row = CounterRow {
            prefix: "INV".to_string(),
            next_value: -1,
        };
        assert!(matches!(row.into_state(&key), Err(PortError::Corrupt { .. })));
    }

    #[test]
    fn test_row_converts_to_state() {
        let key = SequenceKey::invoices(TenantId::from_slug("acme"));
        let row = CounterRow {
            prefix: "INV".to_string(),
            next_value: 12,
        };
        let state = row.into_state(&key).unwrap();
        assert_eq!(state, CounterState { prefix: "INV".to_string(), next: 12 });
    }
}
