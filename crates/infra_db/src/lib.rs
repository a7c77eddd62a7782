//! Infrastructure Storage Layer
//!
//! Adapters for the state the invoicing domain keeps outside the process:
//! the per-tenant counters behind [`domain_invoicing::CounterStore`] and the
//! client directories.
//!
//! # Adapters
//!
//! - [`JsonFileCounterStore`]: all counters in one JSON file, rewritten
//!   atomically on each change
//! - [`PgCounterStore`]: one PostgreSQL row per sequence, advanced with a
//!   single `UPDATE … RETURNING`
//! - [`JsonDirectoryStore`]: one JSON file per tenant's client directory
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgCounterStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/invoicing")).await?;
//! run_migrations(&pool).await?;
//! let store = PgCounterStore::new(pool);
//! ```

pub mod atomic;
pub mod directory_store;
pub mod error;
pub mod file_store;
pub mod pg_store;
pub mod pool;

pub use atomic::write_atomic;
pub use directory_store::JsonDirectoryStore;
pub use error::DatabaseError;
pub use file_store::JsonFileCounterStore;
pub use pg_store::PgCounterStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
