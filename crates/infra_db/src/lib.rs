//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the invoicing system using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`] hold the SQL and return plain row structs
//! - [`adapters`] implement domain ports on top of the repositories
//! - [`pool`] builds the connection pool and applies migrations
//!
//! The `invoices.invoice_number` column carries a unique constraint. A
//! violation surfaces as [`DatabaseError::DuplicateEntry`] and reaches the
//! domain as a port conflict, which is what drives allocation retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoiceAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/invoicing")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresInvoiceAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresInvoiceAdapter;
