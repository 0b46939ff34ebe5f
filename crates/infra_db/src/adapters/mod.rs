//! Domain Adapters
//!
//! Implementations of domain ports backed by PostgreSQL. Each adapter
//! implements a port trait, translates between domain models and row types,
//! and uses the repository layer for the SQL itself.

pub mod invoice;

pub use invoice::PostgresInvoiceAdapter;
